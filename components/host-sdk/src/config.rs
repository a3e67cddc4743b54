// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration for loading the native library and constructing entities.
//!
//! All types deserialize from camelCase JSON (or any other serde format) and
//! every optional field has a default, so `{}` is a valid configuration for
//! each of them except [`ApplicationOptions`], which needs an `id`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides where the native library is loaded from.
pub const LIBRARY_PATH_ENV: &str = "SAUCER_LIBRARY_PATH";

/// Base name of the native library, without platform prefix or extension.
pub const DEFAULT_LIBRARY_NAME: &str = "saucer-bindings";

fn default_library_name() -> String {
    DEFAULT_LIBRARY_NAME.to_string()
}

fn default_true() -> bool {
    true
}

// ── Loader ───────────────────────────────────────────────────────────────────

/// Where to find the native library.
///
/// Resolution order: `library_path`, then [`LIBRARY_PATH_ENV`], then
/// `library_name` inside each of `search_dirs`, then `library_name` on the
/// platform's default search path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LibraryLoaderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_path: Option<PathBuf>,

    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,

    #[serde(default = "default_library_name")]
    pub library_name: String,
}

impl Default for LibraryLoaderConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            search_dirs: Vec::new(),
            library_name: default_library_name(),
        }
    }
}

// ── Entities ─────────────────────────────────────────────────────────────────

/// Options for [`Application::new`](crate::Application::new).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplicationOptions {
    /// Application identifier, e.g. `com.example.app`.
    pub id: String,

    #[serde(default = "default_true")]
    pub quit_on_last_window_closed: bool,
}

impl ApplicationOptions {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            quit_on_last_window_closed: true,
        }
    }
}

/// Options for [`Webview::new`](crate::Webview::new).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WebviewOptions {
    #[serde(default = "default_true")]
    pub hardware_acceleration: bool,

    #[serde(default)]
    pub persistent_cookies: bool,

    /// Expose the saucer JavaScript bridge attributes to pages.
    #[serde(default = "default_true")]
    pub attributes: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Extra flags passed verbatim to the browser engine.
    #[serde(default)]
    pub browser_flags: Vec<String>,
}

impl Default for WebviewOptions {
    fn default() -> Self {
        Self {
            hardware_acceleration: true,
            persistent_cookies: false,
            attributes: true,
            storage_path: None,
            user_agent: None,
            browser_flags: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_config_defaults_from_empty_json() {
        let config: LibraryLoaderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LibraryLoaderConfig::default());
        assert_eq!(config.library_name, DEFAULT_LIBRARY_NAME);
    }

    #[test]
    fn test_loader_config_camel_case() {
        let config: LibraryLoaderConfig = serde_json::from_str(
            r#"{"libraryPath": "/opt/saucer/libsaucer.so", "searchDirs": ["/usr/lib"]}"#,
        )
        .unwrap();
        assert_eq!(
            config.library_path,
            Some(PathBuf::from("/opt/saucer/libsaucer.so"))
        );
        assert_eq!(config.search_dirs, vec![PathBuf::from("/usr/lib")]);
    }

    #[test]
    fn test_loader_config_rejects_unknown_fields() {
        let result: Result<LibraryLoaderConfig, _> = serde_json::from_str(r#"{"searchPath": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_application_options_require_id() {
        let result: Result<ApplicationOptions, _> = serde_json::from_str("{}");
        assert!(result.is_err());

        let options: ApplicationOptions = serde_json::from_str(r#"{"id": "dev.saucer"}"#).unwrap();
        assert_eq!(options, ApplicationOptions::new("dev.saucer"));
        assert!(options.quit_on_last_window_closed);
    }

    #[test]
    fn test_webview_options_defaults() {
        let options: WebviewOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, WebviewOptions::default());
        assert!(options.hardware_acceleration);
        assert!(!options.persistent_cookies);
        assert!(options.attributes);
    }

    #[test]
    fn test_webview_options_round_trip_skips_unset() {
        let options = WebviewOptions {
            user_agent: Some("saucer-test".to_string()),
            browser_flags: vec!["--disable-gpu".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["userAgent"], "saucer-test");
        assert!(json.get("storagePath").is_none());
        let back: WebviewOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, options);
    }
}
