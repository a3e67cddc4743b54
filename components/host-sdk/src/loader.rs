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

//! Library loader: locates the saucer shared library and resolves its ABI.

use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::Arc;

use libloading::{Library, Symbol};
use saucer_abi::SaucerVtable;

use crate::config::{LibraryLoaderConfig, LIBRARY_PATH_ENV};
use crate::library::NativeLibrary;

/// Loads the native library described by a [`LibraryLoaderConfig`].
pub struct LibraryLoader {
    config: LibraryLoaderConfig,
}

impl LibraryLoader {
    pub fn new(config: LibraryLoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LibraryLoaderConfig {
        &self.config
    }

    /// Resolve the path to load, following the order documented on
    /// [`LibraryLoaderConfig`].
    pub fn resolve_path(&self) -> PathBuf {
        let env_override = std::env::var_os(LIBRARY_PATH_ENV).map(PathBuf::from);
        resolve_library_path(&self.config, env_override)
    }

    /// Load the library and resolve every symbol of the saucer ABI.
    pub fn load(&self) -> anyhow::Result<Arc<NativeLibrary>> {
        load_library_from_path(&self.resolve_path())
    }
}

/// Load a saucer shared library from `path`.
///
/// This function:
/// 1. Opens the shared library
/// 2. Resolves every `saucer_*` symbol into a [`SaucerVtable`]
/// 3. Wraps both in a shared [`NativeLibrary`]
pub fn load_library_from_path(path: &Path) -> anyhow::Result<Arc<NativeLibrary>> {
    let library = unsafe {
        Library::new(path).map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?
    };

    let vtable = unsafe {
        SaucerVtable::resolve(|symbol| {
            let address: Symbol<*mut c_void> = library
                .get(symbol.as_bytes())
                .map_err(|e| anyhow::anyhow!("Missing {} in {}: {}", symbol, path.display(), e))?;
            NonNull::new(*address)
                .ok_or_else(|| anyhow::anyhow!("{} resolved to null in {}", symbol, path.display()))
        })?
    };

    let native = NativeLibrary::from_library(vtable, library, path.to_path_buf());
    log::info!(
        "Loaded saucer library: {} (version {})",
        path.display(),
        native.version()
    );
    Ok(native)
}

fn resolve_library_path(config: &LibraryLoaderConfig, env_override: Option<PathBuf>) -> PathBuf {
    if let Some(path) = &config.library_path {
        return path.clone();
    }
    if let Some(path) = env_override {
        log::debug!("Using {} override: {}", LIBRARY_PATH_ENV, path.display());
        return path;
    }

    let file_name = library_file_name(&config.library_name);
    for dir in &config.search_dirs {
        let candidate = dir.join(&file_name);
        if candidate.is_file() {
            return candidate;
        }
        log::debug!("No saucer library at {}", candidate.display());
    }

    // Fall back to the platform loader's own search path.
    PathBuf::from(file_name)
}

/// Platform-specific file name for a library base name.
pub fn library_file_name(name: &str) -> String {
    if cfg!(target_os = "macos") {
        format!("lib{}.dylib", name)
    } else if cfg!(target_os = "windows") {
        format!("{}.dll", name)
    } else {
        format!("lib{}.so", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LibraryLoaderConfig {
        LibraryLoaderConfig {
            library_path: None,
            search_dirs: Vec::new(),
            library_name: "saucer-test".to_string(),
        }
    }

    #[test]
    fn test_library_file_name_platform() {
        let name = library_file_name("saucer-test");
        if cfg!(target_os = "macos") {
            assert_eq!(name, "libsaucer-test.dylib");
        } else if cfg!(target_os = "windows") {
            assert_eq!(name, "saucer-test.dll");
        } else {
            assert_eq!(name, "libsaucer-test.so");
        }
    }

    #[test]
    fn test_explicit_path_wins_over_env() {
        let mut config = config();
        config.library_path = Some(PathBuf::from("/explicit/lib.so"));
        let path = resolve_library_path(&config, Some(PathBuf::from("/env/lib.so")));
        assert_eq!(path, PathBuf::from("/explicit/lib.so"));
    }

    #[test]
    fn test_env_override_wins_over_search() {
        let path = resolve_library_path(&config(), Some(PathBuf::from("/env/lib.so")));
        assert_eq!(path, PathBuf::from("/env/lib.so"));
    }

    #[test]
    fn test_search_dirs_then_bare_name() {
        let dir = std::env::temp_dir().join(format!("saucer-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut config = config();
        config.search_dirs = vec![PathBuf::from("/definitely/not/here"), dir.clone()];

        let bare = resolve_library_path(&config, None);
        assert_eq!(bare, PathBuf::from(library_file_name("saucer-test")));

        let candidate = dir.join(library_file_name("saucer-test"));
        std::fs::write(&candidate, b"").unwrap();
        assert_eq!(resolve_library_path(&config, None), candidate);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_library_fails() {
        let result = load_library_from_path(Path::new("/definitely/not/here/libsaucer.so"));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to load"), "{err}");
    }
}
