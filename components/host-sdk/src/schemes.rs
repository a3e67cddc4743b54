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

//! Process-wide registry of custom URL schemes.
//!
//! The native library only honours custom schemes that were registered
//! before the first window exists. [`SchemeRegistry`] enforces that ordering:
//! registration and sealing serialize on one mutex, the first
//! [`Window::new`](crate::Window::new) seals the registry, and later
//! registrations fail with [`SaucerError::SchemeRegistrationClosed`].

use std::collections::BTreeSet;
use std::sync::Mutex;

use saucer_abi::SaucerVtable;
use saucer_ffi_primitives::with_text;

use crate::error::{Result, SaucerError};
use crate::thunks::lock;

#[derive(Debug, Default)]
struct SchemeState {
    registered: BTreeSet<String>,
    sealed: bool,
}

#[derive(Debug, Default)]
pub struct SchemeRegistry {
    state: Mutex<SchemeState>,
}

impl SchemeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register `scheme` with the native library.
    ///
    /// Registering the same scheme twice is a no-op.
    pub(crate) fn register(&self, vtable: &SaucerVtable, scheme: &str) -> Result<()> {
        let mut state = lock(&self.state);
        if state.sealed {
            return Err(SaucerError::SchemeRegistrationClosed {
                scheme: scheme.to_string(),
            });
        }
        if state.registered.contains(scheme) {
            log::warn!("Custom scheme '{scheme}' is already registered");
            return Ok(());
        }

        with_text(scheme, |raw| unsafe { (vtable.webview_register_scheme)(raw) })?;
        state.registered.insert(scheme.to_string());
        log::debug!("Registered custom scheme '{scheme}'");
        Ok(())
    }

    /// Close registration. Returns `true` for the call that sealed it.
    pub(crate) fn seal(&self) -> bool {
        let mut state = lock(&self.state);
        if state.sealed {
            return false;
        }
        state.sealed = true;
        log::debug!(
            "Custom scheme registration sealed with {} scheme(s)",
            state.registered.len()
        );
        true
    }

    pub fn is_sealed(&self) -> bool {
        lock(&self.state).sealed
    }

    pub fn contains(&self, scheme: &str) -> bool {
        lock(&self.state).registered.contains(scheme)
    }

    /// Registered schemes in lexical order.
    pub fn schemes(&self) -> Vec<String> {
        lock(&self.state).registered.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_seal() {
        let vtable = saucer_mock_native::vtable();
        let registry = SchemeRegistry::new();

        registry.register(&vtable, "app").unwrap();
        registry.register(&vtable, "app").unwrap();
        registry.register(&vtable, "assets").unwrap();
        assert_eq!(registry.schemes(), vec!["app", "assets"]);
        assert!(registry.contains("app"));

        assert!(registry.seal());
        assert!(!registry.seal());
        assert!(registry.is_sealed());

        let err = registry.register(&vtable, "late").unwrap_err();
        assert!(matches!(
            err,
            SaucerError::SchemeRegistrationClosed { ref scheme } if scheme == "late"
        ));
        assert!(!registry.contains("late"));
        assert!(saucer_mock_native::registered_schemes().contains(&"assets".to_string()));
    }

    #[test]
    fn test_register_rejects_interior_nul() {
        let vtable = saucer_mock_native::vtable();
        let registry = SchemeRegistry::new();
        assert!(matches!(
            registry.register(&vtable, "a\0b"),
            Err(SaucerError::Codec(_))
        ));
        assert!(registry.schemes().is_empty());
    }
}
