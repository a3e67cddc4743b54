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

//! The loaded native library shared by every entity and thunk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use saucer_abi::SaucerVtable;
use saucer_ffi_primitives::decode_borrowed_str;

use crate::error::Result;
use crate::schemes::SchemeRegistry;

/// One native library: its function table, the scheme registry that goes
/// with it and, when loaded from disk, the handle that keeps the code mapped.
///
/// Shared as `Arc<NativeLibrary>`. Every proxy and every pinned thunk holds a
/// clone, so the library stays loaded until the last of them is gone.
pub struct NativeLibrary {
    vtable: SaucerVtable,
    schemes: SchemeRegistry,
    path: Option<PathBuf>,
    // Declared last so the vtable is never observable after unmapping.
    _library: Option<Library>,
}

impl NativeLibrary {
    /// Wrap an already populated function table, e.g. a statically linked
    /// implementation or an in-process fake.
    pub fn from_vtable(vtable: SaucerVtable) -> Arc<Self> {
        Arc::new(Self {
            vtable,
            schemes: SchemeRegistry::new(),
            path: None,
            _library: None,
        })
    }

    pub(crate) fn from_library(vtable: SaucerVtable, library: Library, path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            vtable,
            schemes: SchemeRegistry::new(),
            path: Some(path),
            _library: Some(library),
        })
    }

    pub fn vtable(&self) -> &SaucerVtable {
        &self.vtable
    }

    /// Path the library was loaded from, if it came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Native library version string. Empty when the library reports none.
    pub fn version(&self) -> String {
        unsafe { decode_borrowed_str((self.vtable.version)()) }
    }

    pub fn schemes(&self) -> &SchemeRegistry {
        &self.schemes
    }

    /// Register a custom URL scheme. Must happen before the first window is
    /// created.
    pub fn register_scheme(&self, scheme: &str) -> Result<()> {
        self.schemes.register(&self.vtable, scheme)
    }
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("path", &self.path)
            .field("schemes", &self.schemes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaucerError;

    #[test]
    fn test_from_vtable_reports_version() {
        let library = NativeLibrary::from_vtable(saucer_mock_native::vtable());
        assert_eq!(library.version(), saucer_mock_native::VERSION);
        assert!(library.path().is_none());
    }

    #[test]
    fn test_libraries_have_independent_scheme_registries() {
        let first = NativeLibrary::from_vtable(saucer_mock_native::vtable());
        let second = NativeLibrary::from_vtable(saucer_mock_native::vtable());

        first.register_scheme("first").unwrap();
        first.schemes().seal();

        assert!(matches!(
            first.register_scheme("other"),
            Err(SaucerError::SchemeRegistrationClosed { .. })
        ));
        second.register_scheme("other").unwrap();
        assert!(!second.schemes().contains("first"));
    }
}
