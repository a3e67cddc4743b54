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

//! Images for window icons and page favicons.

use std::os::raw::c_int;
use std::path::Path;
use std::sync::Arc;

use saucer_abi::SaucerIcon;
use saucer_ffi_primitives::{with_text, NativeHandle};

use super::stash::Stash;
use super::ManagedEntity;
use crate::error::Result;
use crate::library::NativeLibrary;

pub struct Icon {
    handle: NativeHandle<SaucerIcon>,
    library: Arc<NativeLibrary>,
}

impl Icon {
    pub fn from_file(library: &Arc<NativeLibrary>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_string_lossy();
        let mut error: c_int = 0;
        let raw = with_text(&path, |path| unsafe {
            (library.vtable().icon_new_from_file)(path, &mut error)
        })?;
        Self::from_checked(library.clone(), raw, error)
    }

    /// Decode an icon from encoded image bytes. The stash is not consumed.
    pub fn from_stash(library: &Arc<NativeLibrary>, stash: &Stash) -> Result<Self> {
        let mut error: c_int = 0;
        let raw = unsafe { (library.vtable().icon_new_from_stash)(stash.as_ptr(), &mut error) };
        Self::from_checked(library.clone(), raw, error)
    }

    pub(crate) fn from_owned(library: Arc<NativeLibrary>, raw: *mut SaucerIcon) -> Result<Self> {
        Self::from_checked(library, raw, 0)
    }

    fn from_checked(library: Arc<NativeLibrary>, raw: *mut SaucerIcon, error: c_int) -> Result<Self> {
        let handle =
            NativeHandle::acquire_checked(Self::ENTITY, raw, error, library.vtable().icon_free)?;
        Ok(Self { handle, library })
    }

    pub(crate) fn borrowed(library: Arc<NativeLibrary>, raw: *mut SaucerIcon) -> Self {
        Self {
            handle: NativeHandle::borrowed(Self::ENTITY, raw),
            library,
        }
    }

    pub fn copy(&self) -> Result<Self> {
        let raw = unsafe { (self.library.vtable().icon_copy)(self.handle.address()) };
        Self::from_owned(self.library.clone(), raw)
    }

    pub fn is_empty(&self) -> bool {
        unsafe { (self.library.vtable().icon_empty)(self.handle.address()) }
    }

    /// Encoded image data.
    pub fn data(&self) -> Result<Stash> {
        let raw = unsafe { (self.library.vtable().icon_data)(self.handle.address()) };
        Stash::from_owned(self.library.clone(), raw)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_string_lossy();
        with_text(&path, |path| unsafe {
            (self.library.vtable().icon_save)(self.handle.address(), path)
        })?;
        Ok(())
    }

    pub(crate) fn as_ptr(&self) -> *mut SaucerIcon {
        self.handle.address()
    }
}

impl ManagedEntity for Icon {
    const ENTITY: &'static str = "Icon";

    fn dispose(&self) {
        self.handle.release();
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}

impl std::fmt::Debug for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Icon").field("handle", &self.handle).finish()
    }
}
