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

//! Native byte buffers.

use std::sync::Arc;

use saucer_abi::SaucerStash;
use saucer_ffi_primitives::{with_text, NativeHandle};

use super::ManagedEntity;
use crate::error::Result;
use crate::library::NativeLibrary;

/// An owned native byte buffer, used for embedded content, icon data and
/// scheme request and response bodies.
pub struct Stash {
    handle: NativeHandle<SaucerStash>,
    library: Arc<NativeLibrary>,
}

impl Stash {
    /// Copy `data` into a new native buffer.
    pub fn from_bytes(library: &Arc<NativeLibrary>, data: &[u8]) -> Result<Self> {
        let raw = unsafe { (library.vtable().stash_new_from)(data.as_ptr(), data.len()) };
        Self::from_owned(library.clone(), raw)
    }

    pub fn from_str(library: &Arc<NativeLibrary>, text: &str) -> Result<Self> {
        let raw = with_text(text, |text| unsafe { (library.vtable().stash_new_from_str)(text) })?;
        Self::from_owned(library.clone(), raw)
    }

    pub fn empty(library: &Arc<NativeLibrary>) -> Result<Self> {
        let raw = unsafe { (library.vtable().stash_new_empty)() };
        Self::from_owned(library.clone(), raw)
    }

    pub(crate) fn from_owned(library: Arc<NativeLibrary>, raw: *mut SaucerStash) -> Result<Self> {
        let handle = NativeHandle::acquire(Self::ENTITY, raw, library.vtable().stash_free)?;
        Ok(Self { handle, library })
    }

    pub fn copy(&self) -> Result<Self> {
        let raw = unsafe { (self.library.vtable().stash_copy)(self.handle.address()) };
        Self::from_owned(self.library.clone(), raw)
    }

    pub fn size(&self) -> usize {
        unsafe { (self.library.vtable().stash_size)(self.handle.address()) }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Copy the buffer contents out.
    pub fn to_vec(&self) -> Vec<u8> {
        let raw = self.handle.address();
        let vtable = self.library.vtable();
        let size = unsafe { (vtable.stash_size)(raw) };
        let data = unsafe { (vtable.stash_data)(raw) };
        if data.is_null() || size == 0 {
            return Vec::new();
        }
        unsafe { std::slice::from_raw_parts(data, size) }.to_vec()
    }

    pub(crate) fn as_ptr(&self) -> *mut SaucerStash {
        self.handle.address()
    }
}

impl ManagedEntity for Stash {
    const ENTITY: &'static str = "Stash";

    fn dispose(&self) {
        self.handle.release();
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}

impl std::fmt::Debug for Stash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stash").field("handle", &self.handle).finish()
    }
}
