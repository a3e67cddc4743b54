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

//! Physical displays.

use std::sync::Arc;

use saucer_abi::SaucerScreen;
use saucer_ffi_primitives::{decode_borrowed_str, decode_pair, NativeHandle};

use super::ManagedEntity;
use crate::error::Result;
use crate::library::NativeLibrary;

/// An owned snapshot of one display, as returned by
/// [`Application::screens`](crate::Application::screens) and
/// [`Window::screen`](crate::Window::screen).
pub struct Screen {
    handle: NativeHandle<SaucerScreen>,
    library: Arc<NativeLibrary>,
}

impl Screen {
    pub(crate) fn from_owned(library: Arc<NativeLibrary>, raw: *mut SaucerScreen) -> Result<Self> {
        let handle = NativeHandle::acquire(Self::ENTITY, raw, library.vtable().screen_free)?;
        Ok(Self { handle, library })
    }

    pub fn name(&self) -> String {
        unsafe { decode_borrowed_str((self.library.vtable().screen_name)(self.handle.address())) }
    }

    /// `(width, height)` in pixels.
    pub fn size(&self) -> (i32, i32) {
        unsafe { decode_pair(self.handle.address(), self.library.vtable().screen_size) }
    }

    /// `(x, y)` of the top-left corner in the virtual desktop.
    pub fn position(&self) -> (i32, i32) {
        unsafe { decode_pair(self.handle.address(), self.library.vtable().screen_position) }
    }
}

impl ManagedEntity for Screen {
    const ENTITY: &'static str = "Screen";

    fn dispose(&self) {
        self.handle.release();
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen").field("handle", &self.handle).finish()
    }
}
