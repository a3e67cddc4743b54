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

//! Pending navigations, handed to the webview's navigate event.

use std::sync::Arc;

use saucer_abi::SaucerNavigation;
use saucer_ffi_primitives::NativeHandle;

use super::url::Url;
use super::ManagedEntity;
use crate::error::Result;
use crate::library::NativeLibrary;

/// A navigation the page is about to perform.
///
/// Only exists inside a navigate handler; the native library offers no way
/// to keep one, so there is no `copy`.
pub struct Navigation {
    handle: NativeHandle<SaucerNavigation>,
    library: Arc<NativeLibrary>,
}

impl Navigation {
    pub(crate) fn borrowed(library: Arc<NativeLibrary>, raw: *mut SaucerNavigation) -> Self {
        Self {
            handle: NativeHandle::borrowed(Self::ENTITY, raw),
            library,
        }
    }

    /// Target of the navigation (owned).
    pub fn url(&self) -> Result<Url> {
        let raw = unsafe { (self.library.vtable().navigation_url)(self.handle.address()) };
        Url::from_owned(self.library.clone(), raw)
    }

    pub fn new_window(&self) -> bool {
        unsafe { (self.library.vtable().navigation_new_window)(self.handle.address()) }
    }

    pub fn redirection(&self) -> bool {
        unsafe { (self.library.vtable().navigation_redirection)(self.handle.address()) }
    }

    pub fn user_initiated(&self) -> bool {
        unsafe { (self.library.vtable().navigation_user_initiated)(self.handle.address()) }
    }
}

impl ManagedEntity for Navigation {
    const ENTITY: &'static str = "Navigation";

    fn dispose(&self) {
        self.handle.release();
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}
