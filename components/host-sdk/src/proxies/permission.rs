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

//! Permission prompts raised by pages.

use std::sync::Arc;

use saucer_abi::{SaucerPermissionRequest, SaucerPermissionType};
use saucer_ffi_primitives::NativeHandle;

use super::url::Url;
use super::ManagedEntity;
use crate::error::Result;
use crate::library::NativeLibrary;

/// A page asking for one or more capabilities.
///
/// Borrowed inside the permission handler. Answer it there, or [`copy`]
/// it to answer later.
///
/// [`copy`]: PermissionRequest::copy
pub struct PermissionRequest {
    handle: NativeHandle<SaucerPermissionRequest>,
    library: Arc<NativeLibrary>,
}

impl PermissionRequest {
    pub(crate) fn borrowed(library: Arc<NativeLibrary>, raw: *mut SaucerPermissionRequest) -> Self {
        Self {
            handle: NativeHandle::borrowed(Self::ENTITY, raw),
            library,
        }
    }

    pub fn copy(&self) -> Result<Self> {
        let vtable = self.library.vtable();
        let raw = unsafe { (vtable.permission_request_copy)(self.handle.address()) };
        let handle = NativeHandle::acquire(Self::ENTITY, raw, vtable.permission_request_free)?;
        Ok(Self {
            handle,
            library: self.library.clone(),
        })
    }

    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    /// Origin of the request (owned).
    pub fn url(&self) -> Result<Url> {
        let raw = unsafe { (self.library.vtable().permission_request_url)(self.handle.address()) };
        Url::from_owned(self.library.clone(), raw)
    }

    pub fn kind(&self) -> SaucerPermissionType {
        unsafe { (self.library.vtable().permission_request_type)(self.handle.address()) }
    }

    pub fn accept(&self) {
        self.respond(true);
    }

    pub fn deny(&self) {
        self.respond(false);
    }

    fn respond(&self, accept: bool) {
        log::debug!("Permission request {:?} answered: accept={accept}", self.kind());
        unsafe { (self.library.vtable().permission_request_accept)(self.handle.address(), accept) }
    }
}

impl ManagedEntity for PermissionRequest {
    const ENTITY: &'static str = "PermissionRequest";

    fn dispose(&self) {
        self.handle.release();
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}
