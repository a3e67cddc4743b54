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

//! Custom scheme requests, executors and responses.
//!
//! A scheme handler registered with
//! [`Webview::handle_scheme`](crate::Webview::handle_scheme) receives a
//! borrowed [`SchemeRequest`] and [`SchemeExecutor`]. Answer synchronously
//! through the executor, or `copy()` both to answer later from anywhere.

use std::sync::Arc;

use saucer_abi::{SaucerSchemeError, SaucerSchemeExecutor, SaucerSchemeRequest, SaucerSchemeResponse};
use saucer_ffi_primitives::{decode_variable_text, with_text, NativeHandle};

use super::stash::Stash;
use super::url::Url;
use super::ManagedEntity;
use crate::error::Result;
use crate::library::NativeLibrary;

// ============================================================================
// Request
// ============================================================================

pub struct SchemeRequest {
    handle: NativeHandle<SaucerSchemeRequest>,
    library: Arc<NativeLibrary>,
}

impl SchemeRequest {
    pub(crate) fn borrowed(library: Arc<NativeLibrary>, raw: *mut SaucerSchemeRequest) -> Self {
        Self {
            handle: NativeHandle::borrowed(Self::ENTITY, raw),
            library,
        }
    }

    pub fn copy(&self) -> Result<Self> {
        let vtable = self.library.vtable();
        let raw = unsafe { (vtable.scheme_request_copy)(self.handle.address()) };
        let handle = NativeHandle::acquire(Self::ENTITY, raw, vtable.scheme_request_free)?;
        Ok(Self {
            handle,
            library: self.library.clone(),
        })
    }

    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    /// Requested URL (owned).
    pub fn url(&self) -> Result<Url> {
        let raw = unsafe { (self.library.vtable().scheme_request_url)(self.handle.address()) };
        Url::from_owned(self.library.clone(), raw)
    }

    /// HTTP method, e.g. `GET`.
    pub fn method(&self) -> Result<String> {
        Ok(unsafe {
            decode_variable_text(self.handle.address(), self.library.vtable().scheme_request_method)
        }?)
    }

    /// Raw request headers as reported by the browser engine.
    pub fn headers(&self) -> Result<String> {
        Ok(unsafe {
            decode_variable_text(self.handle.address(), self.library.vtable().scheme_request_headers)
        }?)
    }

    /// Request body (owned).
    pub fn content(&self) -> Result<Stash> {
        let raw = unsafe { (self.library.vtable().scheme_request_content)(self.handle.address()) };
        Stash::from_owned(self.library.clone(), raw)
    }
}

impl ManagedEntity for SchemeRequest {
    const ENTITY: &'static str = "SchemeRequest";

    fn dispose(&self) {
        self.handle.release();
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}

// ============================================================================
// Executor
// ============================================================================

pub struct SchemeExecutor {
    handle: NativeHandle<SaucerSchemeExecutor>,
    library: Arc<NativeLibrary>,
}

impl SchemeExecutor {
    pub(crate) fn borrowed(library: Arc<NativeLibrary>, raw: *mut SaucerSchemeExecutor) -> Self {
        Self {
            handle: NativeHandle::borrowed(Self::ENTITY, raw),
            library,
        }
    }

    pub fn copy(&self) -> Result<Self> {
        let vtable = self.library.vtable();
        let raw = unsafe { (vtable.scheme_executor_copy)(self.handle.address()) };
        let handle = NativeHandle::acquire(Self::ENTITY, raw, vtable.scheme_executor_free)?;
        Ok(Self {
            handle,
            library: self.library.clone(),
        })
    }

    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    /// Complete the request with `response`. The response is not consumed.
    pub fn accept(&self, response: &SchemeResponse) {
        unsafe { (self.library.vtable().scheme_executor_accept)(self.handle.address(), response.as_ptr()) }
    }

    pub fn reject(&self, error: SaucerSchemeError) {
        log::debug!("Rejecting scheme request: {error:?}");
        unsafe { (self.library.vtable().scheme_executor_reject)(self.handle.address(), error) }
    }
}

impl ManagedEntity for SchemeExecutor {
    const ENTITY: &'static str = "SchemeExecutor";

    fn dispose(&self) {
        self.handle.release();
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}

// ============================================================================
// Response
// ============================================================================

pub struct SchemeResponse {
    handle: NativeHandle<SaucerSchemeResponse>,
    library: Arc<NativeLibrary>,
}

impl SchemeResponse {
    /// Build a response serving `body` as `mime`. The stash is not consumed.
    pub fn new(library: &Arc<NativeLibrary>, body: &Stash, mime: &str) -> Result<Self> {
        let vtable = library.vtable();
        let raw = with_text(mime, |mime| unsafe { (vtable.scheme_response_new)(body.as_ptr(), mime) })?;
        let handle = NativeHandle::acquire(Self::ENTITY, raw, vtable.scheme_response_free)?;
        Ok(Self {
            handle,
            library: library.clone(),
        })
    }

    pub fn append_header(&self, name: &str, value: &str) -> Result<()> {
        let raw = self.handle.address();
        with_text(name, |name| {
            with_text(value, |value| unsafe {
                (self.library.vtable().scheme_response_append_header)(raw, name, value)
            })
        })??;
        Ok(())
    }

    pub fn set_status(&self, status: i32) {
        unsafe { (self.library.vtable().scheme_response_set_status)(self.handle.address(), status) }
    }

    pub(crate) fn as_ptr(&self) -> *mut SaucerSchemeResponse {
        self.handle.address()
    }
}

impl ManagedEntity for SchemeResponse {
    const ENTITY: &'static str = "SchemeResponse";

    fn dispose(&self) {
        self.handle.release();
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}
