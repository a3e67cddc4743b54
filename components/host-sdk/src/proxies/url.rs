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

//! Parsed URLs.

use std::os::raw::c_int;
use std::sync::Arc;

use saucer_abi::SaucerUrl;
use saucer_ffi_primitives::{decode_variable_text, encode_text, with_text, NativeHandle};

use super::ManagedEntity;
use crate::error::Result;
use crate::library::NativeLibrary;

pub struct Url {
    handle: NativeHandle<SaucerUrl>,
    library: Arc<NativeLibrary>,
}

impl Url {
    /// Strictly parse `value` as a URL.
    pub fn parse(library: &Arc<NativeLibrary>, value: &str) -> Result<Self> {
        let mut error: c_int = 0;
        let raw = with_text(value, |value| unsafe {
            (library.vtable().url_new_parse)(value, &mut error)
        })?;
        Self::from_checked(library.clone(), raw, error)
    }

    /// Build a URL from user input, which may also be a file path.
    pub fn from_input(library: &Arc<NativeLibrary>, value: &str) -> Result<Self> {
        let mut error: c_int = 0;
        let raw = with_text(value, |value| unsafe {
            (library.vtable().url_new_from)(value, &mut error)
        })?;
        Self::from_checked(library.clone(), raw, error)
    }

    pub fn from_components(
        library: &Arc<NativeLibrary>,
        scheme: &str,
        host: Option<&str>,
        port: Option<usize>,
        path: &str,
    ) -> Result<Self> {
        let scheme = encode_text(scheme)?;
        let host = host.map(encode_text).transpose()?;
        let path = encode_text(path)?;
        let port = port.as_ref().map_or(std::ptr::null(), |port| port as *const usize);
        let raw = unsafe {
            (library.vtable().url_new_opts)(
                scheme.as_ptr(),
                host.as_ref().map_or(std::ptr::null(), |host| host.as_ptr()),
                port,
                path.as_ptr(),
            )
        };
        Self::from_owned(library.clone(), raw)
    }

    pub(crate) fn from_owned(library: Arc<NativeLibrary>, raw: *mut SaucerUrl) -> Result<Self> {
        Self::from_checked(library, raw, 0)
    }

    fn from_checked(library: Arc<NativeLibrary>, raw: *mut SaucerUrl, error: c_int) -> Result<Self> {
        let handle =
            NativeHandle::acquire_checked(Self::ENTITY, raw, error, library.vtable().url_free)?;
        Ok(Self { handle, library })
    }

    /// Wrap a url owned by the native side for the duration of a callback.
    pub(crate) fn borrowed(library: Arc<NativeLibrary>, raw: *mut SaucerUrl) -> Self {
        Self {
            handle: NativeHandle::borrowed(Self::ENTITY, raw),
            library,
        }
    }

    pub fn copy(&self) -> Result<Self> {
        let raw = unsafe { (self.library.vtable().url_copy)(self.handle.address()) };
        Self::from_owned(self.library.clone(), raw)
    }

    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    pub fn string(&self) -> Result<String> {
        Ok(unsafe { decode_variable_text(self.handle.address(), self.library.vtable().url_string) }?)
    }

    pub fn scheme(&self) -> Result<String> {
        Ok(unsafe { decode_variable_text(self.handle.address(), self.library.vtable().url_scheme) }?)
    }

    pub fn host(&self) -> Result<String> {
        Ok(unsafe { decode_variable_text(self.handle.address(), self.library.vtable().url_host) }?)
    }

    pub fn path(&self) -> Result<String> {
        Ok(unsafe { decode_variable_text(self.handle.address(), self.library.vtable().url_path) }?)
    }

    pub fn user(&self) -> Result<String> {
        Ok(unsafe { decode_variable_text(self.handle.address(), self.library.vtable().url_user) }?)
    }

    pub fn password(&self) -> Result<String> {
        Ok(unsafe {
            decode_variable_text(self.handle.address(), self.library.vtable().url_password)
        }?)
    }

    pub fn port(&self) -> Option<usize> {
        let mut port = 0usize;
        let present = unsafe { (self.library.vtable().url_port)(self.handle.address(), &mut port) };
        present.then_some(port)
    }

    pub(crate) fn as_ptr(&self) -> *mut SaucerUrl {
        self.handle.address()
    }
}

impl ManagedEntity for Url {
    const ENTITY: &'static str = "Url";

    fn dispose(&self) {
        self.handle.release();
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}

impl std::fmt::Debug for Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Url").field("handle", &self.handle).finish()
    }
}
