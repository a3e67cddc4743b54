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

//! Small FFI-safe helpers shared by the host SDK and the mock native library.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// A `*const T` that may be moved across threads.
///
/// Native callbacks hand us raw pointers that are only meaningful to the
/// native library. Wrapping them lets those pointers travel inside `Send`
/// closures without the wrapper asserting anything about the pointee.
#[derive(Debug)]
#[repr(transparent)]
pub struct SendPtr<T>(pub *const T);

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    pub fn as_ptr(&self) -> *const T {
        self.0
    }
}

impl<T> Clone for SendPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SendPtr<T> {}

/// A `*mut T` that may be moved across threads.
#[derive(Debug)]
#[repr(transparent)]
pub struct SendMutPtr<T>(pub *mut T);

unsafe impl<T> Send for SendMutPtr<T> {}
unsafe impl<T> Sync for SendMutPtr<T> {}

impl<T> SendMutPtr<T> {
    pub fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn as_ptr(&self) -> *mut T {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl<T> Clone for SendMutPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SendMutPtr<T> {}

/// Run `f`, converting a panic into `fallback()` instead of unwinding.
///
/// Every `extern "C"` entry point that calls user code goes through this:
/// unwinding out of an `extern "C"` function aborts the process, and a
/// misbehaving event handler must not take the host down with it.
pub fn catch_panic_ffi<R>(
    context: &str,
    fallback: impl FnOnce() -> R,
    f: impl FnOnce() -> R,
) -> R {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            log::warn!("{context} panicked: {}", panic_message(payload.as_ref()));
            fallback()
        }
    }
}

/// Best-effort extraction of a panic payload's message.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_panic_ffi_passes_value_through() {
        let value = catch_panic_ffi("ok", || 0, || 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_catch_panic_ffi_returns_fallback_on_panic() {
        let value = catch_panic_ffi("boom", || 7, || -> i32 { panic!("handler failed") });
        assert_eq!(value, 7);
    }

    #[test]
    fn test_panic_message_variants() {
        let static_payload: Box<dyn Any + Send> = Box::new("static");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other_payload: Box<dyn Any + Send> = Box::new(5u8);
        assert_eq!(panic_message(static_payload.as_ref()), "static");
        assert_eq!(panic_message(owned_payload.as_ref()), "owned");
        assert_eq!(
            panic_message(other_payload.as_ref()),
            "<non-string panic payload>"
        );
    }

    #[test]
    fn test_send_mut_ptr_null() {
        let ptr = SendMutPtr::<u8>::null();
        assert!(ptr.is_null());
        let copy = ptr;
        assert!(copy.as_ptr().is_null());
    }
}
