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

//! Moving values across the C boundary.
//!
//! The native library returns variable-length data (titles, URLs, stash
//! contents, screen lists) through a two-phase protocol:
//!
//! 1. call the query with a null buffer; the native side reports the
//!    element count through the size out-parameter
//! 2. allocate exactly that many elements and call again with the buffer;
//!    the native side fills it and reports the count written
//!
//! A reported size of zero short-circuits to an empty result without the
//! second call. Fixed-shape values (pairs, quads) are read through
//! out-parameters in a single call.
//!
//! Outbound text is always NUL-terminated and lives only for the duration of
//! the native call it is passed to.

use std::ffi::{c_char, CStr, CString};
use std::string::FromUtf8Error;

/// Upper bound on the element count accepted from a size query.
///
/// Anything larger is treated as a corrupted report rather than allocated.
pub const MAX_VARIABLE_LEN: usize = 256 * 1024 * 1024;

/// Signature shared by every two-phase query: `(handle, buffer, size)`.
///
/// A null `buffer` asks for the size only.
pub type SizedQueryFn<H, T> = unsafe extern "C" fn(*mut H, *mut T, *mut usize);

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("native handle is null")]
    NullHandle,
    #[error("native library reported an invalid size: {size}")]
    InvalidSize { size: usize },
    #[error("native library reported {reported} elements but wrote {written}")]
    SizeMismatch { reported: usize, written: usize },
    #[error("native text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
    #[error("text contains an interior NUL byte at position {position}")]
    InteriorNul { position: usize },
}

/// Run the two-phase protocol for `query` against `handle`.
///
/// # Safety
///
/// `handle` must be a live native object accepted by `query`, and `query`
/// must honor the protocol described in the module docs.
pub unsafe fn decode_variable<H, T: Copy + Default>(
    handle: *mut H,
    query: SizedQueryFn<H, T>,
) -> Result<Vec<T>, CodecError> {
    if handle.is_null() {
        return Err(CodecError::NullHandle);
    }

    let mut reported = 0usize;
    query(handle, std::ptr::null_mut(), &mut reported);

    if reported == 0 {
        return Ok(Vec::new());
    }
    if reported > MAX_VARIABLE_LEN {
        return Err(CodecError::InvalidSize { size: reported });
    }

    let mut buffer = vec![T::default(); reported];
    let mut written = reported;
    query(handle, buffer.as_mut_ptr(), &mut written);

    if written != reported {
        return Err(CodecError::SizeMismatch { reported, written });
    }

    Ok(buffer)
}

/// Two-phase query for text. The bytes are decoded as strict UTF-8.
///
/// # Safety
///
/// Same contract as [`decode_variable`].
pub unsafe fn decode_variable_text<H>(
    handle: *mut H,
    query: SizedQueryFn<H, c_char>,
) -> Result<String, CodecError> {
    let chars = decode_variable(handle, query)?;
    let bytes = chars.into_iter().map(|c| c as u8).collect::<Vec<u8>>();
    Ok(String::from_utf8(bytes)?)
}

/// Read a two-value out-parameter pair such as a size or position.
///
/// # Safety
///
/// `handle` must be a live native object accepted by `query`.
pub unsafe fn decode_pair<H, T: Copy + Default>(
    handle: *mut H,
    query: unsafe extern "C" fn(*mut H, *mut T, *mut T),
) -> (T, T) {
    debug_assert!(!handle.is_null(), "decode_pair on a null handle");
    let mut first = T::default();
    let mut second = T::default();
    query(handle, &mut first, &mut second);
    (first, second)
}

/// Read a four-value out-parameter group such as a color.
///
/// # Safety
///
/// `handle` must be a live native object accepted by `query`.
pub unsafe fn decode_quad<H, T: Copy + Default>(
    handle: *mut H,
    query: unsafe extern "C" fn(*mut H, *mut T, *mut T, *mut T, *mut T),
) -> [T; 4] {
    debug_assert!(!handle.is_null(), "decode_quad on a null handle");
    let mut out = [T::default(); 4];
    let [a, b, c, d] = &mut out;
    query(handle, a, b, c, d);
    out
}

/// Encode `text` as a NUL-terminated native string.
pub fn encode_text(text: &str) -> Result<CString, CodecError> {
    CString::new(text).map_err(|e| CodecError::InteriorNul {
        position: e.nul_position(),
    })
}

/// Call `f` with a NUL-terminated copy of `text` that lives for the call.
pub fn with_text<R>(text: &str, f: impl FnOnce(*const c_char) -> R) -> Result<R, CodecError> {
    let encoded = encode_text(text)?;
    Ok(f(encoded.as_ptr()))
}

/// Like [`with_text`], passing a null pointer for `None`.
pub fn with_optional_text<R>(
    text: Option<&str>,
    f: impl FnOnce(*const c_char) -> R,
) -> Result<R, CodecError> {
    match text {
        Some(text) => with_text(text, f),
        None => Ok(f(std::ptr::null())),
    }
}

/// Copy a NUL-terminated string borrowed from the native side.
///
/// A null pointer decodes as the empty string. Invalid UTF-8 is replaced
/// lossily since callers on this path cannot report an error.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for reads.
pub unsafe fn decode_borrowed_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Copy a `(pointer, length)` text argument handed to a callback.
///
/// # Safety
///
/// `ptr` must be null or point to `len` readable bytes.
pub unsafe fn decode_text_arg(ptr: *const c_char, len: usize) -> String {
    if ptr.is_null() || len == 0 {
        return String::new();
    }
    let bytes = std::slice::from_raw_parts(ptr.cast::<u8>(), len);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::ptr::NonNull;

    struct Fake;

    thread_local! {
        static CALLS: Cell<usize> = const { Cell::new(0) };
        static CONTENT: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
        static SHORT_WRITE: Cell<bool> = const { Cell::new(false) };
    }

    fn reset(content: &[u8]) {
        CALLS.with(|c| c.set(0));
        SHORT_WRITE.with(|s| s.set(false));
        CONTENT.with(|c| *c.borrow_mut() = content.to_vec());
    }

    unsafe extern "C" fn query_text(_handle: *mut Fake, buffer: *mut c_char, size: *mut usize) {
        CALLS.with(|c| c.set(c.get() + 1));
        CONTENT.with(|content| {
            let content = content.borrow();
            if buffer.is_null() {
                *size = content.len();
                return;
            }
            let count = if SHORT_WRITE.with(|s| s.get()) {
                content.len() - 1
            } else {
                content.len()
            };
            std::ptr::copy_nonoverlapping(content.as_ptr().cast::<c_char>(), buffer, count);
            *size = count;
        });
    }

    unsafe extern "C" fn query_huge(_handle: *mut Fake, _buffer: *mut u8, size: *mut usize) {
        *size = MAX_VARIABLE_LEN + 1;
    }

    unsafe extern "C" fn query_pair(_handle: *mut Fake, w: *mut i32, h: *mut i32) {
        *w = 800;
        *h = 600;
    }

    unsafe extern "C" fn query_quad(_handle: *mut Fake, r: *mut u8, g: *mut u8, b: *mut u8, a: *mut u8) {
        *r = 1;
        *g = 2;
        *b = 3;
        *a = 4;
    }

    fn handle() -> *mut Fake {
        NonNull::<Fake>::dangling().as_ptr()
    }

    #[test]
    fn test_decode_text_uses_two_calls() {
        reset(b"hello");
        let text = unsafe { decode_variable_text(handle(), query_text) }.unwrap();
        assert_eq!(text, "hello");
        assert_eq!(CALLS.with(|c| c.get()), 2);
    }

    #[test]
    fn test_decode_empty_skips_fill_call() {
        reset(b"");
        let text = unsafe { decode_variable_text(handle(), query_text) }.unwrap();
        assert_eq!(text, "");
        assert_eq!(CALLS.with(|c| c.get()), 1);
    }

    #[test]
    fn test_decode_null_handle() {
        reset(b"ignored");
        let result = unsafe { decode_variable_text(std::ptr::null_mut(), query_text) };
        assert!(matches!(result, Err(CodecError::NullHandle)));
        assert_eq!(CALLS.with(|c| c.get()), 0);
    }

    #[test]
    fn test_decode_size_mismatch() {
        reset(b"abc");
        SHORT_WRITE.with(|s| s.set(true));
        let result = unsafe { decode_variable_text(handle(), query_text) };
        assert!(matches!(
            result,
            Err(CodecError::SizeMismatch {
                reported: 3,
                written: 2
            })
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        reset(&[0x66, 0xff, 0x66]);
        let result = unsafe { decode_variable_text(handle(), query_text) };
        assert!(matches!(result, Err(CodecError::InvalidUtf8(_))));
    }

    #[test]
    fn test_decode_rejects_oversized_report() {
        let result = unsafe { decode_variable(handle(), query_huge) };
        assert!(matches!(result, Err(CodecError::InvalidSize { .. })));
    }

    #[test]
    fn test_decode_pair_and_quad() {
        assert_eq!(unsafe { decode_pair(handle(), query_pair) }, (800, 600));
        assert_eq!(unsafe { decode_quad(handle(), query_quad) }, [1, 2, 3, 4]);
    }

    #[test]
    fn test_encode_text_rejects_interior_nul() {
        let err = encode_text("ab\0c").unwrap_err();
        assert!(matches!(err, CodecError::InteriorNul { position: 2 }));
        assert!(with_text("a\0", |_| ()).is_err());
    }

    #[test]
    fn test_with_text_is_nul_terminated() {
        let copied = with_text("saucer", |ptr| unsafe { decode_borrowed_str(ptr) }).unwrap();
        assert_eq!(copied, "saucer");
    }

    #[test]
    fn test_with_optional_text_none_is_null() {
        let was_null = with_optional_text(None, |ptr| ptr.is_null()).unwrap();
        assert!(was_null);
    }

    #[test]
    fn test_borrowed_and_arg_decoding() {
        assert_eq!(unsafe { decode_borrowed_str(std::ptr::null()) }, "");
        let text = "payload";
        let decoded = unsafe { decode_text_arg(text.as_ptr().cast(), text.len()) };
        assert_eq!(decoded, "payload");
        assert_eq!(unsafe { decode_text_arg(std::ptr::null(), 4) }, "");
    }
}
