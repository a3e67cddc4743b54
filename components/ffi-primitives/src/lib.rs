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

//! `saucer-ffi-primitives`: boundary primitives shared by every saucer proxy.
//!
//! This crate knows nothing about windows or webviews. It provides the two
//! leaf components every wrapped native object is built from:
//!
//! - [`codec`]: moving text, byte buffers and fixed-shape values across the
//!   C boundary, including the two-phase "query size, then fill" protocol
//! - [`handle`]: [`NativeHandle`], the single owner of one opaque native
//!   address and the chokepoint for liveness checks
//!
//! plus a handful of FFI helpers ([`SendPtr`], [`SendMutPtr`],
//! [`catch_panic_ffi`]) and the [`ffi_opaque!`] macro used to declare opaque
//! native object types.

pub mod codec;
pub mod handle;
pub mod macros;
pub mod types;

pub use codec::{
    decode_borrowed_str, decode_pair, decode_quad, decode_text_arg, decode_variable,
    decode_variable_text, encode_text, with_optional_text, with_text, CodecError,
    SizedQueryFn, MAX_VARIABLE_LEN,
};
pub use handle::{FreeFn, HandleError, NativeHandle};
pub use types::*;
