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

//! `saucer-abi`: the saucer C ABI, declared in Rust.
//!
//! Nothing in this crate calls into native code. It only describes the
//! boundary contract so that the host SDK (which calls through it) and any
//! implementation of it (the dynamically loaded library, or an in-process
//! fake) agree on every signature:
//!
//! - [`ffi::types`]: opaque native object types, `#[repr(C)]` enums and flag
//!   types
//! - [`ffi::callbacks`]: the callback signature of every event category
//! - [`ffi::vtables`]: [`SaucerVtable`], one function pointer per native
//!   function

pub mod ffi;

pub use ffi::*;
