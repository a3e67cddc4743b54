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

//! An in-process fake of the saucer native library.
//!
//! [`vtable()`] returns a fully populated [`SaucerVtable`] backed by plain
//! Rust objects, so the host SDK can be exercised end to end without a
//! browser engine. The fake follows the native contract where the host can
//! observe it:
//!
//! - constructors report through error out-parameters and may be told to
//!   fail with [`fail_next_construction`]
//! - text and array getters implement the query-then-fill protocol
//! - listeners are kept per event with one-shots removed before they run,
//!   and `off_all` leaves one-shots in place
//! - setters that the engine would answer with an event (size, maximize,
//!   close, navigation) fire that event synchronously
//!
//! Tests drive the other direction through the `emit_*` methods on
//! [`MockApplication`], [`MockWindow`] and [`MockWebview`], reached with
//! [`latest_application`], [`latest_window`] and [`latest_webview`].

use std::os::raw::c_int;

use saucer_abi::SaucerVtable;

mod exports;
mod listeners;
mod objects;
mod tracking;

pub use listeners::CallStats;
pub use objects::{
    MockApplication, MockWebview, MockWindow, SchemeOutcome, SchemeReply, ScreenSpec, UrlParts,
    WebviewConfig, WebviewState, WindowState,
};
pub use tracking::{
    fail_next_construction, latest_application, latest_webview, latest_window, live_objects,
    registered_schemes,
};

/// What `saucer_version` reports.
pub const VERSION: &str = "saucer-mock 8.0.0";

pub(crate) const VERSION_C: &[u8] = b"saucer-mock 8.0.0\0";

/// Error code reported for malformed input (urls, icons, missing parents).
pub const INVALID_ARGUMENT: c_int = 22;

/// A function table whose every entry is implemented by this crate.
pub fn vtable() -> SaucerVtable {
    exports::table()
}
