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

//! Callback signatures for every native event category.
//!
//! Each alias is the exact shape the native library invokes. Every callback
//! ends with the `userdata` context token that was supplied at registration.
//! Enum arguments arrive as raw `c_int` (see [`super::types`]).

use std::ffi::{c_char, c_void};
use std::os::raw::c_int;

use super::types::*;

// ============================================================================
// Application
// ============================================================================

pub type ApplicationQuitCallback =
    unsafe extern "C" fn(application: *mut SaucerApplication, userdata: *mut c_void) -> SaucerPolicy;

pub type PostCallback = unsafe extern "C" fn(userdata: *mut c_void);

/// Shared by the `run` and `finish` hooks of `saucer_application_run`.
pub type RunCallback =
    unsafe extern "C" fn(application: *mut SaucerApplication, userdata: *mut c_void);

// ============================================================================
// Scheme
// ============================================================================

pub type SchemeHandlerCallback = unsafe extern "C" fn(
    request: *mut SaucerSchemeRequest,
    executor: *mut SaucerSchemeExecutor,
    userdata: *mut c_void,
);

// ============================================================================
// Window
// ============================================================================

pub type WindowDecoratedCallback =
    unsafe extern "C" fn(window: *mut SaucerWindow, decoration: c_int, userdata: *mut c_void);

/// Shared by the maximize, minimize and focus events.
pub type WindowToggleCallback =
    unsafe extern "C" fn(window: *mut SaucerWindow, value: bool, userdata: *mut c_void);

pub type WindowClosedCallback = unsafe extern "C" fn(window: *mut SaucerWindow, userdata: *mut c_void);

pub type WindowResizeCallback = unsafe extern "C" fn(
    window: *mut SaucerWindow,
    width: c_int,
    height: c_int,
    userdata: *mut c_void,
);

pub type WindowCloseCallback =
    unsafe extern "C" fn(window: *mut SaucerWindow, userdata: *mut c_void) -> SaucerPolicy;

// ============================================================================
// Webview
// ============================================================================

pub type WebviewPermissionCallback = unsafe extern "C" fn(
    webview: *mut SaucerWebview,
    request: *mut SaucerPermissionRequest,
    userdata: *mut c_void,
) -> SaucerStatus;

pub type WebviewFullscreenCallback =
    unsafe extern "C" fn(webview: *mut SaucerWebview, fullscreen: bool, userdata: *mut c_void) -> SaucerPolicy;

pub type WebviewDomReadyCallback = unsafe extern "C" fn(webview: *mut SaucerWebview, userdata: *mut c_void);

/// Shared by the navigated and request events.
pub type WebviewUrlCallback =
    unsafe extern "C" fn(webview: *mut SaucerWebview, url: *mut SaucerUrl, userdata: *mut c_void);

pub type WebviewNavigateCallback = unsafe extern "C" fn(
    webview: *mut SaucerWebview,
    navigation: *mut SaucerNavigation,
    userdata: *mut c_void,
) -> SaucerPolicy;

pub type WebviewMessageCallback = unsafe extern "C" fn(
    webview: *mut SaucerWebview,
    message: *const c_char,
    size: usize,
    userdata: *mut c_void,
) -> SaucerStatus;

pub type WebviewFaviconCallback =
    unsafe extern "C" fn(webview: *mut SaucerWebview, icon: *mut SaucerIcon, userdata: *mut c_void);

pub type WebviewTitleCallback = unsafe extern "C" fn(
    webview: *mut SaucerWebview,
    title: *const c_char,
    size: usize,
    userdata: *mut c_void,
);

pub type WebviewLoadCallback =
    unsafe extern "C" fn(webview: *mut SaucerWebview, state: c_int, userdata: *mut c_void);
