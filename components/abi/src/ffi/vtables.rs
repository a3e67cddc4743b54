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

//! The `#[repr(C)]` function table for the saucer native library.
//!
//! [`SaucerVtable`] is the contract between the host SDK and whatever
//! implements the native API. Every field corresponds to one exported
//! `saucer_<field>` symbol, and [`SaucerVtable::resolve`] builds the table
//! from a symbol lookup so that a dynamically loaded library and an
//! in-process implementation are interchangeable.
//!
//! Conventions the signatures follow:
//!
//! - functions named `*_new*` and `*_copy` return an owned object that must be
//!   released with the matching `*_free`
//! - fallible constructors report through a trailing `error` out-parameter
//!   (0 on success) *and* may return null
//! - text and array getters take `(handle, buffer, size)` and follow the
//!   query-then-fill protocol: a null buffer only reports the size
//! - `*_on` returns a subscription id, `*_once` returns nothing, and the
//!   callback is passed untyped because its shape depends on the event

use std::ffi::{c_char, c_void};
use std::fmt;
use std::os::raw::c_int;
use std::ptr::NonNull;

use super::callbacks::{PostCallback, RunCallback, SchemeHandlerCallback};
use super::types::*;

macro_rules! saucer_vtable {
    (
        $(
            $(#[$section:meta])*
            fn $name:ident ( $( $arg:ident : $ty:ty ),* $(,)? ) $( -> $ret:ty )? ;
        )*
    ) => {
        /// Function table for every native entry point the host uses.
        #[repr(C)]
        #[derive(Clone, Copy)]
        pub struct SaucerVtable {
            $(
                $(#[$section])*
                pub $name: unsafe extern "C" fn( $( $arg : $ty ),* ) $( -> $ret )?,
            )*
        }

        impl SaucerVtable {
            /// Every exported symbol name, in field order.
            pub const SYMBOLS: &'static [&'static str] = &[
                $( concat!("saucer_", stringify!($name)), )*
            ];

            /// Build the table by resolving every symbol through `lookup`.
            ///
            /// Resolution stops at the first symbol `lookup` fails on.
            ///
            /// # Safety
            ///
            /// Each address `lookup` returns must be a function with exactly
            /// the signature of the corresponding field.
            pub unsafe fn resolve<E>(
                mut lookup: impl FnMut(&'static str) -> Result<NonNull<c_void>, E>,
            ) -> Result<Self, E> {
                Ok(Self {
                    $(
                        $name: {
                            let address = lookup(concat!("saucer_", stringify!($name)))?;
                            std::mem::transmute::<*mut c_void, unsafe extern "C" fn( $( $ty ),* ) $( -> $ret )?>(
                                address.as_ptr(),
                            )
                        },
                    )*
                })
            }
        }
    };
}

saucer_vtable! {
    // ========================================================================
    // Stash
    // ========================================================================
    fn stash_data(stash: *mut SaucerStash) -> *const u8;
    fn stash_size(stash: *mut SaucerStash) -> usize;
    fn stash_free(stash: *mut SaucerStash);
    fn stash_copy(stash: *mut SaucerStash) -> *mut SaucerStash;
    fn stash_new_from(data: *const u8, size: usize) -> *mut SaucerStash;
    fn stash_new_from_str(text: *const c_char) -> *mut SaucerStash;
    fn stash_new_empty() -> *mut SaucerStash;

    // ========================================================================
    // Url
    // ========================================================================
    fn url_free(url: *mut SaucerUrl);
    fn url_copy(url: *mut SaucerUrl) -> *mut SaucerUrl;
    fn url_new_parse(value: *const c_char, error: *mut c_int) -> *mut SaucerUrl;
    fn url_new_from(value: *const c_char, error: *mut c_int) -> *mut SaucerUrl;
    fn url_new_opts(
        scheme: *const c_char,
        host: *const c_char,
        port: *const usize,
        path: *const c_char,
    ) -> *mut SaucerUrl;
    fn url_string(url: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize);
    fn url_path(url: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize);
    fn url_scheme(url: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize);
    fn url_host(url: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize);
    fn url_port(url: *mut SaucerUrl, port: *mut usize) -> bool;
    fn url_user(url: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize);
    fn url_password(url: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize);

    // ========================================================================
    // Icon
    // ========================================================================
    fn icon_empty(icon: *mut SaucerIcon) -> bool;
    fn icon_data(icon: *mut SaucerIcon) -> *mut SaucerStash;
    fn icon_save(icon: *mut SaucerIcon, path: *const c_char);
    fn icon_free(icon: *mut SaucerIcon);
    fn icon_copy(icon: *mut SaucerIcon) -> *mut SaucerIcon;
    fn icon_new_from_file(path: *const c_char, error: *mut c_int) -> *mut SaucerIcon;
    fn icon_new_from_stash(stash: *mut SaucerStash, error: *mut c_int) -> *mut SaucerIcon;

    // ========================================================================
    // Navigation
    // ========================================================================
    fn navigation_url(navigation: *mut SaucerNavigation) -> *mut SaucerUrl;
    fn navigation_new_window(navigation: *mut SaucerNavigation) -> bool;
    fn navigation_redirection(navigation: *mut SaucerNavigation) -> bool;
    fn navigation_user_initiated(navigation: *mut SaucerNavigation) -> bool;

    // ========================================================================
    // Permission
    // ========================================================================
    fn permission_request_free(request: *mut SaucerPermissionRequest);
    fn permission_request_copy(request: *mut SaucerPermissionRequest) -> *mut SaucerPermissionRequest;
    fn permission_request_url(request: *mut SaucerPermissionRequest) -> *mut SaucerUrl;
    fn permission_request_type(request: *mut SaucerPermissionRequest) -> SaucerPermissionType;
    fn permission_request_accept(request: *mut SaucerPermissionRequest, accept: bool);

    // ========================================================================
    // Scheme
    // ========================================================================
    fn scheme_response_free(response: *mut SaucerSchemeResponse);
    fn scheme_response_new(stash: *mut SaucerStash, mime: *const c_char) -> *mut SaucerSchemeResponse;
    fn scheme_response_append_header(
        response: *mut SaucerSchemeResponse,
        name: *const c_char,
        value: *const c_char,
    );
    fn scheme_response_set_status(response: *mut SaucerSchemeResponse, status: c_int);
    fn scheme_request_free(request: *mut SaucerSchemeRequest);
    fn scheme_request_copy(request: *mut SaucerSchemeRequest) -> *mut SaucerSchemeRequest;
    fn scheme_request_url(request: *mut SaucerSchemeRequest) -> *mut SaucerUrl;
    fn scheme_request_method(request: *mut SaucerSchemeRequest, buffer: *mut c_char, size: *mut usize);
    fn scheme_request_content(request: *mut SaucerSchemeRequest) -> *mut SaucerStash;
    fn scheme_request_headers(request: *mut SaucerSchemeRequest, buffer: *mut c_char, size: *mut usize);
    fn scheme_executor_free(executor: *mut SaucerSchemeExecutor);
    fn scheme_executor_copy(executor: *mut SaucerSchemeExecutor) -> *mut SaucerSchemeExecutor;
    fn scheme_executor_reject(executor: *mut SaucerSchemeExecutor, error: SaucerSchemeError);
    fn scheme_executor_accept(executor: *mut SaucerSchemeExecutor, response: *mut SaucerSchemeResponse);

    // ========================================================================
    // Screen
    // ========================================================================
    fn screen_free(screen: *mut SaucerScreen);
    fn screen_name(screen: *mut SaucerScreen) -> *const c_char;
    fn screen_size(screen: *mut SaucerScreen, width: *mut c_int, height: *mut c_int);
    fn screen_position(screen: *mut SaucerScreen, x: *mut c_int, y: *mut c_int);

    // ========================================================================
    // Application
    // ========================================================================
    fn application_options_free(options: *mut SaucerApplicationOptions);
    fn application_options_new(id: *const c_char) -> *mut SaucerApplicationOptions;
    fn application_options_set_quit_on_last_window_closed(options: *mut SaucerApplicationOptions, quit: bool);
    fn application_free(application: *mut SaucerApplication);
    fn application_new(options: *mut SaucerApplicationOptions, error: *mut c_int) -> *mut SaucerApplication;
    fn application_thread_safe(application: *mut SaucerApplication) -> bool;
    /// Query-then-fill over an array of owned screen addresses.
    fn application_screens(
        application: *mut SaucerApplication,
        screens: *mut Option<NonNull<SaucerScreen>>,
        size: *mut usize,
    );
    fn application_post(application: *mut SaucerApplication, callback: PostCallback, userdata: *mut c_void);
    fn application_quit(application: *mut SaucerApplication);
    fn application_run(
        application: *mut SaucerApplication,
        on_run: Option<RunCallback>,
        on_finish: Option<RunCallback>,
        userdata: *mut c_void,
    ) -> c_int;
    fn application_on(
        application: *mut SaucerApplication,
        event: SaucerApplicationEvent,
        callback: *const c_void,
        clearable: bool,
        userdata: *mut c_void,
    ) -> usize;
    fn application_once(
        application: *mut SaucerApplication,
        event: SaucerApplicationEvent,
        callback: *const c_void,
        userdata: *mut c_void,
    );
    fn application_off(application: *mut SaucerApplication, event: SaucerApplicationEvent, id: usize);
    fn application_off_all(application: *mut SaucerApplication, event: SaucerApplicationEvent);
    fn version() -> *const c_char;

    // ========================================================================
    // Window
    // ========================================================================
    fn window_free(window: *mut SaucerWindow);
    fn window_new(application: *mut SaucerApplication, error: *mut c_int) -> *mut SaucerWindow;
    fn window_visible(window: *mut SaucerWindow) -> bool;
    fn window_focused(window: *mut SaucerWindow) -> bool;
    fn window_minimized(window: *mut SaucerWindow) -> bool;
    fn window_maximized(window: *mut SaucerWindow) -> bool;
    fn window_resizable(window: *mut SaucerWindow) -> bool;
    fn window_fullscreen(window: *mut SaucerWindow) -> bool;
    fn window_always_on_top(window: *mut SaucerWindow) -> bool;
    fn window_click_through(window: *mut SaucerWindow) -> bool;
    fn window_title(window: *mut SaucerWindow, buffer: *mut c_char, size: *mut usize);
    fn window_background(window: *mut SaucerWindow, r: *mut u8, g: *mut u8, b: *mut u8, a: *mut u8);
    fn window_decorations(window: *mut SaucerWindow) -> c_int;
    fn window_size(window: *mut SaucerWindow, width: *mut c_int, height: *mut c_int);
    fn window_max_size(window: *mut SaucerWindow, width: *mut c_int, height: *mut c_int);
    fn window_min_size(window: *mut SaucerWindow, width: *mut c_int, height: *mut c_int);
    fn window_position(window: *mut SaucerWindow, x: *mut c_int, y: *mut c_int);
    fn window_screen(window: *mut SaucerWindow) -> *mut SaucerScreen;
    fn window_hide(window: *mut SaucerWindow);
    fn window_show(window: *mut SaucerWindow);
    fn window_close(window: *mut SaucerWindow);
    fn window_focus(window: *mut SaucerWindow);
    fn window_start_drag(window: *mut SaucerWindow);
    fn window_start_resize(window: *mut SaucerWindow, edge: SaucerWindowEdge);
    fn window_set_minimized(window: *mut SaucerWindow, value: bool);
    fn window_set_maximized(window: *mut SaucerWindow, value: bool);
    fn window_set_resizable(window: *mut SaucerWindow, value: bool);
    fn window_set_fullscreen(window: *mut SaucerWindow, value: bool);
    fn window_set_always_on_top(window: *mut SaucerWindow, value: bool);
    fn window_set_click_through(window: *mut SaucerWindow, value: bool);
    fn window_set_icon(window: *mut SaucerWindow, icon: *mut SaucerIcon);
    fn window_set_title(window: *mut SaucerWindow, title: *const c_char);
    fn window_set_background(window: *mut SaucerWindow, r: u8, g: u8, b: u8, a: u8);
    fn window_set_decorations(window: *mut SaucerWindow, decoration: SaucerWindowDecoration);
    fn window_set_size(window: *mut SaucerWindow, width: c_int, height: c_int);
    fn window_set_max_size(window: *mut SaucerWindow, width: c_int, height: c_int);
    fn window_set_min_size(window: *mut SaucerWindow, width: c_int, height: c_int);
    fn window_set_position(window: *mut SaucerWindow, x: c_int, y: c_int);
    fn window_on(
        window: *mut SaucerWindow,
        event: SaucerWindowEvent,
        callback: *const c_void,
        clearable: bool,
        userdata: *mut c_void,
    ) -> usize;
    fn window_once(
        window: *mut SaucerWindow,
        event: SaucerWindowEvent,
        callback: *const c_void,
        userdata: *mut c_void,
    );
    fn window_off(window: *mut SaucerWindow, event: SaucerWindowEvent, id: usize);
    fn window_off_all(window: *mut SaucerWindow, event: SaucerWindowEvent);

    // ========================================================================
    // Webview
    // ========================================================================
    fn webview_options_free(options: *mut SaucerWebviewOptions);
    fn webview_options_new(window: *mut SaucerWindow) -> *mut SaucerWebviewOptions;
    fn webview_options_set_attributes(options: *mut SaucerWebviewOptions, value: bool);
    fn webview_options_set_persistent_cookies(options: *mut SaucerWebviewOptions, value: bool);
    fn webview_options_set_hardware_acceleration(options: *mut SaucerWebviewOptions, value: bool);
    fn webview_options_set_storage_path(options: *mut SaucerWebviewOptions, path: *const c_char);
    fn webview_options_set_user_agent(options: *mut SaucerWebviewOptions, user_agent: *const c_char);
    fn webview_options_append_browser_flag(options: *mut SaucerWebviewOptions, flag: *const c_char);
    fn webview_free(webview: *mut SaucerWebview);
    fn webview_new(options: *mut SaucerWebviewOptions, error: *mut c_int) -> *mut SaucerWebview;
    fn webview_url(webview: *mut SaucerWebview) -> *mut SaucerUrl;
    fn webview_favicon(webview: *mut SaucerWebview) -> *mut SaucerIcon;
    fn webview_page_title(webview: *mut SaucerWebview, buffer: *mut c_char, size: *mut usize);
    fn webview_dev_tools(webview: *mut SaucerWebview) -> bool;
    fn webview_context_menu(webview: *mut SaucerWebview) -> bool;
    fn webview_force_dark(webview: *mut SaucerWebview) -> bool;
    fn webview_background(webview: *mut SaucerWebview, r: *mut u8, g: *mut u8, b: *mut u8, a: *mut u8);
    fn webview_bounds(webview: *mut SaucerWebview, x: *mut c_int, y: *mut c_int, w: *mut c_int, h: *mut c_int);
    fn webview_set_url(webview: *mut SaucerWebview, url: *mut SaucerUrl);
    fn webview_set_url_str(webview: *mut SaucerWebview, url: *const c_char);
    fn webview_set_html(webview: *mut SaucerWebview, html: *const c_char);
    fn webview_set_dev_tools(webview: *mut SaucerWebview, value: bool);
    fn webview_set_context_menu(webview: *mut SaucerWebview, value: bool);
    fn webview_set_force_dark(webview: *mut SaucerWebview, value: bool);
    fn webview_set_background(webview: *mut SaucerWebview, r: u8, g: u8, b: u8, a: u8);
    fn webview_reset_bounds(webview: *mut SaucerWebview);
    fn webview_set_bounds(webview: *mut SaucerWebview, x: c_int, y: c_int, w: c_int, h: c_int);
    fn webview_back(webview: *mut SaucerWebview);
    fn webview_forward(webview: *mut SaucerWebview);
    fn webview_reload(webview: *mut SaucerWebview);
    fn webview_serve(webview: *mut SaucerWebview, url: *const c_char);
    fn webview_embed(
        webview: *mut SaucerWebview,
        path: *const c_char,
        content: *mut SaucerStash,
        mime: *const c_char,
    );
    fn webview_unembed_all(webview: *mut SaucerWebview);
    fn webview_unembed(webview: *mut SaucerWebview, path: *const c_char);
    fn webview_execute(webview: *mut SaucerWebview, script: *const c_char);
    fn webview_inject(
        webview: *mut SaucerWebview,
        code: *const c_char,
        run_at: SaucerScriptTime,
        no_frames: bool,
        clearable: bool,
    ) -> usize;
    fn webview_uninject_all(webview: *mut SaucerWebview);
    fn webview_uninject(webview: *mut SaucerWebview, id: usize);
    fn webview_handle_scheme(
        webview: *mut SaucerWebview,
        scheme: *const c_char,
        handler: SchemeHandlerCallback,
        userdata: *mut c_void,
    );
    fn webview_remove_scheme(webview: *mut SaucerWebview, scheme: *const c_char);
    fn webview_on(
        webview: *mut SaucerWebview,
        event: SaucerWebviewEvent,
        callback: *const c_void,
        clearable: bool,
        userdata: *mut c_void,
    ) -> usize;
    fn webview_once(
        webview: *mut SaucerWebview,
        event: SaucerWebviewEvent,
        callback: *const c_void,
        userdata: *mut c_void,
    );
    fn webview_off(webview: *mut SaucerWebview, event: SaucerWebviewEvent, id: usize);
    fn webview_off_all(webview: *mut SaucerWebview, event: SaucerWebviewEvent);
    fn webview_register_scheme(scheme: *const c_char);
}

// The table only holds function pointers into code that lives as long as
// the library that provided it.
unsafe impl Send for SaucerVtable {}
unsafe impl Sync for SaucerVtable {}

impl fmt::Debug for SaucerVtable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaucerVtable")
            .field("symbols", &Self::SYMBOLS.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_are_prefixed_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for symbol in SaucerVtable::SYMBOLS {
            assert!(symbol.starts_with("saucer_"), "{symbol}");
            assert!(seen.insert(*symbol), "duplicate symbol {symbol}");
        }
        assert!(SaucerVtable::SYMBOLS.contains(&"saucer_webview_on"));
        assert!(SaucerVtable::SYMBOLS.contains(&"saucer_version"));
    }

    #[test]
    fn test_resolve_stops_at_first_missing_symbol() {
        let mut asked = Vec::new();
        let result = unsafe {
            SaucerVtable::resolve(|symbol| {
                asked.push(symbol);
                Err::<NonNull<c_void>, _>(format!("missing {symbol}"))
            })
        };
        assert_eq!(result.unwrap_err(), "missing saucer_stash_data");
        assert_eq!(asked, vec!["saucer_stash_data"]);
    }

    #[test]
    fn test_vtable_is_one_pointer_per_symbol() {
        assert_eq!(
            std::mem::size_of::<SaucerVtable>(),
            SaucerVtable::SYMBOLS.len() * std::mem::size_of::<usize>()
        );
    }
}
