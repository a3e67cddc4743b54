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

//! `extern "C"` implementations of every vtable entry.

use std::ffi::{c_char, c_void};
use std::os::raw::c_int;
use std::ptr::NonNull;
use std::sync::Arc;

use saucer_abi::*;
use saucer_ffi_primitives::decode_borrowed_str;

use crate::objects::*;
use crate::tracking::{self, lock};
use crate::{INVALID_ARGUMENT, VERSION_C};

// ============================================================================
// Helpers
// ============================================================================

unsafe fn text(ptr: *const c_char) -> String {
    decode_borrowed_str(ptr)
}

unsafe fn set_error(error: *mut c_int, code: c_int) {
    if !error.is_null() {
        *error = code;
    }
}

/// The fill half of the query-then-fill protocol.
unsafe fn write_items<T: Copy>(items: &[T], buffer: *mut T, size: *mut usize) {
    if size.is_null() {
        return;
    }
    if buffer.is_null() {
        *size = items.len();
        return;
    }
    let count = (*size).min(items.len());
    std::ptr::copy_nonoverlapping(items.as_ptr(), buffer, count);
    *size = count;
}

unsafe fn write_text(value: &str, buffer: *mut c_char, size: *mut usize) {
    write_items(value.as_bytes(), buffer.cast::<u8>(), size);
}

unsafe fn write_pair<T: Copy>((first, second): (T, T), a: *mut T, b: *mut T) {
    *a = first;
    *b = second;
}

unsafe fn write_quad<T: Copy>([w, x, y, z]: [T; 4], a: *mut T, b: *mut T, c: *mut T, d: *mut T) {
    *a = w;
    *b = x;
    *c = y;
    *d = z;
}

/// Apply any injected failure, then hand out the shared object.
unsafe fn construct<T: Freeable, O>(object: Arc<T>, error: *mut c_int, remember: fn(Arc<T>)) -> *mut O {
    let raw = shared_into_raw::<T, O>(&object);
    remember(object);
    if let Some(failure) = tracking::take_failure() {
        set_error(error, failure.code);
        if !failure.with_object {
            free_shared::<T, O>(raw);
            return std::ptr::null_mut();
        }
    }
    raw
}

unsafe fn stash<'a>(raw: *mut SaucerStash) -> &'a MockStash {
    get::<MockStash, _>(raw)
}

unsafe fn url<'a>(raw: *mut SaucerUrl) -> &'a MockUrl {
    get::<MockUrl, _>(raw)
}

unsafe fn icon<'a>(raw: *mut SaucerIcon) -> &'a MockIcon {
    get::<MockIcon, _>(raw)
}

unsafe fn application<'a>(raw: *mut SaucerApplication) -> &'a MockApplication {
    get::<MockApplication, _>(raw)
}

unsafe fn window<'a>(raw: *mut SaucerWindow) -> &'a MockWindow {
    get::<MockWindow, _>(raw)
}

unsafe fn webview<'a>(raw: *mut SaucerWebview) -> &'a MockWebview {
    get::<MockWebview, _>(raw)
}

fn new_stash(data: Vec<u8>) -> *mut SaucerStash {
    into_raw::<_, SaucerStash>(MockStash { data })
}

fn new_url(parts: UrlParts) -> *mut SaucerUrl {
    into_raw::<_, SaucerUrl>(MockUrl { parts })
}

// ============================================================================
// Stash
// ============================================================================

unsafe extern "C" fn stash_data(raw: *mut SaucerStash) -> *const u8 {
    stash(raw).data.as_ptr()
}

unsafe extern "C" fn stash_size(raw: *mut SaucerStash) -> usize {
    stash(raw).data.len()
}

unsafe extern "C" fn stash_free(raw: *mut SaucerStash) {
    free_raw::<MockStash, _>(raw);
}

unsafe extern "C" fn stash_copy(raw: *mut SaucerStash) -> *mut SaucerStash {
    new_stash(stash(raw).data.clone())
}

unsafe extern "C" fn stash_new_from(data: *const u8, size: usize) -> *mut SaucerStash {
    if data.is_null() || size == 0 {
        return new_stash(Vec::new());
    }
    new_stash(std::slice::from_raw_parts(data, size).to_vec())
}

unsafe extern "C" fn stash_new_from_str(value: *const c_char) -> *mut SaucerStash {
    new_stash(text(value).into_bytes())
}

unsafe extern "C" fn stash_new_empty() -> *mut SaucerStash {
    new_stash(Vec::new())
}

// ============================================================================
// Url
// ============================================================================

unsafe extern "C" fn url_free(raw: *mut SaucerUrl) {
    free_raw::<MockUrl, _>(raw);
}

unsafe extern "C" fn url_copy(raw: *mut SaucerUrl) -> *mut SaucerUrl {
    new_url(url(raw).parts.clone())
}

unsafe extern "C" fn url_new_parse(value: *const c_char, error: *mut c_int) -> *mut SaucerUrl {
    match UrlParts::parse(&text(value)) {
        Some(parts) => {
            set_error(error, 0);
            new_url(parts)
        }
        None => {
            set_error(error, INVALID_ARGUMENT);
            std::ptr::null_mut()
        }
    }
}

/// Like parse, but also accepts absolute file system paths.
unsafe extern "C" fn url_new_from(value: *const c_char, error: *mut c_int) -> *mut SaucerUrl {
    let value = text(value);
    if value.starts_with('/') {
        set_error(error, 0);
        return new_url(UrlParts {
            scheme: "file".to_string(),
            path: value,
            ..UrlParts::default()
        });
    }
    match UrlParts::parse(&value) {
        Some(parts) => {
            set_error(error, 0);
            new_url(parts)
        }
        None => {
            set_error(error, INVALID_ARGUMENT);
            std::ptr::null_mut()
        }
    }
}

unsafe extern "C" fn url_new_opts(
    scheme: *const c_char,
    host: *const c_char,
    port: *const usize,
    path: *const c_char,
) -> *mut SaucerUrl {
    new_url(UrlParts {
        scheme: text(scheme),
        host: text(host),
        port: if port.is_null() { None } else { Some(*port) },
        path: text(path),
        ..UrlParts::default()
    })
}

unsafe extern "C" fn url_string(raw: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize) {
    write_text(&url(raw).parts.to_string(), buffer, size);
}

unsafe extern "C" fn url_path(raw: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize) {
    write_text(&url(raw).parts.path, buffer, size);
}

unsafe extern "C" fn url_scheme(raw: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize) {
    write_text(&url(raw).parts.scheme, buffer, size);
}

unsafe extern "C" fn url_host(raw: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize) {
    write_text(&url(raw).parts.host, buffer, size);
}

unsafe extern "C" fn url_port(raw: *mut SaucerUrl, port: *mut usize) -> bool {
    match url(raw).parts.port {
        Some(value) => {
            *port = value;
            true
        }
        None => false,
    }
}

unsafe extern "C" fn url_user(raw: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize) {
    write_text(&url(raw).parts.user, buffer, size);
}

unsafe extern "C" fn url_password(raw: *mut SaucerUrl, buffer: *mut c_char, size: *mut usize) {
    write_text(&url(raw).parts.password, buffer, size);
}

// ============================================================================
// Icon
// ============================================================================

unsafe extern "C" fn icon_empty(raw: *mut SaucerIcon) -> bool {
    icon(raw).data.is_empty()
}

unsafe extern "C" fn icon_data(raw: *mut SaucerIcon) -> *mut SaucerStash {
    new_stash(icon(raw).data.clone())
}

unsafe extern "C" fn icon_save(raw: *mut SaucerIcon, path: *const c_char) {
    let path = text(path);
    if let Err(err) = std::fs::write(&path, &icon(raw).data) {
        log::warn!("Could not save icon to {path}: {err}");
    }
}

unsafe extern "C" fn icon_free(raw: *mut SaucerIcon) {
    free_raw::<MockIcon, _>(raw);
}

unsafe extern "C" fn icon_copy(raw: *mut SaucerIcon) -> *mut SaucerIcon {
    into_raw::<_, SaucerIcon>(MockIcon {
        data: icon(raw).data.clone(),
    })
}

fn new_icon(data: Vec<u8>, error: *mut c_int) -> *mut SaucerIcon {
    if data.is_empty() {
        unsafe { set_error(error, INVALID_ARGUMENT) };
        return std::ptr::null_mut();
    }
    unsafe { set_error(error, 0) };
    into_raw::<_, SaucerIcon>(MockIcon { data })
}

unsafe extern "C" fn icon_new_from_file(path: *const c_char, error: *mut c_int) -> *mut SaucerIcon {
    match std::fs::read(text(path)) {
        Ok(data) => new_icon(data, error),
        Err(err) => {
            set_error(error, err.raw_os_error().unwrap_or(INVALID_ARGUMENT));
            std::ptr::null_mut()
        }
    }
}

unsafe extern "C" fn icon_new_from_stash(raw: *mut SaucerStash, error: *mut c_int) -> *mut SaucerIcon {
    new_icon(stash(raw).data.clone(), error)
}

// ============================================================================
// Navigation
// ============================================================================

unsafe fn navigation<'a>(raw: *mut SaucerNavigation) -> &'a MockNavigation {
    get::<MockNavigation, _>(raw)
}

unsafe extern "C" fn navigation_url(raw: *mut SaucerNavigation) -> *mut SaucerUrl {
    new_url(navigation(raw).url.clone())
}

unsafe extern "C" fn navigation_new_window(raw: *mut SaucerNavigation) -> bool {
    navigation(raw).new_window
}

unsafe extern "C" fn navigation_redirection(raw: *mut SaucerNavigation) -> bool {
    navigation(raw).redirection
}

unsafe extern "C" fn navigation_user_initiated(raw: *mut SaucerNavigation) -> bool {
    navigation(raw).user_initiated
}

// ============================================================================
// Permission
// ============================================================================

unsafe fn permission<'a>(raw: *mut SaucerPermissionRequest) -> &'a MockPermissionRequest {
    get::<MockPermissionRequest, _>(raw)
}

unsafe extern "C" fn permission_request_free(raw: *mut SaucerPermissionRequest) {
    free_raw::<MockPermissionRequest, _>(raw);
}

unsafe extern "C" fn permission_request_copy(raw: *mut SaucerPermissionRequest) -> *mut SaucerPermissionRequest {
    into_raw::<_, SaucerPermissionRequest>(permission(raw).clone())
}

unsafe extern "C" fn permission_request_url(raw: *mut SaucerPermissionRequest) -> *mut SaucerUrl {
    new_url(permission(raw).url.clone())
}

unsafe extern "C" fn permission_request_type(raw: *mut SaucerPermissionRequest) -> SaucerPermissionType {
    permission(raw).kind
}

unsafe extern "C" fn permission_request_accept(raw: *mut SaucerPermissionRequest, accept: bool) {
    *lock(&permission(raw).answer) = Some(accept);
}

// ============================================================================
// Scheme
// ============================================================================

unsafe fn response<'a>(raw: *mut SaucerSchemeResponse) -> &'a mut MockSchemeResponse {
    &mut *raw.cast::<MockSchemeResponse>()
}

unsafe fn scheme_request<'a>(raw: *mut SaucerSchemeRequest) -> &'a MockSchemeRequest {
    get::<MockSchemeRequest, _>(raw)
}

unsafe fn executor<'a>(raw: *mut SaucerSchemeExecutor) -> &'a MockSchemeExecutor {
    get::<MockSchemeExecutor, _>(raw)
}

unsafe extern "C" fn scheme_response_free(raw: *mut SaucerSchemeResponse) {
    free_raw::<MockSchemeResponse, _>(raw);
}

unsafe extern "C" fn scheme_response_new(data: *mut SaucerStash, mime: *const c_char) -> *mut SaucerSchemeResponse {
    if data.is_null() {
        return std::ptr::null_mut();
    }
    into_raw::<_, SaucerSchemeResponse>(MockSchemeResponse {
        body: stash(data).data.clone(),
        mime: text(mime),
        headers: Vec::new(),
        status: 200,
    })
}

unsafe extern "C" fn scheme_response_append_header(
    raw: *mut SaucerSchemeResponse,
    name: *const c_char,
    value: *const c_char,
) {
    response(raw).headers.push((text(name), text(value)));
}

unsafe extern "C" fn scheme_response_set_status(raw: *mut SaucerSchemeResponse, status: c_int) {
    response(raw).status = status;
}

unsafe extern "C" fn scheme_request_free(raw: *mut SaucerSchemeRequest) {
    free_raw::<MockSchemeRequest, _>(raw);
}

unsafe extern "C" fn scheme_request_copy(raw: *mut SaucerSchemeRequest) -> *mut SaucerSchemeRequest {
    into_raw::<_, SaucerSchemeRequest>(scheme_request(raw).clone())
}

unsafe extern "C" fn scheme_request_url(raw: *mut SaucerSchemeRequest) -> *mut SaucerUrl {
    new_url(scheme_request(raw).url.clone())
}

unsafe extern "C" fn scheme_request_method(raw: *mut SaucerSchemeRequest, buffer: *mut c_char, size: *mut usize) {
    write_text(&scheme_request(raw).method, buffer, size);
}

unsafe extern "C" fn scheme_request_content(raw: *mut SaucerSchemeRequest) -> *mut SaucerStash {
    new_stash(scheme_request(raw).content.clone())
}

unsafe extern "C" fn scheme_request_headers(raw: *mut SaucerSchemeRequest, buffer: *mut c_char, size: *mut usize) {
    write_text(&scheme_request(raw).headers, buffer, size);
}

unsafe extern "C" fn scheme_executor_free(raw: *mut SaucerSchemeExecutor) {
    free_raw::<MockSchemeExecutor, _>(raw);
}

unsafe extern "C" fn scheme_executor_copy(raw: *mut SaucerSchemeExecutor) -> *mut SaucerSchemeExecutor {
    into_raw::<_, SaucerSchemeExecutor>(executor(raw).clone())
}

unsafe extern "C" fn scheme_executor_reject(raw: *mut SaucerSchemeExecutor, error: SaucerSchemeError) {
    executor(raw).reply.complete(SchemeOutcome::Rejected(error));
}

unsafe extern "C" fn scheme_executor_accept(raw: *mut SaucerSchemeExecutor, accepted: *mut SaucerSchemeResponse) {
    let accepted = response(accepted);
    executor(raw).reply.complete(SchemeOutcome::Accepted {
        status: accepted.status,
        mime: accepted.mime.clone(),
        headers: accepted.headers.clone(),
        body: accepted.body.clone(),
    });
}

// ============================================================================
// Screen
// ============================================================================

unsafe fn screen<'a>(raw: *mut SaucerScreen) -> &'a MockScreen {
    get::<MockScreen, _>(raw)
}

unsafe extern "C" fn screen_free(raw: *mut SaucerScreen) {
    free_raw::<MockScreen, _>(raw);
}

unsafe extern "C" fn screen_name(raw: *mut SaucerScreen) -> *const c_char {
    screen(raw).name.as_ptr()
}

unsafe extern "C" fn screen_size(raw: *mut SaucerScreen, width: *mut c_int, height: *mut c_int) {
    write_pair(screen(raw).size, width, height);
}

unsafe extern "C" fn screen_position(raw: *mut SaucerScreen, x: *mut c_int, y: *mut c_int) {
    write_pair(screen(raw).position, x, y);
}

// ============================================================================
// Application
// ============================================================================

unsafe extern "C" fn application_options_free(raw: *mut SaucerApplicationOptions) {
    free_raw::<MockApplicationOptions, _>(raw);
}

unsafe extern "C" fn application_options_new(id: *const c_char) -> *mut SaucerApplicationOptions {
    into_raw::<_, SaucerApplicationOptions>(MockApplicationOptions {
        id: text(id),
        quit_on_last_window_closed: true,
    })
}

unsafe extern "C" fn application_options_set_quit_on_last_window_closed(
    raw: *mut SaucerApplicationOptions,
    quit: bool,
) {
    (*raw.cast::<MockApplicationOptions>()).quit_on_last_window_closed = quit;
}

unsafe extern "C" fn application_free(raw: *mut SaucerApplication) {
    free_shared::<MockApplication, _>(raw);
}

unsafe extern "C" fn application_new(
    options: *mut SaucerApplicationOptions,
    error: *mut c_int,
) -> *mut SaucerApplication {
    set_error(error, 0);
    if options.is_null() {
        set_error(error, INVALID_ARGUMENT);
        return std::ptr::null_mut();
    }
    let options = get::<MockApplicationOptions, _>(options);
    construct(Arc::new(MockApplication::new(options)), error, tracking::remember_application)
}

unsafe extern "C" fn application_thread_safe(_raw: *mut SaucerApplication) -> bool {
    true
}

unsafe extern "C" fn application_screens(
    raw: *mut SaucerApplication,
    buffer: *mut Option<NonNull<SaucerScreen>>,
    size: *mut usize,
) {
    let specs = application(raw).screens();
    if buffer.is_null() {
        *size = specs.len();
        return;
    }
    let count = (*size).min(specs.len());
    for (index, spec) in specs.iter().take(count).enumerate() {
        let created = into_raw::<_, SaucerScreen>(MockScreen::from(spec));
        *buffer.add(index) = NonNull::new(created);
    }
    *size = count;
}

unsafe extern "C" fn application_post(raw: *mut SaucerApplication, callback: PostCallback, userdata: *mut c_void) {
    application(raw).post(callback, userdata);
}

unsafe extern "C" fn application_quit(raw: *mut SaucerApplication) {
    application(raw).emit_quit();
}

unsafe extern "C" fn application_run(
    raw: *mut SaucerApplication,
    on_run: Option<RunCallback>,
    on_finish: Option<RunCallback>,
    userdata: *mut c_void,
) -> c_int {
    application(raw).run(on_run, on_finish, userdata)
}

unsafe extern "C" fn application_on(
    raw: *mut SaucerApplication,
    event: SaucerApplicationEvent,
    callback: *const c_void,
    clearable: bool,
    userdata: *mut c_void,
) -> usize {
    application(raw).listeners.on(event.into(), callback, clearable, userdata)
}

unsafe extern "C" fn application_once(
    raw: *mut SaucerApplication,
    event: SaucerApplicationEvent,
    callback: *const c_void,
    userdata: *mut c_void,
) {
    application(raw).listeners.once(event.into(), callback, userdata);
}

unsafe extern "C" fn application_off(raw: *mut SaucerApplication, event: SaucerApplicationEvent, id: usize) {
    application(raw).listeners.off(event.into(), id);
}

unsafe extern "C" fn application_off_all(raw: *mut SaucerApplication, event: SaucerApplicationEvent) {
    application(raw).listeners.off_all(event.into());
}

unsafe extern "C" fn version() -> *const c_char {
    VERSION_C.as_ptr().cast()
}

// ============================================================================
// Window
// ============================================================================

unsafe extern "C" fn window_free(raw: *mut SaucerWindow) {
    free_shared::<MockWindow, _>(raw);
}

unsafe extern "C" fn window_new(app: *mut SaucerApplication, error: *mut c_int) -> *mut SaucerWindow {
    set_error(error, 0);
    if app.is_null() || application(app).is_freed() {
        set_error(error, INVALID_ARGUMENT);
        return std::ptr::null_mut();
    }
    construct(Arc::new(MockWindow::new()), error, tracking::remember_window)
}

macro_rules! window_state_flags {
    ($( $get:ident / $set:ident => $field:ident; )*) => {
        $(
            unsafe extern "C" fn $get(raw: *mut SaucerWindow) -> bool {
                lock(&window(raw).state).$field
            }

            unsafe extern "C" fn $set(raw: *mut SaucerWindow, value: bool) {
                lock(&window(raw).state).$field = value;
            }
        )*
    };
}

window_state_flags! {
    window_resizable / window_set_resizable => resizable;
    window_fullscreen / window_set_fullscreen => fullscreen;
    window_always_on_top / window_set_always_on_top => always_on_top;
    window_click_through / window_set_click_through => click_through;
}

unsafe extern "C" fn window_visible(raw: *mut SaucerWindow) -> bool {
    lock(&window(raw).state).visible
}

unsafe extern "C" fn window_focused(raw: *mut SaucerWindow) -> bool {
    lock(&window(raw).state).focused
}

unsafe extern "C" fn window_minimized(raw: *mut SaucerWindow) -> bool {
    lock(&window(raw).state).minimized
}

unsafe extern "C" fn window_maximized(raw: *mut SaucerWindow) -> bool {
    lock(&window(raw).state).maximized
}

unsafe extern "C" fn window_title(raw: *mut SaucerWindow, buffer: *mut c_char, size: *mut usize) {
    let title = lock(&window(raw).state).title.clone();
    write_text(&title, buffer, size);
}

unsafe extern "C" fn window_background(raw: *mut SaucerWindow, r: *mut u8, g: *mut u8, b: *mut u8, a: *mut u8) {
    write_quad(lock(&window(raw).state).background, r, g, b, a);
}

unsafe extern "C" fn window_decorations(raw: *mut SaucerWindow) -> c_int {
    lock(&window(raw).state).decoration
}

unsafe extern "C" fn window_size(raw: *mut SaucerWindow, width: *mut c_int, height: *mut c_int) {
    write_pair(lock(&window(raw).state).size, width, height);
}

unsafe extern "C" fn window_max_size(raw: *mut SaucerWindow, width: *mut c_int, height: *mut c_int) {
    write_pair(lock(&window(raw).state).max_size, width, height);
}

unsafe extern "C" fn window_min_size(raw: *mut SaucerWindow, width: *mut c_int, height: *mut c_int) {
    write_pair(lock(&window(raw).state).min_size, width, height);
}

unsafe extern "C" fn window_position(raw: *mut SaucerWindow, x: *mut c_int, y: *mut c_int) {
    write_pair(lock(&window(raw).state).position, x, y);
}

unsafe extern "C" fn window_screen(_raw: *mut SaucerWindow) -> *mut SaucerScreen {
    let spec = tracking::latest_application()
        .and_then(|application| application.screens().into_iter().next())
        .unwrap_or(ScreenSpec {
            name: "Mock Display".to_string(),
            size: (1920, 1080),
            position: (0, 0),
        });
    into_raw::<_, SaucerScreen>(MockScreen::from(&spec))
}

unsafe extern "C" fn window_hide(raw: *mut SaucerWindow) {
    lock(&window(raw).state).visible = false;
}

unsafe extern "C" fn window_show(raw: *mut SaucerWindow) {
    lock(&window(raw).state).visible = true;
}

unsafe extern "C" fn window_close(raw: *mut SaucerWindow) {
    window(raw).request_close();
}

unsafe extern "C" fn window_focus(raw: *mut SaucerWindow) {
    let window = window(raw);
    lock(&window.state).focused = true;
    window.emit_focus(true);
}

unsafe extern "C" fn window_start_drag(raw: *mut SaucerWindow) {
    lock(&window(raw).state).drags += 1;
}

unsafe extern "C" fn window_start_resize(raw: *mut SaucerWindow, edge: SaucerWindowEdge) {
    lock(&window(raw).state).resize_edge = Some(edge);
}

unsafe extern "C" fn window_set_minimized(raw: *mut SaucerWindow, value: bool) {
    let window = window(raw);
    lock(&window.state).minimized = value;
    window.emit_minimize(value);
}

unsafe extern "C" fn window_set_maximized(raw: *mut SaucerWindow, value: bool) {
    let window = window(raw);
    lock(&window.state).maximized = value;
    window.emit_maximize(value);
}

unsafe extern "C" fn window_set_icon(raw: *mut SaucerWindow, value: *mut SaucerIcon) {
    lock(&window(raw).state).icon = Some(icon(value).data.clone());
}

unsafe extern "C" fn window_set_title(raw: *mut SaucerWindow, title: *const c_char) {
    lock(&window(raw).state).title = text(title);
}

unsafe extern "C" fn window_set_background(raw: *mut SaucerWindow, r: u8, g: u8, b: u8, a: u8) {
    lock(&window(raw).state).background = [r, g, b, a];
}

unsafe extern "C" fn window_set_decorations(raw: *mut SaucerWindow, decoration: SaucerWindowDecoration) {
    let window = window(raw);
    let value = c_int::from(decoration);
    lock(&window.state).decoration = value;
    window.emit_decorated(value);
}

unsafe extern "C" fn window_set_size(raw: *mut SaucerWindow, width: c_int, height: c_int) {
    let window = window(raw);
    lock(&window.state).size = (width, height);
    window.emit_resize(width, height);
}

unsafe extern "C" fn window_set_max_size(raw: *mut SaucerWindow, width: c_int, height: c_int) {
    lock(&window(raw).state).max_size = (width, height);
}

unsafe extern "C" fn window_set_min_size(raw: *mut SaucerWindow, width: c_int, height: c_int) {
    lock(&window(raw).state).min_size = (width, height);
}

unsafe extern "C" fn window_set_position(raw: *mut SaucerWindow, x: c_int, y: c_int) {
    lock(&window(raw).state).position = (x, y);
}

unsafe extern "C" fn window_on(
    raw: *mut SaucerWindow,
    event: SaucerWindowEvent,
    callback: *const c_void,
    clearable: bool,
    userdata: *mut c_void,
) -> usize {
    window(raw).listeners.on(event.into(), callback, clearable, userdata)
}

unsafe extern "C" fn window_once(
    raw: *mut SaucerWindow,
    event: SaucerWindowEvent,
    callback: *const c_void,
    userdata: *mut c_void,
) {
    window(raw).listeners.once(event.into(), callback, userdata);
}

unsafe extern "C" fn window_off(raw: *mut SaucerWindow, event: SaucerWindowEvent, id: usize) {
    window(raw).listeners.off(event.into(), id);
}

unsafe extern "C" fn window_off_all(raw: *mut SaucerWindow, event: SaucerWindowEvent) {
    window(raw).listeners.off_all(event.into());
}

// ============================================================================
// Webview
// ============================================================================

unsafe fn webview_options<'a>(raw: *mut SaucerWebviewOptions) -> &'a mut MockWebviewOptions {
    &mut *raw.cast::<MockWebviewOptions>()
}

unsafe extern "C" fn webview_options_free(raw: *mut SaucerWebviewOptions) {
    free_raw::<MockWebviewOptions, _>(raw);
}

unsafe extern "C" fn webview_options_new(window: *mut SaucerWindow) -> *mut SaucerWebviewOptions {
    into_raw::<_, SaucerWebviewOptions>(MockWebviewOptions {
        window,
        config: WebviewConfig {
            attributes: true,
            persistent_cookies: true,
            hardware_acceleration: true,
            storage_path: None,
            user_agent: None,
            browser_flags: Vec::new(),
        },
    })
}

unsafe extern "C" fn webview_options_set_attributes(raw: *mut SaucerWebviewOptions, value: bool) {
    webview_options(raw).config.attributes = value;
}

unsafe extern "C" fn webview_options_set_persistent_cookies(raw: *mut SaucerWebviewOptions, value: bool) {
    webview_options(raw).config.persistent_cookies = value;
}

unsafe extern "C" fn webview_options_set_hardware_acceleration(raw: *mut SaucerWebviewOptions, value: bool) {
    webview_options(raw).config.hardware_acceleration = value;
}

unsafe extern "C" fn webview_options_set_storage_path(raw: *mut SaucerWebviewOptions, path: *const c_char) {
    webview_options(raw).config.storage_path = Some(text(path));
}

unsafe extern "C" fn webview_options_set_user_agent(raw: *mut SaucerWebviewOptions, user_agent: *const c_char) {
    webview_options(raw).config.user_agent = Some(text(user_agent));
}

unsafe extern "C" fn webview_options_append_browser_flag(raw: *mut SaucerWebviewOptions, flag: *const c_char) {
    webview_options(raw).config.browser_flags.push(text(flag));
}

unsafe extern "C" fn webview_free(raw: *mut SaucerWebview) {
    free_shared::<MockWebview, _>(raw);
}

unsafe extern "C" fn webview_new(options: *mut SaucerWebviewOptions, error: *mut c_int) -> *mut SaucerWebview {
    set_error(error, 0);
    if options.is_null() {
        set_error(error, INVALID_ARGUMENT);
        return std::ptr::null_mut();
    }
    let options = webview_options(options);
    if options.window.is_null() || window(options.window).is_freed() {
        set_error(error, INVALID_ARGUMENT);
        return std::ptr::null_mut();
    }
    construct(
        Arc::new(MockWebview::new(options.config.clone())),
        error,
        tracking::remember_webview,
    )
}

unsafe extern "C" fn webview_url(raw: *mut SaucerWebview) -> *mut SaucerUrl {
    let current = lock(&webview(raw).state).url.clone();
    new_url(UrlParts::parse(&current).unwrap_or_default())
}

unsafe extern "C" fn webview_favicon(raw: *mut SaucerWebview) -> *mut SaucerIcon {
    let data = lock(&webview(raw).state).favicon.clone();
    into_raw::<_, SaucerIcon>(MockIcon { data })
}

unsafe extern "C" fn webview_page_title(raw: *mut SaucerWebview, buffer: *mut c_char, size: *mut usize) {
    let title = lock(&webview(raw).state).page_title.clone();
    write_text(&title, buffer, size);
}

unsafe extern "C" fn webview_dev_tools(raw: *mut SaucerWebview) -> bool {
    lock(&webview(raw).state).dev_tools
}

unsafe extern "C" fn webview_context_menu(raw: *mut SaucerWebview) -> bool {
    lock(&webview(raw).state).context_menu
}

unsafe extern "C" fn webview_force_dark(raw: *mut SaucerWebview) -> bool {
    lock(&webview(raw).state).force_dark
}

unsafe extern "C" fn webview_background(raw: *mut SaucerWebview, r: *mut u8, g: *mut u8, b: *mut u8, a: *mut u8) {
    write_quad(lock(&webview(raw).state).background, r, g, b, a);
}

unsafe extern "C" fn webview_bounds(raw: *mut SaucerWebview, x: *mut c_int, y: *mut c_int, w: *mut c_int, h: *mut c_int) {
    let bounds = lock(&webview(raw).state).bounds.unwrap_or([0, 0, 800, 600]);
    write_quad(bounds, x, y, w, h);
}

unsafe extern "C" fn webview_set_url(raw: *mut SaucerWebview, value: *mut SaucerUrl) {
    let target = url(value).parts.to_string();
    webview(raw).navigate(&target);
}

unsafe extern "C" fn webview_set_url_str(raw: *mut SaucerWebview, value: *const c_char) {
    webview(raw).navigate(&text(value));
}

unsafe extern "C" fn webview_set_html(raw: *mut SaucerWebview, html: *const c_char) {
    let webview = webview(raw);
    lock(&webview.state).html = Some(text(html));
    webview.load();
}

unsafe extern "C" fn webview_set_dev_tools(raw: *mut SaucerWebview, value: bool) {
    lock(&webview(raw).state).dev_tools = value;
}

unsafe extern "C" fn webview_set_context_menu(raw: *mut SaucerWebview, value: bool) {
    lock(&webview(raw).state).context_menu = value;
}

unsafe extern "C" fn webview_set_force_dark(raw: *mut SaucerWebview, value: bool) {
    lock(&webview(raw).state).force_dark = value;
}

unsafe extern "C" fn webview_set_background(raw: *mut SaucerWebview, r: u8, g: u8, b: u8, a: u8) {
    lock(&webview(raw).state).background = [r, g, b, a];
}

unsafe extern "C" fn webview_reset_bounds(raw: *mut SaucerWebview) {
    lock(&webview(raw).state).bounds = None;
}

unsafe extern "C" fn webview_set_bounds(raw: *mut SaucerWebview, x: c_int, y: c_int, w: c_int, h: c_int) {
    lock(&webview(raw).state).bounds = Some([x, y, w, h]);
}

unsafe extern "C" fn webview_back(raw: *mut SaucerWebview) {
    lock(&webview(raw).state).back += 1;
}

unsafe extern "C" fn webview_forward(raw: *mut SaucerWebview) {
    lock(&webview(raw).state).forward += 1;
}

unsafe extern "C" fn webview_reload(raw: *mut SaucerWebview) {
    let webview = webview(raw);
    lock(&webview.state).reloads += 1;
    webview.load();
}

unsafe extern "C" fn webview_serve(raw: *mut SaucerWebview, path: *const c_char) {
    let path = text(path);
    webview(raw).navigate(&format!("saucer://embedded/{}", path.trim_start_matches('/')));
}

unsafe extern "C" fn webview_embed(
    raw: *mut SaucerWebview,
    path: *const c_char,
    content: *mut SaucerStash,
    mime: *const c_char,
) {
    let entry = (stash(content).data.clone(), text(mime));
    lock(&webview(raw).state).embedded.insert(text(path), entry);
}

unsafe extern "C" fn webview_unembed_all(raw: *mut SaucerWebview) {
    lock(&webview(raw).state).embedded.clear();
}

unsafe extern "C" fn webview_unembed(raw: *mut SaucerWebview, path: *const c_char) {
    lock(&webview(raw).state).embedded.remove(&text(path));
}

unsafe extern "C" fn webview_execute(raw: *mut SaucerWebview, script: *const c_char) {
    lock(&webview(raw).state).executed.push(text(script));
}

unsafe extern "C" fn webview_inject(
    raw: *mut SaucerWebview,
    code: *const c_char,
    _run_at: SaucerScriptTime,
    _no_frames: bool,
    clearable: bool,
) -> usize {
    lock(&webview(raw).state).add_script(text(code), clearable)
}

unsafe extern "C" fn webview_uninject_all(raw: *mut SaucerWebview) {
    lock(&webview(raw).state).clear_scripts();
}

unsafe extern "C" fn webview_uninject(raw: *mut SaucerWebview, id: usize) {
    lock(&webview(raw).state).remove_script(id);
}

unsafe extern "C" fn webview_handle_scheme(
    raw: *mut SaucerWebview,
    scheme: *const c_char,
    handler: SchemeHandlerCallback,
    userdata: *mut c_void,
) {
    let entry = (handler, saucer_ffi_primitives::SendMutPtr(userdata));
    lock(&webview(raw).schemes).insert(text(scheme), entry);
}

unsafe extern "C" fn webview_remove_scheme(raw: *mut SaucerWebview, scheme: *const c_char) {
    lock(&webview(raw).schemes).remove(&text(scheme));
}

unsafe extern "C" fn webview_on(
    raw: *mut SaucerWebview,
    event: SaucerWebviewEvent,
    callback: *const c_void,
    clearable: bool,
    userdata: *mut c_void,
) -> usize {
    webview(raw).listeners.on(event.into(), callback, clearable, userdata)
}

unsafe extern "C" fn webview_once(
    raw: *mut SaucerWebview,
    event: SaucerWebviewEvent,
    callback: *const c_void,
    userdata: *mut c_void,
) {
    webview(raw).listeners.once(event.into(), callback, userdata);
}

unsafe extern "C" fn webview_off(raw: *mut SaucerWebview, event: SaucerWebviewEvent, id: usize) {
    webview(raw).listeners.off(event.into(), id);
}

unsafe extern "C" fn webview_off_all(raw: *mut SaucerWebview, event: SaucerWebviewEvent) {
    webview(raw).listeners.off_all(event.into());
}

unsafe extern "C" fn webview_register_scheme(scheme: *const c_char) {
    tracking::register_scheme(text(scheme));
}

// ============================================================================
// Table
// ============================================================================

pub(crate) fn table() -> SaucerVtable {
    SaucerVtable {
        stash_data,
        stash_size,
        stash_free,
        stash_copy,
        stash_new_from,
        stash_new_from_str,
        stash_new_empty,
        url_free,
        url_copy,
        url_new_parse,
        url_new_from,
        url_new_opts,
        url_string,
        url_path,
        url_scheme,
        url_host,
        url_port,
        url_user,
        url_password,
        icon_empty,
        icon_data,
        icon_save,
        icon_free,
        icon_copy,
        icon_new_from_file,
        icon_new_from_stash,
        navigation_url,
        navigation_new_window,
        navigation_redirection,
        navigation_user_initiated,
        permission_request_free,
        permission_request_copy,
        permission_request_url,
        permission_request_type,
        permission_request_accept,
        scheme_response_free,
        scheme_response_new,
        scheme_response_append_header,
        scheme_response_set_status,
        scheme_request_free,
        scheme_request_copy,
        scheme_request_url,
        scheme_request_method,
        scheme_request_content,
        scheme_request_headers,
        scheme_executor_free,
        scheme_executor_copy,
        scheme_executor_reject,
        scheme_executor_accept,
        screen_free,
        screen_name,
        screen_size,
        screen_position,
        application_options_free,
        application_options_new,
        application_options_set_quit_on_last_window_closed,
        application_free,
        application_new,
        application_thread_safe,
        application_screens,
        application_post,
        application_quit,
        application_run,
        application_on,
        application_once,
        application_off,
        application_off_all,
        version,
        window_free,
        window_new,
        window_visible,
        window_focused,
        window_minimized,
        window_maximized,
        window_resizable,
        window_fullscreen,
        window_always_on_top,
        window_click_through,
        window_title,
        window_background,
        window_decorations,
        window_size,
        window_max_size,
        window_min_size,
        window_position,
        window_screen,
        window_hide,
        window_show,
        window_close,
        window_focus,
        window_start_drag,
        window_start_resize,
        window_set_minimized,
        window_set_maximized,
        window_set_resizable,
        window_set_fullscreen,
        window_set_always_on_top,
        window_set_click_through,
        window_set_icon,
        window_set_title,
        window_set_background,
        window_set_decorations,
        window_set_size,
        window_set_max_size,
        window_set_min_size,
        window_set_position,
        window_on,
        window_once,
        window_off,
        window_off_all,
        webview_options_free,
        webview_options_new,
        webview_options_set_attributes,
        webview_options_set_persistent_cookies,
        webview_options_set_hardware_acceleration,
        webview_options_set_storage_path,
        webview_options_set_user_agent,
        webview_options_append_browser_flag,
        webview_free,
        webview_new,
        webview_url,
        webview_favicon,
        webview_page_title,
        webview_dev_tools,
        webview_context_menu,
        webview_force_dark,
        webview_background,
        webview_bounds,
        webview_set_url,
        webview_set_url_str,
        webview_set_html,
        webview_set_dev_tools,
        webview_set_context_menu,
        webview_set_force_dark,
        webview_set_background,
        webview_reset_bounds,
        webview_set_bounds,
        webview_back,
        webview_forward,
        webview_reload,
        webview_serve,
        webview_embed,
        webview_unembed_all,
        webview_unembed,
        webview_execute,
        webview_inject,
        webview_uninject_all,
        webview_uninject,
        webview_handle_scheme,
        webview_remove_scheme,
        webview_on,
        webview_once,
        webview_off,
        webview_off_all,
        webview_register_scheme,
    }
}
