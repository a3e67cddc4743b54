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

//! The webview: browser content hosted inside a [`Window`].

use std::collections::HashMap;
use std::os::raw::{c_char, c_int};
use std::sync::{Arc, Mutex};

use saucer_abi::{
    SaucerIcon, SaucerNavigation, SaucerPermissionRequest, SaucerPolicy, SaucerSchemeExecutor,
    SaucerSchemeRequest, SaucerScriptTime, SaucerState, SaucerStatus, SaucerUrl, SaucerWebview,
    SaucerWebviewEvent,
};
use saucer_ffi_primitives::{
    decode_quad, decode_text_arg, decode_variable_text, with_text, NativeHandle,
};

use super::icon::Icon;
use super::navigation::Navigation;
use super::permission::PermissionRequest;
use super::scheme::{SchemeExecutor, SchemeRequest};
use super::stash::Stash;
use super::url::Url;
use super::window::Window;
use super::{entity_events, ManagedEntity, NativeTarget};
use crate::config::WebviewOptions;
use crate::error::Result;
use crate::library::NativeLibrary;
use crate::thunks::{event_category, lock, Thunk};

// ============================================================================
// Event categories
// ============================================================================

event_category! {
    /// A page asked for a permission. Answer through the request, then
    /// return `Handled`; return `Unhandled` to let the engine decide.
    pub WebviewPermission: dyn Fn(&PermissionRequest) -> SaucerStatus + Send + Sync,
    fn(_webview: *mut SaucerWebview, request: *mut SaucerPermissionRequest) -> SaucerStatus = SaucerStatus::Unhandled,
    |handler, library| handler(&PermissionRequest::borrowed(library.clone(), request))
}

event_category! {
    pub WebviewFullscreen: dyn Fn(bool) -> SaucerPolicy + Send + Sync,
    fn(_webview: *mut SaucerWebview, fullscreen: bool) -> SaucerPolicy = SaucerPolicy::Allow,
    |handler, _library| handler(fullscreen)
}

event_category! {
    pub WebviewDomReady: dyn Fn() + Send + Sync,
    fn(_webview: *mut SaucerWebview) -> () = (),
    |handler, _library| handler()
}

event_category! {
    pub WebviewNavigated: dyn Fn(&Url) + Send + Sync,
    fn(_webview: *mut SaucerWebview, url: *mut SaucerUrl) -> () = (),
    |handler, library| handler(&Url::borrowed(library.clone(), url))
}

event_category! {
    /// A navigation is about to start. Return `Block` to cancel it.
    pub WebviewNavigate: dyn Fn(&Navigation) -> SaucerPolicy + Send + Sync,
    fn(_webview: *mut SaucerWebview, navigation: *mut SaucerNavigation) -> SaucerPolicy = SaucerPolicy::Allow,
    |handler, library| handler(&Navigation::borrowed(library.clone(), navigation))
}

event_category! {
    /// A message posted by page script.
    pub WebviewMessage: dyn Fn(&str) -> SaucerStatus + Send + Sync,
    fn(_webview: *mut SaucerWebview, message: *const c_char, size: usize) -> SaucerStatus = SaucerStatus::Unhandled,
    |handler, _library| handler(decode_text_arg(message, size).as_str())
}

event_category! {
    pub WebviewRequest: dyn Fn(&Url) + Send + Sync,
    fn(_webview: *mut SaucerWebview, url: *mut SaucerUrl) -> () = (),
    |handler, library| handler(&Url::borrowed(library.clone(), url))
}

event_category! {
    pub WebviewFavicon: dyn Fn(&Icon) + Send + Sync,
    fn(_webview: *mut SaucerWebview, icon: *mut SaucerIcon) -> () = (),
    |handler, library| handler(&Icon::borrowed(library.clone(), icon))
}

event_category! {
    pub WebviewTitle: dyn Fn(&str) + Send + Sync,
    fn(_webview: *mut SaucerWebview, title: *const c_char, size: usize) -> () = (),
    |handler, _library| handler(decode_text_arg(title, size).as_str())
}

event_category! {
    pub WebviewLoad: dyn Fn(SaucerState) + Send + Sync,
    fn(_webview: *mut SaucerWebview, state: c_int) -> () = (),
    |handler, _library| match SaucerState::try_from(state) {
        Ok(state) => handler(state),
        Err(value) => log::warn!("Ignoring load event with unknown state {value}"),
    }
}

event_category! {
    /// Serves one request for a custom scheme.
    pub SchemeHandler: dyn Fn(&SchemeRequest, &SchemeExecutor) + Send + Sync,
    fn(request: *mut SaucerSchemeRequest, executor: *mut SaucerSchemeExecutor) -> () = (),
    |handler, library| handler(
        &SchemeRequest::borrowed(library.clone(), request),
        &SchemeExecutor::borrowed(library.clone(), executor),
    )
}

entity_events! {
    /// Webview events, each carrying its typed handler.
    pub enum WebviewEvent in WebviewEvents for SaucerWebviewEvent {
        Permission(WebviewPermission) => permission,
        Fullscreen(WebviewFullscreen) => fullscreen,
        DomReady(WebviewDomReady) => dom_ready,
        Navigated(WebviewNavigated) => navigated,
        Navigate(WebviewNavigate) => navigate,
        Message(WebviewMessage) => message,
        Request(WebviewRequest) => request,
        Favicon(WebviewFavicon) => favicon,
        Title(WebviewTitle) => title,
        Load(WebviewLoad) => load,
    }
}

// ============================================================================
// Webview
// ============================================================================

pub struct Webview {
    handle: NativeHandle<SaucerWebview>,
    library: Arc<NativeLibrary>,
    events: WebviewEvents,
    schemes: Mutex<HashMap<String, Thunk<SchemeHandler>>>,
}

impl Webview {
    pub fn new(window: &Window, options: &WebviewOptions) -> Result<Self> {
        let library = window.library().clone();
        let vtable = library.vtable();

        let raw_options = unsafe { (vtable.webview_options_new)(window.as_ptr()) };
        let native_options = NativeHandle::acquire("WebviewOptions", raw_options, vtable.webview_options_free)?;
        let opts = native_options.address();

        unsafe {
            (vtable.webview_options_set_attributes)(opts, options.attributes);
            (vtable.webview_options_set_persistent_cookies)(opts, options.persistent_cookies);
            (vtable.webview_options_set_hardware_acceleration)(opts, options.hardware_acceleration);
        }
        if let Some(path) = &options.storage_path {
            with_text(&path.to_string_lossy(), |path| unsafe {
                (vtable.webview_options_set_storage_path)(opts, path)
            })?;
        }
        if let Some(user_agent) = &options.user_agent {
            with_text(user_agent, |agent| unsafe { (vtable.webview_options_set_user_agent)(opts, agent) })?;
        }
        for flag in &options.browser_flags {
            with_text(flag, |flag| unsafe { (vtable.webview_options_append_browser_flag)(opts, flag) })?;
        }

        let mut error: c_int = 0;
        let raw = unsafe { (vtable.webview_new)(opts, &mut error) };
        drop(native_options);

        let handle = NativeHandle::acquire_checked(Self::ENTITY, raw, error, vtable.webview_free)?;
        log::debug!("Created webview with {} browser flag(s)", options.browser_flags.len());

        Ok(Self {
            handle,
            events: WebviewEvents::new(&library),
            schemes: Mutex::new(HashMap::new()),
            library,
        })
    }

    pub fn library(&self) -> &Arc<NativeLibrary> {
        &self.library
    }

    fn target(&self) -> NativeTarget<'_, SaucerWebview> {
        NativeTarget::new(self.handle.address(), &self.library)
    }

    // ── Content ──────────────────────────────────────────────────────────────

    /// The current URL (owned).
    pub fn url(&self) -> Result<Url> {
        let raw = unsafe { (self.library.vtable().webview_url)(self.handle.address()) };
        Url::from_owned(self.library.clone(), raw)
    }

    /// The current page's favicon (owned). May be empty.
    pub fn favicon(&self) -> Result<Icon> {
        let raw = unsafe { (self.library.vtable().webview_favicon)(self.handle.address()) };
        Icon::from_owned(self.library.clone(), raw)
    }

    pub fn page_title(&self) -> Result<String> {
        Ok(unsafe { decode_variable_text(self.handle.address(), self.library.vtable().webview_page_title) }?)
    }

    pub fn set_url(&self, url: &Url) {
        unsafe { (self.library.vtable().webview_set_url)(self.handle.address(), url.as_ptr()) }
    }

    /// Navigate to `url` without building a [`Url`] first.
    pub fn set_url_str(&self, url: &str) -> Result<()> {
        let raw = self.handle.address();
        with_text(url, |url| unsafe { (self.library.vtable().webview_set_url_str)(raw, url) })?;
        Ok(())
    }

    pub fn set_html(&self, html: &str) -> Result<()> {
        let raw = self.handle.address();
        with_text(html, |html| unsafe { (self.library.vtable().webview_set_html)(raw, html) })?;
        Ok(())
    }

    pub fn back(&self) {
        unsafe { (self.library.vtable().webview_back)(self.handle.address()) }
    }

    pub fn forward(&self) {
        unsafe { (self.library.vtable().webview_forward)(self.handle.address()) }
    }

    pub fn reload(&self) {
        unsafe { (self.library.vtable().webview_reload)(self.handle.address()) }
    }

    // ── Appearance ───────────────────────────────────────────────────────────

    pub fn dev_tools(&self) -> bool {
        unsafe { (self.library.vtable().webview_dev_tools)(self.handle.address()) }
    }

    pub fn set_dev_tools(&self, enabled: bool) {
        unsafe { (self.library.vtable().webview_set_dev_tools)(self.handle.address(), enabled) }
    }

    pub fn context_menu(&self) -> bool {
        unsafe { (self.library.vtable().webview_context_menu)(self.handle.address()) }
    }

    pub fn set_context_menu(&self, enabled: bool) {
        unsafe { (self.library.vtable().webview_set_context_menu)(self.handle.address(), enabled) }
    }

    pub fn force_dark(&self) -> bool {
        unsafe { (self.library.vtable().webview_force_dark)(self.handle.address()) }
    }

    pub fn set_force_dark(&self, enabled: bool) {
        unsafe { (self.library.vtable().webview_set_force_dark)(self.handle.address(), enabled) }
    }

    /// `[r, g, b, a]`.
    pub fn background(&self) -> [u8; 4] {
        unsafe { decode_quad(self.handle.address(), self.library.vtable().webview_background) }
    }

    pub fn set_background(&self, [r, g, b, a]: [u8; 4]) {
        unsafe { (self.library.vtable().webview_set_background)(self.handle.address(), r, g, b, a) }
    }

    /// `[x, y, width, height]` within the window.
    pub fn bounds(&self) -> [i32; 4] {
        unsafe { decode_quad(self.handle.address(), self.library.vtable().webview_bounds) }
    }

    pub fn set_bounds(&self, [x, y, width, height]: [i32; 4]) {
        unsafe { (self.library.vtable().webview_set_bounds)(self.handle.address(), x, y, width, height) }
    }

    /// Go back to filling the whole window.
    pub fn reset_bounds(&self) {
        unsafe { (self.library.vtable().webview_reset_bounds)(self.handle.address()) }
    }

    // ── Embedded content and scripts ─────────────────────────────────────────

    /// Serve a previously embedded file as the current page.
    pub fn serve(&self, path: &str) -> Result<()> {
        let raw = self.handle.address();
        with_text(path, |path| unsafe { (self.library.vtable().webview_serve)(raw, path) })?;
        Ok(())
    }

    /// Make `content` available under `path`. The stash is copied natively.
    pub fn embed(&self, path: &str, content: &Stash, mime: &str) -> Result<()> {
        let raw = self.handle.address();
        let vtable = self.library.vtable();
        with_text(path, |path| {
            with_text(mime, |mime| unsafe { (vtable.webview_embed)(raw, path, content.as_ptr(), mime) })
        })??;
        Ok(())
    }

    pub fn unembed(&self, path: &str) -> Result<()> {
        let raw = self.handle.address();
        with_text(path, |path| unsafe { (self.library.vtable().webview_unembed)(raw, path) })?;
        Ok(())
    }

    pub fn unembed_all(&self) {
        unsafe { (self.library.vtable().webview_unembed_all)(self.handle.address()) }
    }

    pub fn execute(&self, script: &str) -> Result<()> {
        let raw = self.handle.address();
        with_text(script, |script| unsafe { (self.library.vtable().webview_execute)(raw, script) })?;
        Ok(())
    }

    /// Inject `code` into every page at `run_at` and return its id.
    ///
    /// The script is clearable, so [`Webview::uninject_all`] removes it.
    pub fn inject(&self, code: &str, run_at: SaucerScriptTime, no_frames: bool) -> Result<usize> {
        self.inject_with(code, run_at, no_frames, true)
    }

    /// Like [`inject`](Self::inject), choosing whether
    /// [`uninject_all`](Self::uninject_all) may remove the script. A script
    /// that is not clearable only goes away through
    /// [`uninject`](Self::uninject).
    pub fn inject_with(
        &self,
        code: &str,
        run_at: SaucerScriptTime,
        no_frames: bool,
        clearable: bool,
    ) -> Result<usize> {
        let raw = self.handle.address();
        let id = with_text(code, |code| unsafe {
            (self.library.vtable().webview_inject)(raw, code, run_at, no_frames, clearable)
        })?;
        Ok(id)
    }

    pub fn uninject(&self, id: usize) {
        unsafe { (self.library.vtable().webview_uninject)(self.handle.address(), id) }
    }

    pub fn uninject_all(&self) {
        unsafe { (self.library.vtable().webview_uninject_all)(self.handle.address()) }
    }

    // ── Custom schemes ───────────────────────────────────────────────────────

    /// Serve requests for `scheme` with `handler`, replacing any previous
    /// handler for the same scheme.
    ///
    /// The scheme must have been registered with
    /// [`NativeLibrary::register_scheme`] before the first window was
    /// created, or the engine will never route requests to it.
    pub fn handle_scheme(
        &self,
        scheme: &str,
        handler: impl Fn(&SchemeRequest, &SchemeExecutor) + Send + Sync + 'static,
    ) -> Result<()> {
        let raw = self.handle.address();
        if !self.library.schemes().contains(scheme) {
            log::warn!("Handling scheme '{scheme}' which was never registered");
        }

        let handler: Arc<dyn Fn(&SchemeRequest, &SchemeExecutor) + Send + Sync> = Arc::new(handler);
        let thunk = Thunk::<SchemeHandler>::new(handler, self.library.clone());
        let userdata = thunk.raw().userdata;
        with_text(scheme, |name| unsafe {
            (self.library.vtable().webview_handle_scheme)(raw, name, SchemeHandler::native, userdata)
        })?;

        let previous = lock(&self.schemes).insert(scheme.to_string(), thunk);
        if previous.is_some() {
            log::debug!("Replaced handler for scheme '{scheme}'");
        }
        Ok(())
    }

    /// Stop serving `scheme`. Returns whether a handler was installed.
    pub fn remove_scheme(&self, scheme: &str) -> Result<bool> {
        let raw = self.handle.address();
        with_text(scheme, |name| unsafe { (self.library.vtable().webview_remove_scheme)(raw, name) })?;
        let previous = lock(&self.schemes).remove(scheme);
        Ok(previous.is_some())
    }

    /// Schemes with a handler installed on this webview.
    pub fn handled_schemes(&self) -> Vec<String> {
        self.handle.assert_alive();
        let mut schemes: Vec<String> = lock(&self.schemes).keys().cloned().collect();
        schemes.sort();
        schemes
    }

    // ── Events ───────────────────────────────────────────────────────────────

    pub fn on(&self, event: WebviewEvent) {
        self.events.add(&self.target(), event);
    }

    pub fn once(&self, event: WebviewEvent) {
        self.events.add_once(&self.target(), event);
    }

    pub fn off(&self, event: &WebviewEvent) -> bool {
        self.events.remove(&self.target(), event)
    }

    pub fn off_all(&self, kind: SaucerWebviewEvent) {
        self.events.remove_all(&self.target(), kind);
    }

    pub fn listener_count(&self, kind: SaucerWebviewEvent) -> usize {
        self.handle.assert_alive();
        self.events.len(kind)
    }

    pub fn pending_once(&self, kind: SaucerWebviewEvent) -> usize {
        self.handle.assert_alive();
        self.events.pending_once(kind)
    }
}

impl ManagedEntity for Webview {
    const ENTITY: &'static str = "Webview";

    fn dispose(&self) {
        let Ok(raw) = self.handle.try_address() else {
            return;
        };
        self.events.release(&NativeTarget::new(raw, &self.library));

        let schemes: Vec<String> = lock(&self.schemes).keys().cloned().collect();
        for scheme in &schemes {
            let removed = with_text(scheme, |name| unsafe {
                (self.library.vtable().webview_remove_scheme)(raw, name)
            });
            if let Err(err) = removed {
                log::warn!("Could not remove scheme '{scheme}' on dispose: {err}");
            }
        }
        // Dropped outside the lock.
        let thunks = std::mem::take(&mut *lock(&self.schemes));
        drop(thunks);

        self.handle.release();
        log::debug!("Disposed webview");
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}

impl Drop for Webview {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Webview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schemes: Vec<String> = lock(&self.schemes).keys().cloned().collect();
        f.debug_struct("Webview")
            .field("handle", &self.handle)
            .field("schemes", &schemes)
            .finish_non_exhaustive()
    }
}
