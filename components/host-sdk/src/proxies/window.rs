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

//! Native windows.

use std::os::raw::c_int;
use std::sync::Arc;

use saucer_abi::{SaucerPolicy, SaucerWindow, SaucerWindowDecoration, SaucerWindowEdge, SaucerWindowEvent};
use saucer_ffi_primitives::{decode_pair, decode_quad, decode_variable_text, with_text, NativeHandle};

use super::application::Application;
use super::icon::Icon;
use super::screen::Screen;
use super::{entity_events, ManagedEntity, NativeTarget};
use crate::error::Result;
use crate::library::NativeLibrary;
use crate::thunks::event_category;

// ============================================================================
// Event categories
// ============================================================================

event_category! {
    pub WindowDecorated: dyn Fn(SaucerWindowDecoration) + Send + Sync,
    fn(_window: *mut SaucerWindow, decoration: c_int) -> () = (),
    |handler, _library| match SaucerWindowDecoration::try_from(decoration) {
        Ok(decoration) => handler(decoration),
        Err(value) => log::warn!("Ignoring decorated event with unknown decoration {value}"),
    }
}

event_category! {
    pub WindowMaximize: dyn Fn(bool) + Send + Sync,
    fn(_window: *mut SaucerWindow, maximized: bool) -> () = (),
    |handler, _library| handler(maximized)
}

event_category! {
    pub WindowMinimize: dyn Fn(bool) + Send + Sync,
    fn(_window: *mut SaucerWindow, minimized: bool) -> () = (),
    |handler, _library| handler(minimized)
}

event_category! {
    pub WindowClosed: dyn Fn() + Send + Sync,
    fn(_window: *mut SaucerWindow) -> () = (),
    |handler, _library| handler()
}

event_category! {
    pub WindowResize: dyn Fn(i32, i32) + Send + Sync,
    fn(_window: *mut SaucerWindow, width: c_int, height: c_int) -> () = (),
    |handler, _library| handler(width, height)
}

event_category! {
    pub WindowFocus: dyn Fn(bool) + Send + Sync,
    fn(_window: *mut SaucerWindow, focused: bool) -> () = (),
    |handler, _library| handler(focused)
}

event_category! {
    /// The user asked to close the window. Return `Block` to keep it open.
    pub WindowClose: dyn Fn() -> SaucerPolicy + Send + Sync,
    fn(_window: *mut SaucerWindow) -> SaucerPolicy = SaucerPolicy::Allow,
    |handler, _library| handler()
}

entity_events! {
    /// Window events, each carrying its typed handler.
    ///
    /// A handler's identity is its `Arc`: pass a clone of the same value to
    /// [`Window::off`] to remove it.
    pub enum WindowEvent in WindowEvents for SaucerWindowEvent {
        Decorated(WindowDecorated) => decorated,
        Maximize(WindowMaximize) => maximize,
        Minimize(WindowMinimize) => minimize,
        Closed(WindowClosed) => closed,
        Resize(WindowResize) => resize,
        Focus(WindowFocus) => focus,
        Close(WindowClose) => close,
    }
}

// ============================================================================
// Window
// ============================================================================

pub struct Window {
    handle: NativeHandle<SaucerWindow>,
    library: Arc<NativeLibrary>,
    events: WindowEvents,
}

macro_rules! window_flags {
    ($( $(#[$meta:meta])* $get:ident: $native_get:ident, $set:ident: $native_set:ident; )*) => {
        $(
            $(#[$meta])*
            pub fn $get(&self) -> bool {
                unsafe { (self.library.vtable().$native_get)(self.handle.address()) }
            }

            pub fn $set(&self, value: bool) {
                unsafe { (self.library.vtable().$native_set)(self.handle.address(), value) }
            }
        )*
    };
}

impl Window {
    /// Create a window. The first window seals custom scheme registration.
    pub fn new(application: &Application) -> Result<Self> {
        let library = application.library().clone();
        let vtable = library.vtable();

        if library.schemes().seal() {
            log::debug!("First window created; custom schemes are now fixed");
        }

        let mut error: c_int = 0;
        let raw = unsafe { (vtable.window_new)(application.as_ptr(), &mut error) };
        let handle = NativeHandle::acquire_checked(Self::ENTITY, raw, error, vtable.window_free)?;

        Ok(Self {
            handle,
            events: WindowEvents::new(&library),
            library,
        })
    }

    pub fn library(&self) -> &Arc<NativeLibrary> {
        &self.library
    }

    pub(crate) fn as_ptr(&self) -> *mut SaucerWindow {
        self.handle.address()
    }

    fn target(&self) -> NativeTarget<'_, SaucerWindow> {
        NativeTarget::new(self.handle.address(), &self.library)
    }

    // ── State ────────────────────────────────────────────────────────────────

    pub fn visible(&self) -> bool {
        unsafe { (self.library.vtable().window_visible)(self.handle.address()) }
    }

    pub fn focused(&self) -> bool {
        unsafe { (self.library.vtable().window_focused)(self.handle.address()) }
    }

    window_flags! {
        minimized: window_minimized, set_minimized: window_set_minimized;
        maximized: window_maximized, set_maximized: window_set_maximized;
        resizable: window_resizable, set_resizable: window_set_resizable;
        fullscreen: window_fullscreen, set_fullscreen: window_set_fullscreen;
        always_on_top: window_always_on_top, set_always_on_top: window_set_always_on_top;
        /// Whether mouse input passes through the window.
        click_through: window_click_through, set_click_through: window_set_click_through;
    }

    pub fn title(&self) -> Result<String> {
        Ok(unsafe { decode_variable_text(self.handle.address(), self.library.vtable().window_title) }?)
    }

    pub fn set_title(&self, title: &str) -> Result<()> {
        let raw = self.handle.address();
        with_text(title, |title| unsafe { (self.library.vtable().window_set_title)(raw, title) })?;
        Ok(())
    }

    /// `[r, g, b, a]`.
    pub fn background(&self) -> [u8; 4] {
        unsafe { decode_quad(self.handle.address(), self.library.vtable().window_background) }
    }

    pub fn set_background(&self, [r, g, b, a]: [u8; 4]) {
        unsafe { (self.library.vtable().window_set_background)(self.handle.address(), r, g, b, a) }
    }

    /// Current decoration mode. `None` if the native library reports a mode
    /// this binding does not know.
    pub fn decorations(&self) -> Option<SaucerWindowDecoration> {
        let raw = unsafe { (self.library.vtable().window_decorations)(self.handle.address()) };
        match SaucerWindowDecoration::try_from(raw) {
            Ok(decoration) => Some(decoration),
            Err(value) => {
                log::warn!("Unknown window decoration {value}");
                None
            }
        }
    }

    pub fn set_decorations(&self, decoration: SaucerWindowDecoration) {
        unsafe { (self.library.vtable().window_set_decorations)(self.handle.address(), decoration) }
    }

    /// `(width, height)`.
    pub fn size(&self) -> (i32, i32) {
        unsafe { decode_pair(self.handle.address(), self.library.vtable().window_size) }
    }

    pub fn set_size(&self, width: i32, height: i32) {
        unsafe { (self.library.vtable().window_set_size)(self.handle.address(), width, height) }
    }

    pub fn min_size(&self) -> (i32, i32) {
        unsafe { decode_pair(self.handle.address(), self.library.vtable().window_min_size) }
    }

    pub fn set_min_size(&self, width: i32, height: i32) {
        unsafe { (self.library.vtable().window_set_min_size)(self.handle.address(), width, height) }
    }

    pub fn max_size(&self) -> (i32, i32) {
        unsafe { decode_pair(self.handle.address(), self.library.vtable().window_max_size) }
    }

    pub fn set_max_size(&self, width: i32, height: i32) {
        unsafe { (self.library.vtable().window_set_max_size)(self.handle.address(), width, height) }
    }

    /// `(x, y)`.
    pub fn position(&self) -> (i32, i32) {
        unsafe { decode_pair(self.handle.address(), self.library.vtable().window_position) }
    }

    pub fn set_position(&self, x: i32, y: i32) {
        unsafe { (self.library.vtable().window_set_position)(self.handle.address(), x, y) }
    }

    /// The screen the window is currently on (owned).
    pub fn screen(&self) -> Result<Screen> {
        let raw = unsafe { (self.library.vtable().window_screen)(self.handle.address()) };
        Screen::from_owned(self.library.clone(), raw)
    }

    // ── Actions ──────────────────────────────────────────────────────────────

    pub fn show(&self) {
        unsafe { (self.library.vtable().window_show)(self.handle.address()) }
    }

    pub fn hide(&self) {
        unsafe { (self.library.vtable().window_hide)(self.handle.address()) }
    }

    pub fn close(&self) {
        unsafe { (self.library.vtable().window_close)(self.handle.address()) }
    }

    pub fn focus(&self) {
        unsafe { (self.library.vtable().window_focus)(self.handle.address()) }
    }

    pub fn start_drag(&self) {
        unsafe { (self.library.vtable().window_start_drag)(self.handle.address()) }
    }

    pub fn start_resize(&self, edge: SaucerWindowEdge) {
        unsafe { (self.library.vtable().window_start_resize)(self.handle.address(), edge) }
    }

    /// The icon is copied by the native side; `icon` stays usable.
    pub fn set_icon(&self, icon: &Icon) {
        unsafe { (self.library.vtable().window_set_icon)(self.handle.address(), icon.as_ptr()) }
    }

    // ── Events ───────────────────────────────────────────────────────────────

    pub fn on(&self, event: WindowEvent) {
        self.events.add(&self.target(), event);
    }

    pub fn once(&self, event: WindowEvent) {
        self.events.add_once(&self.target(), event);
    }

    pub fn off(&self, event: &WindowEvent) -> bool {
        self.events.remove(&self.target(), event)
    }

    pub fn off_all(&self, kind: SaucerWindowEvent) {
        self.events.remove_all(&self.target(), kind);
    }

    pub fn listener_count(&self, kind: SaucerWindowEvent) -> usize {
        self.handle.assert_alive();
        self.events.len(kind)
    }

    pub fn pending_once(&self, kind: SaucerWindowEvent) -> usize {
        self.handle.assert_alive();
        self.events.pending_once(kind)
    }
}

impl ManagedEntity for Window {
    const ENTITY: &'static str = "Window";

    fn dispose(&self) {
        let Ok(raw) = self.handle.try_address() else {
            return;
        };
        self.events.release(&NativeTarget::new(raw, &self.library));
        self.handle.release();
        log::debug!("Disposed window");
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window").field("handle", &self.handle).finish_non_exhaustive()
    }
}
