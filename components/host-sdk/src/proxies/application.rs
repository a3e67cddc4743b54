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

//! The application: event loop owner and factory for windows.

use std::ffi::c_void;
use std::os::raw::c_int;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex};

use saucer_abi::{SaucerApplication, SaucerApplicationEvent, SaucerPolicy};
use saucer_ffi_primitives::{catch_panic_ffi, decode_variable, with_text, NativeHandle};

use super::screen::Screen;
use super::{entity_events, ManagedEntity, NativeTarget};
use crate::config::ApplicationOptions;
use crate::error::Result;
use crate::library::NativeLibrary;
use crate::subscriptions::Subscriptions;
use crate::thunks::{event_category, lock};

event_category! {
    /// The application was asked to quit. Return `Block` to keep running.
    pub ApplicationQuit: dyn Fn() -> SaucerPolicy + Send + Sync,
    fn(_application: *mut SaucerApplication) -> SaucerPolicy = SaucerPolicy::Allow,
    |handler, _library| handler()
}

pub(crate) type PostedTask = Mutex<Option<Box<dyn FnOnce() + Send>>>;

event_category! {
    /// A task posted to the main thread.
    pub(crate) ApplicationPost: PostedTask,
    fn() -> () = (),
    |slot, _library| {
        let task = lock(slot).take();
        if let Some(task) = task {
            task();
        }
    }
}

entity_events! {
    /// Application events, each carrying its typed handler.
    pub enum ApplicationEvent in ApplicationEvents for SaucerApplicationEvent {
        Quit(ApplicationQuit) => quit,
    }
}

pub struct Application {
    handle: NativeHandle<SaucerApplication>,
    library: Arc<NativeLibrary>,
    events: ApplicationEvents,
    posts: Subscriptions<ApplicationPost>,
}

impl Application {
    pub fn new(library: &Arc<NativeLibrary>, options: &ApplicationOptions) -> Result<Self> {
        let vtable = library.vtable();

        let raw_options = with_text(&options.id, |id| unsafe { (vtable.application_options_new)(id) })?;
        let native_options =
            NativeHandle::acquire("ApplicationOptions", raw_options, vtable.application_options_free)?;
        unsafe {
            (vtable.application_options_set_quit_on_last_window_closed)(
                native_options.address(),
                options.quit_on_last_window_closed,
            );
        }

        let mut error: c_int = 0;
        let raw = unsafe { (vtable.application_new)(native_options.address(), &mut error) };
        drop(native_options);

        let handle = NativeHandle::acquire_checked(Self::ENTITY, raw, error, vtable.application_free)?;
        log::debug!("Created application '{}'", options.id);

        Ok(Self {
            handle,
            library: library.clone(),
            events: ApplicationEvents::new(library),
            posts: Subscriptions::new(library.clone()),
        })
    }

    pub fn library(&self) -> &Arc<NativeLibrary> {
        &self.library
    }

    pub(crate) fn as_ptr(&self) -> *mut SaucerApplication {
        self.handle.address()
    }

    fn target(&self) -> NativeTarget<'_, SaucerApplication> {
        NativeTarget::new(self.handle.address(), &self.library)
    }

    /// Whether the calling thread may use native objects directly.
    pub fn thread_safe(&self) -> bool {
        unsafe { (self.library.vtable().application_thread_safe)(self.handle.address()) }
    }

    /// Every connected display.
    pub fn screens(&self) -> Result<Vec<Screen>> {
        let entries: Vec<Option<NonNull<_>>> = unsafe {
            decode_variable(self.handle.address(), self.library.vtable().application_screens)
        }?;
        entries
            .into_iter()
            .flatten()
            .map(|screen| Screen::from_owned(self.library.clone(), screen.as_ptr()))
            .collect()
    }

    /// Run `task` on the main thread. May be called from any thread.
    ///
    /// The task stays pinned until it has run or the application is disposed.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) {
        let raw = self.handle.address();
        let vtable = self.library.vtable();
        let task: Box<dyn FnOnce() + Send> = Box::new(task);
        let slot: Arc<PostedTask> = Arc::new(Mutex::new(Some(task)));
        self.posts.add_once(slot, |thunk| unsafe {
            (vtable.application_post)(raw, ApplicationPost::native, thunk.userdata)
        });
    }

    /// Tasks posted but not run yet.
    pub fn pending_posts(&self) -> usize {
        self.handle.assert_alive();
        self.posts.pending_once()
    }

    pub fn quit(&self) {
        unsafe { (self.library.vtable().application_quit)(self.handle.address()) }
    }

    /// Run the event loop until it quits and return its exit code.
    ///
    /// `on_run` is called once the loop is up, `on_finish` once it has
    /// stopped. Both live on this stack frame for the whole call.
    pub fn run(
        &self,
        mut on_run: impl FnMut(&Application),
        mut on_finish: impl FnMut(&Application),
    ) -> i32 {
        let raw = self.handle.address();
        let mut hooks = RunHooks {
            application: self,
            on_run: &mut on_run,
            on_finish: &mut on_finish,
        };
        let userdata = &mut hooks as *mut RunHooks<'_> as *mut c_void;

        log::debug!("Entering application event loop");
        let code = unsafe {
            (self.library.vtable().application_run)(raw, Some(run_hook), Some(finish_hook), userdata)
        };
        log::debug!("Application event loop exited with {code}");
        code
    }

    pub fn on(&self, event: ApplicationEvent) {
        self.events.add(&self.target(), event);
    }

    pub fn once(&self, event: ApplicationEvent) {
        self.events.add_once(&self.target(), event);
    }

    pub fn off(&self, event: &ApplicationEvent) -> bool {
        self.events.remove(&self.target(), event)
    }

    pub fn off_all(&self, kind: SaucerApplicationEvent) {
        self.events.remove_all(&self.target(), kind);
    }

    /// Persistent handlers registered for `kind`.
    pub fn listener_count(&self, kind: SaucerApplicationEvent) -> usize {
        self.handle.assert_alive();
        self.events.len(kind)
    }

    /// One-shot handlers for `kind` that have not fired yet.
    pub fn pending_once(&self, kind: SaucerApplicationEvent) -> usize {
        self.handle.assert_alive();
        self.events.pending_once(kind)
    }
}

struct RunHooks<'a> {
    application: &'a Application,
    on_run: &'a mut dyn FnMut(&Application),
    on_finish: &'a mut dyn FnMut(&Application),
}

extern "C" fn run_hook(_application: *mut SaucerApplication, userdata: *mut c_void) {
    let hooks = unsafe { &mut *(userdata as *mut RunHooks<'_>) };
    catch_panic_ffi("Application run hook", || (), || (hooks.on_run)(hooks.application));
}

extern "C" fn finish_hook(_application: *mut SaucerApplication, userdata: *mut c_void) {
    let hooks = unsafe { &mut *(userdata as *mut RunHooks<'_>) };
    catch_panic_ffi("Application finish hook", || (), || (hooks.on_finish)(hooks.application));
}

impl ManagedEntity for Application {
    const ENTITY: &'static str = "Application";

    fn dispose(&self) {
        let Ok(raw) = self.handle.try_address() else {
            return;
        };
        self.events.release(&NativeTarget::new(raw, &self.library));
        self.posts.clear();
        self.handle.release();
        log::debug!("Disposed application");
    }

    fn is_disposed(&self) -> bool {
        !self.handle.is_alive()
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application").field("handle", &self.handle).finish_non_exhaustive()
    }
}
