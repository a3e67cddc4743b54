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

//! Thunks: native-callable function values that wrap Rust closures.
//!
//! The native library calls back through a bare `extern "C"` function pointer
//! plus an opaque `userdata` token. Every event category therefore has one
//! fixed trampoline (generated by [`event_category!`]) whose signature
//! matches the native callback exactly. A [`Thunk`] pairs that trampoline
//! with a heap-pinned [`ThunkCell`] whose address is the `userdata` token.
//!
//! # Lifetime
//!
//! The cell lives in an `Arc` and never moves. The owning registry keeps the
//! [`Thunk`] (one strong reference) for as long as the native side may call
//! it. While a trampoline runs it holds a second strong reference, so a
//! handler that removes its own subscription or disposes its owner cannot
//! free the cell out from under the call in progress; the memory goes away
//! when the trampoline returns.
//!
//! Releasing a thunk marks the cell inactive. A trampoline that observes an
//! inactive cell means the native side called back after being told not to,
//! which is unrecoverable: it is logged and the process aborts.
//!
//! # Panics
//!
//! Handler panics never unwind into native code. They are caught, logged and
//! turned into the category's fallback return value.

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use saucer_ffi_primitives::catch_panic_ffi;

use crate::library::NativeLibrary;

/// Lock a registry mutex.
///
/// No user code runs while these locks are held, so a poisoned lock still
/// guards consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Categories
// ============================================================================

/// One native callback shape.
///
/// Categories are closed: each is a zero-sized marker type declared with
/// [`event_category!`], naming the Rust handler type it carries and the
/// trampoline native code calls.
pub trait Category: Sized + 'static {
    type Handler: ?Sized + Send + Sync + 'static;

    const NAME: &'static str;

    /// The trampoline, erased for the untyped `*_on`/`*_once` entry points.
    fn trampoline() -> *const c_void;
}

/// Declare an event category and its trampoline.
///
/// ```text
/// event_category! {
///     pub WindowResize: dyn Fn(i32, i32) + Send + Sync,
///     fn(_window: *mut SaucerWindow, width: c_int, height: c_int) -> () = (),
///     |handler, _library| handler(width, height)
/// }
/// ```
///
/// The parameter list is the native callback's, minus the trailing
/// `userdata`. The expression after `=` is returned when the handler panics.
/// The closure-like body decodes the native arguments and calls the handler;
/// it also receives the owning `Arc<NativeLibrary>` for building borrowed
/// proxies around object arguments.
///
/// The typed trampoline is also available as `<Category>::native` for entry
/// points that take a typed function pointer.
macro_rules! event_category {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident: $handler:ty,
        fn($( $arg:ident: $arg_ty:ty ),* $(,)?) -> $ret:ty = $fallback:expr,
        |$h:ident, $lib:ident| $body:expr
    ) => {
        $(#[$meta])*
        $vis struct $name;

        impl $name {
            #[allow(clippy::unused_unit)]
            pub(crate) extern "C" fn native(
                $( $arg: $arg_ty, )*
                userdata: *mut ::std::ffi::c_void,
            ) -> $ret {
                unsafe {
                    $crate::thunks::invoke::<$name, $ret>(userdata, $fallback, |$h, $lib| $body)
                }
            }
        }

        impl $crate::thunks::Category for $name {
            type Handler = $handler;

            const NAME: &'static str = stringify!($name);

            fn trampoline() -> *const ::std::ffi::c_void {
                Self::native as *const ::std::ffi::c_void
            }
        }
    };
}

pub(crate) use event_category;

// ============================================================================
// Thunks
// ============================================================================

/// What gets handed to the native registration call.
#[derive(Debug, Clone, Copy)]
pub struct RawThunk {
    pub function: *const c_void,
    pub userdata: *mut c_void,
}

pub(crate) type OnceTable<C> = Mutex<HashMap<u64, Thunk<C>>>;

/// Marks a cell as one-shot: its trampoline removes the owning entry from
/// `table` when it fires.
pub(crate) struct OnceTicket<C: Category> {
    pub(crate) id: u64,
    pub(crate) table: Weak<OnceTable<C>>,
}

impl<C: Category> OnceTicket<C> {
    fn redeem(&self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        // Dropped after the guard so the release log runs unlocked.
        let thunk = lock(&table).remove(&self.id);
        if thunk.is_some() {
            log::debug!("{} one-shot {} fired", C::NAME, self.id);
        }
    }
}

pub(crate) struct ThunkCell<C: Category> {
    active: AtomicBool,
    handler: Arc<C::Handler>,
    library: Arc<NativeLibrary>,
    once: Option<OnceTicket<C>>,
}

/// Owning side of a pinned callback. Dropping it releases the pin.
pub struct Thunk<C: Category> {
    cell: Arc<ThunkCell<C>>,
}

impl<C: Category> Thunk<C> {
    pub(crate) fn new(handler: Arc<C::Handler>, library: Arc<NativeLibrary>) -> Self {
        Self::with_ticket(handler, library, None)
    }

    pub(crate) fn with_ticket(
        handler: Arc<C::Handler>,
        library: Arc<NativeLibrary>,
        once: Option<OnceTicket<C>>,
    ) -> Self {
        Self {
            cell: Arc::new(ThunkCell {
                active: AtomicBool::new(true),
                handler,
                library,
                once,
            }),
        }
    }

    pub fn raw(&self) -> RawThunk {
        RawThunk {
            function: C::trampoline(),
            userdata: Arc::as_ptr(&self.cell) as *mut c_void,
        }
    }

    pub fn handler(&self) -> &Arc<C::Handler> {
        &self.cell.handler
    }
}

impl<C: Category> Drop for Thunk<C> {
    fn drop(&mut self) {
        self.cell.active.store(false, Ordering::Release);
        log::trace!("Released {} thunk {:p}", C::NAME, Arc::as_ptr(&self.cell));
    }
}

/// Trampoline body shared by every category.
///
/// # Safety
///
/// `userdata` must be the token of a [`Thunk<C>`] that has not been dropped
/// yet, or that is being kept alive by an invocation further up the stack.
pub(crate) unsafe fn invoke<C: Category, R>(
    userdata: *mut c_void,
    fallback: R,
    body: impl FnOnce(&C::Handler, &Arc<NativeLibrary>) -> R,
) -> R {
    let raw = userdata as *const ThunkCell<C>;
    Arc::increment_strong_count(raw);
    let cell = Arc::from_raw(raw);

    if !cell.active.load(Ordering::Acquire) {
        log::error!(
            "{} callback invoked after its thunk was released; aborting",
            C::NAME
        );
        std::process::abort();
    }

    if let Some(ticket) = &cell.once {
        ticket.redeem();
    }

    catch_panic_ffi(C::NAME, || fallback, || body(&cell.handler, &cell.library))
}
