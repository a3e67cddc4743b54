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

//! Managed proxies for every native saucer object.
//!
//! Each proxy owns one [`NativeHandle`](saucer_ffi_primitives::NativeHandle)
//! and, for objects that emit events, one [`Subscriptions`] registry per
//! event category. Disposal always runs in the same order: every registry
//! issues its bulk native removal and releases its thunks, then the handle is
//! freed. After that every method panics with a use-after-dispose message.
//!
//! Objects handed to callbacks (urls, icons, navigations, permission and
//! scheme requests) are *borrowed*: the proxy is only valid for the duration
//! of the callback and never frees the native object. Call `copy()` to keep
//! one.

use saucer_abi::*;

use crate::library::NativeLibrary;
use crate::thunks::RawThunk;

pub mod application;
pub mod icon;
pub mod navigation;
pub mod permission;
pub mod scheme;
pub mod screen;
pub mod stash;
pub mod url;
pub mod webview;
pub mod window;

/// Shared lifecycle of every proxy.
pub trait ManagedEntity {
    /// Name used in logs and error messages.
    const ENTITY: &'static str;

    /// Release the native object. Idempotent.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

// ============================================================================
// Event plumbing
// ============================================================================

/// A live native address together with the table used to reach it.
///
/// Built fresh for every event operation, which is where use after dispose
/// is caught.
pub(crate) struct NativeTarget<'a, T> {
    raw: *mut T,
    vtable: &'a SaucerVtable,
}

impl<'a, T> NativeTarget<'a, T> {
    pub(crate) fn new(raw: *mut T, library: &'a NativeLibrary) -> Self {
        Self {
            raw,
            vtable: library.vtable(),
        }
    }
}

/// The four native event entry points of one object type.
pub(crate) trait EventTarget {
    type Event: Copy;

    fn on(&self, event: Self::Event, thunk: RawThunk) -> usize;
    fn once(&self, event: Self::Event, thunk: RawThunk);
    fn off(&self, event: Self::Event, id: usize);
    fn off_all(&self, event: Self::Event);
}

macro_rules! native_event_target {
    ($object:ty, $event:ty, $on:ident, $once:ident, $off:ident, $off_all:ident) => {
        impl EventTarget for NativeTarget<'_, $object> {
            type Event = $event;

            // Always clearable: `off_all` has to reach every persistent
            // listener before its thunk is released.
            fn on(&self, event: $event, thunk: RawThunk) -> usize {
                unsafe { (self.vtable.$on)(self.raw, event, thunk.function, true, thunk.userdata) }
            }

            fn once(&self, event: $event, thunk: RawThunk) {
                unsafe { (self.vtable.$once)(self.raw, event, thunk.function, thunk.userdata) }
            }

            fn off(&self, event: $event, id: usize) {
                unsafe { (self.vtable.$off)(self.raw, event, id) }
            }

            fn off_all(&self, event: $event) {
                unsafe { (self.vtable.$off_all)(self.raw, event) }
            }
        }
    };
}

native_event_target!(
    SaucerApplication,
    SaucerApplicationEvent,
    application_on,
    application_once,
    application_off,
    application_off_all
);
native_event_target!(
    SaucerWindow,
    SaucerWindowEvent,
    window_on,
    window_once,
    window_off,
    window_off_all
);
native_event_target!(
    SaucerWebview,
    SaucerWebviewEvent,
    webview_on,
    webview_once,
    webview_off,
    webview_off_all
);

/// Declare an entity's closed event enum and the registry set behind it.
///
/// Every variant carries the typed handler of one category. The generated
/// `$events` struct holds one [`Subscriptions`](crate::subscriptions::Subscriptions)
/// per variant and routes add/remove through an [`EventTarget`].
macro_rules! entity_events {
    (
        $(#[$meta:meta])*
        pub enum $event:ident in $events:ident for $native:ident {
            $( $(#[$variant_meta:meta])* $variant:ident($category:ident) => $field:ident, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub enum $event {
            $(
                $(#[$variant_meta])*
                $variant(::std::sync::Arc<<$category as $crate::thunks::Category>::Handler>),
            )*
        }

        impl $event {
            /// The native event this handler listens to.
            pub fn kind(&self) -> $native {
                match self {
                    $( Self::$variant(_) => $native::$variant, )*
                }
            }
        }

        impl ::std::fmt::Debug for $event {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}::{:?}", stringify!($event), self.kind())
            }
        }

        pub(crate) struct $events {
            $( $field: $crate::subscriptions::Subscriptions<$category>, )*
        }

        impl $events {
            pub(crate) fn new(library: &::std::sync::Arc<$crate::library::NativeLibrary>) -> Self {
                Self {
                    $( $field: $crate::subscriptions::Subscriptions::new(library.clone()), )*
                }
            }

            pub(crate) fn add<T: $crate::proxies::EventTarget<Event = $native>>(&self, target: &T, event: $event) {
                match event {
                    $(
                        $event::$variant(handler) => self.$field.add(
                            handler,
                            |thunk| target.on($native::$variant, thunk),
                            |id| target.off($native::$variant, id),
                        ),
                    )*
                }
            }

            pub(crate) fn add_once<T: $crate::proxies::EventTarget<Event = $native>>(&self, target: &T, event: $event) {
                match event {
                    $(
                        $event::$variant(handler) => self.$field.add_once(
                            handler,
                            |thunk| target.once($native::$variant, thunk),
                        ),
                    )*
                }
            }

            pub(crate) fn remove<T: $crate::proxies::EventTarget<Event = $native>>(&self, target: &T, event: &$event) -> bool {
                match event {
                    $(
                        $event::$variant(handler) => {
                            self.$field.remove(handler, |id| target.off($native::$variant, id))
                        }
                    )*
                }
            }

            pub(crate) fn remove_all<T: $crate::proxies::EventTarget<Event = $native>>(&self, target: &T, kind: $native) {
                match kind {
                    $( $native::$variant => self.$field.remove_all(|| target.off_all(kind)), )*
                }
            }

            pub(crate) fn len(&self, kind: $native) -> usize {
                match kind {
                    $( $native::$variant => self.$field.len(), )*
                }
            }

            pub(crate) fn pending_once(&self, kind: $native) -> usize {
                match kind {
                    $( $native::$variant => self.$field.pending_once(), )*
                }
            }

            /// Disposal: bulk-remove every category natively, then release
            /// every thunk including unfired one-shots.
            pub(crate) fn release<T: $crate::proxies::EventTarget<Event = $native>>(&self, target: &T) {
                $(
                    self.$field.remove_all(|| target.off_all($native::$variant));
                    self.$field.clear();
                )*
            }
        }
    };
}

pub(crate) use entity_events;

