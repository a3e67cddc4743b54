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

//! Per-thread bookkeeping: live object count, injected construction failures
//! and the most recently created event-emitting objects.
//!
//! Tests run on their own threads, so keeping this state thread-local lets
//! them run in parallel without seeing each other's objects. Scheme
//! registration is the exception: it is process-wide in the real library and
//! is process-wide here too.

use std::cell::RefCell;
use std::os::raw::c_int;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::objects::{MockApplication, MockWebview, MockWindow};

#[derive(Default)]
struct Tracker {
    live: usize,
    failure: Option<Failure>,
    application: Option<Arc<MockApplication>>,
    window: Option<Arc<MockWindow>>,
    webview: Option<Arc<MockWebview>>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Failure {
    pub(crate) code: c_int,
    pub(crate) with_object: bool,
}

thread_local! {
    static TRACKER: RefCell<Tracker> = RefCell::new(Tracker::default());
}

static SCHEMES: Mutex<Vec<String>> = Mutex::new(Vec::new());

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn allocated() {
    TRACKER.with(|tracker| tracker.borrow_mut().live += 1);
}

pub(crate) fn released() {
    TRACKER.with(|tracker| {
        let mut tracker = tracker.borrow_mut();
        tracker.live = tracker.live.saturating_sub(1);
    });
}

/// Native objects created on this thread and not freed yet.
pub fn live_objects() -> usize {
    TRACKER.with(|tracker| tracker.borrow().live)
}

/// Make the next application, window or webview constructor on this thread
/// fail with `code`. With `with_object` the constructor also returns a real
/// object alongside the error, which the caller is expected to free.
pub fn fail_next_construction(code: c_int, with_object: bool) {
    TRACKER.with(|tracker| tracker.borrow_mut().failure = Some(Failure { code, with_object }));
}

pub(crate) fn take_failure() -> Option<Failure> {
    TRACKER.with(|tracker| tracker.borrow_mut().failure.take())
}

pub(crate) fn remember_application(application: Arc<MockApplication>) {
    TRACKER.with(|tracker| tracker.borrow_mut().application = Some(application));
}

pub(crate) fn remember_window(window: Arc<MockWindow>) {
    TRACKER.with(|tracker| tracker.borrow_mut().window = Some(window));
}

pub(crate) fn remember_webview(webview: Arc<MockWebview>) {
    TRACKER.with(|tracker| tracker.borrow_mut().webview = Some(webview));
}

/// The last application created on this thread.
pub fn latest_application() -> Option<Arc<MockApplication>> {
    TRACKER.with(|tracker| tracker.borrow().application.clone())
}

/// The last window created on this thread.
pub fn latest_window() -> Option<Arc<MockWindow>> {
    TRACKER.with(|tracker| tracker.borrow().window.clone())
}

/// The last webview created on this thread.
pub fn latest_webview() -> Option<Arc<MockWebview>> {
    TRACKER.with(|tracker| tracker.borrow().webview.clone())
}

pub(crate) fn register_scheme(scheme: String) {
    let mut schemes = lock(&SCHEMES);
    if !schemes.contains(&scheme) {
        schemes.push(scheme);
    }
}

/// Every scheme passed to `saucer_webview_register_scheme` in this process.
pub fn registered_schemes() -> Vec<String> {
    lock(&SCHEMES).clone()
}
