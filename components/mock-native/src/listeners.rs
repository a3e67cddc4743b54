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

//! Listener table shared by the application, window and webview fakes.

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::sync::Mutex;

use saucer_ffi_primitives::{SendMutPtr, SendPtr};

use crate::tracking::lock;

/// How often each event entry point was called on one object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub on: usize,
    pub once: usize,
    pub off: usize,
    pub off_all: usize,
}

#[derive(Clone, Copy)]
struct Listener {
    id: usize,
    callback: SendPtr<c_void>,
    userdata: SendMutPtr<c_void>,
    clearable: bool,
    once: bool,
}

#[derive(Default)]
struct ListenerState {
    next_id: usize,
    entries: BTreeMap<i32, Vec<Listener>>,
    stats: CallStats,
}

impl ListenerState {
    fn push(&mut self, event: i32, mut listener: Listener) -> usize {
        self.next_id += 1;
        listener.id = self.next_id;
        self.entries.entry(event).or_default().push(listener);
        self.next_id
    }
}

#[derive(Default)]
pub(crate) struct Listeners {
    state: Mutex<ListenerState>,
}

impl Listeners {
    pub(crate) fn on(&self, event: i32, callback: *const c_void, clearable: bool, userdata: *mut c_void) -> usize {
        let mut state = lock(&self.state);
        state.stats.on += 1;
        state.push(
            event,
            Listener {
                id: 0,
                callback: SendPtr(callback),
                userdata: SendMutPtr(userdata),
                clearable,
                once: false,
            },
        )
    }

    pub(crate) fn once(&self, event: i32, callback: *const c_void, userdata: *mut c_void) {
        let mut state = lock(&self.state);
        state.stats.once += 1;
        state.push(
            event,
            Listener {
                id: 0,
                callback: SendPtr(callback),
                userdata: SendMutPtr(userdata),
                clearable: false,
                once: true,
            },
        );
    }

    pub(crate) fn off(&self, event: i32, id: usize) {
        let mut state = lock(&self.state);
        state.stats.off += 1;
        if let Some(listeners) = state.entries.get_mut(&event) {
            listeners.retain(|listener| listener.id != id);
        }
    }

    /// Drops every clearable persistent listener. One-shots stay.
    pub(crate) fn off_all(&self, event: i32) {
        let mut state = lock(&self.state);
        state.stats.off_all += 1;
        if let Some(listeners) = state.entries.get_mut(&event) {
            listeners.retain(|listener| listener.once || !listener.clearable);
        }
    }

    /// The owner was destroyed: forget everything without counting calls.
    pub(crate) fn clear(&self) {
        lock(&self.state).entries.clear();
    }

    pub(crate) fn count(&self, event: i32) -> usize {
        lock(&self.state).entries.get(&event).map_or(0, Vec::len)
    }

    pub(crate) fn stats(&self) -> CallStats {
        lock(&self.state).stats
    }

    /// Call every listener of `event` in registration order.
    ///
    /// The id list is snapshotted up front and every entry is looked up
    /// again right before its call, so listeners removed by an earlier
    /// callback are skipped. One-shots are removed before they run. No lock
    /// is held while a callback runs.
    pub(crate) fn emit<R>(&self, event: i32, mut call: impl FnMut(*const c_void, *mut c_void) -> R) -> Vec<R> {
        let ids: Vec<usize> = lock(&self.state)
            .entries
            .get(&event)
            .map(|listeners| listeners.iter().map(|listener| listener.id).collect())
            .unwrap_or_default();

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let listener = {
                let mut state = lock(&self.state);
                let Some(listeners) = state.entries.get_mut(&event) else {
                    break;
                };
                let Some(index) = listeners.iter().position(|listener| listener.id == id) else {
                    continue;
                };
                if listeners[index].once {
                    listeners.remove(index)
                } else {
                    listeners[index]
                }
            };
            results.push(call(listener.callback.as_ptr(), listener.userdata.as_ptr()));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_emit_skips_listeners_removed_mid_dispatch() {
        let listeners = Listeners::default();
        let first = listeners.on(1, std::ptr::null(), true, std::ptr::null_mut());
        let second = listeners.on(1, std::ptr::null(), true, std::ptr::null_mut());

        let seen = RefCell::new(Vec::new());
        listeners.emit(1, |_, _| {
            let call = seen.borrow().len();
            seen.borrow_mut().push(call);
            listeners.off(1, second);
        });

        assert_eq!(seen.into_inner(), vec![0]);
        assert_eq!(listeners.count(1), 1);
        assert!(first < second);
    }

    #[test]
    fn test_once_listener_fires_once() {
        let listeners = Listeners::default();
        listeners.once(2, std::ptr::null(), std::ptr::null_mut());

        assert_eq!(listeners.emit(2, |_, _| ()).len(), 1);
        assert_eq!(listeners.emit(2, |_, _| ()).len(), 0);
    }

    #[test]
    fn test_off_all_keeps_one_shots() {
        let listeners = Listeners::default();
        listeners.on(3, std::ptr::null(), true, std::ptr::null_mut());
        listeners.once(3, std::ptr::null(), std::ptr::null_mut());

        listeners.off_all(3);

        assert_eq!(listeners.count(3), 1);
        assert_eq!(
            listeners.stats(),
            CallStats {
                on: 1,
                once: 1,
                off: 0,
                off_all: 1
            }
        );
    }
}
