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

//! Closure-identity keyed bookkeeping for one event category of one owner.
//!
//! The native API only knows integer subscription ids and raw function
//! pointers. [`Subscriptions`] maps each registered handler (identified by
//! the address of its `Arc`, never by what it captures) to the native id
//! and the pinned [`Thunk`] that serves it.
//!
//! Policies:
//!
//! - adding a handler that is already registered *replaces* the previous
//!   native subscription, so a handler is never live twice
//! - one-shot handlers bypass the identity map; they stay pinned until they
//!   fire or the owner is disposed
//! - no registry lock is held while native code runs a handler, so handlers
//!   may add, remove or dispose freely

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::library::NativeLibrary;
use crate::thunks::{lock, Category, OnceTable, OnceTicket, RawThunk, Thunk};

/// Identity of a handler: the data address of its `Arc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct HandlerKey(usize);

impl HandlerKey {
    fn of<H: ?Sized>(handler: &Arc<H>) -> Self {
        Self(Arc::as_ptr(handler) as *const () as usize)
    }
}

struct Subscription<C: Category> {
    id: usize,
    thunk: Thunk<C>,
}

pub struct Subscriptions<C: Category> {
    live: Mutex<HashMap<HandlerKey, Subscription<C>>>,
    once: Arc<OnceTable<C>>,
    next_once: AtomicU64,
    library: Arc<NativeLibrary>,
}

impl<C: Category> Subscriptions<C> {
    pub fn new(library: Arc<NativeLibrary>) -> Self {
        Self {
            live: Mutex::new(HashMap::new()),
            once: Arc::new(Mutex::new(HashMap::new())),
            next_once: AtomicU64::new(0),
            library,
        }
    }

    /// Register `handler`.
    ///
    /// `register` performs the native `*_on` call and returns its id.
    /// `unregister` removes a subscription this one replaces: the one found
    /// before registering, and any registered for the same handler while
    /// `register` ran.
    pub fn add(
        &self,
        handler: Arc<C::Handler>,
        register: impl FnOnce(RawThunk) -> usize,
        unregister: impl Fn(usize),
    ) {
        let key = HandlerKey::of(&handler);

        let previous = lock(&self.live).remove(&key);
        if let Some(previous) = previous {
            log::debug!("Replacing {} subscription {}", C::NAME, previous.id);
            unregister(previous.id);
            drop(previous);
        }

        let thunk = Thunk::new(handler, self.library.clone());
        let id = register(thunk.raw());
        log::debug!("Added {} subscription {}", C::NAME, id);

        // The lock is not held across `register`, so a concurrent add of the
        // same handler may have landed in between. Its native subscription
        // must go before its thunk does.
        let displaced = lock(&self.live).insert(key, Subscription { id, thunk });
        if let Some(displaced) = displaced {
            log::debug!("Replacing {} subscription {}", C::NAME, displaced.id);
            unregister(displaced.id);
            drop(displaced);
        }
    }

    /// Remove `handler`. Returns `false`, without calling `unregister`, if it
    /// was never registered.
    pub fn remove(&self, handler: &Arc<C::Handler>, unregister: impl FnOnce(usize)) -> bool {
        let removed = lock(&self.live).remove(&HandlerKey::of(handler));
        match removed {
            Some(subscription) => {
                unregister(subscription.id);
                log::debug!("Removed {} subscription {}", C::NAME, subscription.id);
                true
            }
            None => false,
        }
    }

    /// Remove every persistent subscription with one bulk native call.
    ///
    /// `unregister_all` runs exactly once, even when nothing is registered.
    /// One-shot thunks are left pinned.
    pub fn remove_all(&self, unregister_all: impl FnOnce()) {
        unregister_all();
        let removed = std::mem::take(&mut *lock(&self.live));
        log::debug!("Removed all {} {} subscription(s)", removed.len(), C::NAME);
        drop(removed);
    }

    /// Register a handler that fires at most once.
    ///
    /// `register_once` performs the native `*_once` call.
    pub fn add_once(&self, handler: Arc<C::Handler>, register_once: impl FnOnce(RawThunk)) {
        let id = self.next_once.fetch_add(1, Ordering::Relaxed);
        let ticket = OnceTicket {
            id,
            table: Arc::downgrade(&self.once),
        };
        let thunk = Thunk::with_ticket(handler, self.library.clone(), Some(ticket));
        let raw = thunk.raw();

        // Pinned before native code can possibly fire it.
        lock(&self.once).insert(id, thunk);
        register_once(raw);
        log::debug!("Added {} one-shot {}", C::NAME, id);
    }

    /// Release every thunk without telling the native side.
    ///
    /// Only valid once the native side can no longer call back, i.e. after
    /// [`remove_all`](Self::remove_all) or destruction of the owner.
    pub fn clear(&self) {
        let live = std::mem::take(&mut *lock(&self.live));
        let once = std::mem::take(&mut *lock(&self.once));
        if !live.is_empty() || !once.is_empty() {
            log::debug!(
                "Released {} {} subscription(s) and {} one-shot(s)",
                live.len(),
                C::NAME,
                once.len()
            );
        }
    }

    pub fn contains(&self, handler: &Arc<C::Handler>) -> bool {
        lock(&self.live).contains_key(&HandlerKey::of(handler))
    }

    /// Number of persistent subscriptions.
    pub fn len(&self) -> usize {
        lock(&self.live).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of one-shot handlers that have not fired yet.
    pub fn pending_once(&self) -> usize {
        lock(&self.once).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thunks::event_category;
    use std::cell::RefCell;
    use std::ffi::c_void;

    event_category! {
        Ping: dyn Fn() + Send + Sync,
        fn(_owner: *mut c_void) -> () = (),
        |handler, _library| handler()
    }

    #[derive(Default)]
    struct NativeLog {
        registered: RefCell<Vec<RawThunk>>,
        unregistered: RefCell<Vec<usize>>,
        bulk: RefCell<usize>,
    }

    impl NativeLog {
        fn register(&self, thunk: RawThunk) -> usize {
            let mut registered = self.registered.borrow_mut();
            registered.push(thunk);
            registered.len()
        }

        fn unregister(&self, id: usize) {
            self.unregistered.borrow_mut().push(id);
        }
    }

    fn subscriptions() -> Subscriptions<Ping> {
        Subscriptions::new(NativeLibrary::from_vtable(saucer_mock_native::vtable()))
    }

    fn handler() -> Arc<dyn Fn() + Send + Sync> {
        Arc::new(|| {})
    }

    #[test]
    fn test_add_then_remove_is_balanced() {
        let native = NativeLog::default();
        let subs = subscriptions();
        let h = handler();

        subs.add(h.clone(), |t| native.register(t), |id| native.unregister(id));
        assert_eq!(subs.len(), 1);
        assert!(subs.contains(&h));

        assert!(subs.remove(&h, |id| native.unregister(id)));
        assert!(subs.is_empty());
        assert_eq!(native.registered.borrow().len(), 1);
        assert_eq!(*native.unregistered.borrow(), vec![1]);
        assert_eq!(Arc::strong_count(&h), 1);
    }

    #[test]
    fn test_adding_same_handler_replaces() {
        let native = NativeLog::default();
        let subs = subscriptions();
        let h = handler();

        subs.add(h.clone(), |t| native.register(t), |id| native.unregister(id));
        subs.add(h.clone(), |t| native.register(t), |id| native.unregister(id));

        assert_eq!(subs.len(), 1);
        assert_eq!(native.registered.borrow().len(), 2);
        assert_eq!(*native.unregistered.borrow(), vec![1]);
        // One live thunk plus the test's own reference.
        assert_eq!(Arc::strong_count(&h), 2);
    }

    #[test]
    fn test_add_racing_same_handler_leaves_one_live_subscription() {
        let native = NativeLog::default();
        let subs = subscriptions();
        let h = handler();

        // A second add of the same handler lands while the first one is
        // still inside its native registration call.
        subs.add(
            h.clone(),
            |t| {
                subs.add(h.clone(), |t| native.register(t), |id| native.unregister(id));
                native.register(t)
            },
            |id| native.unregister(id),
        );

        assert_eq!(subs.len(), 1);
        assert_eq!(native.registered.borrow().len(), 2);
        assert_eq!(*native.unregistered.borrow(), vec![1]);
        assert_eq!(Arc::strong_count(&h), 2);

        assert!(subs.remove(&h, |id| native.unregister(id)));
        assert_eq!(*native.unregistered.borrow(), vec![1, 2]);
        assert!(subs.is_empty());
        assert_eq!(Arc::strong_count(&h), 1);
    }

    #[test]
    fn test_identity_is_by_arc_not_by_behaviour() {
        let native = NativeLog::default();
        let subs = subscriptions();
        let first = handler();
        let second = handler();

        subs.add(first.clone(), |t| native.register(t), |id| native.unregister(id));
        subs.add(second.clone(), |t| native.register(t), |id| native.unregister(id));
        assert_eq!(subs.len(), 2);
        assert!(native.unregistered.borrow().is_empty());
    }

    #[test]
    fn test_remove_unknown_makes_no_native_call() {
        let native = NativeLog::default();
        let subs = subscriptions();
        assert!(!subs.remove(&handler(), |id| native.unregister(id)));
        assert!(native.unregistered.borrow().is_empty());
    }

    #[test]
    fn test_remove_all_is_one_bulk_call() {
        for count in [0usize, 1, 5] {
            let native = NativeLog::default();
            let subs = subscriptions();
            let handlers: Vec<_> = (0..count).map(|_| handler()).collect();
            for h in &handlers {
                subs.add(h.clone(), |t| native.register(t), |id| native.unregister(id));
            }

            subs.remove_all(|| *native.bulk.borrow_mut() += 1);

            assert_eq!(*native.bulk.borrow(), 1);
            assert!(native.unregistered.borrow().is_empty());
            assert!(subs.is_empty());
            assert!(handlers.iter().all(|h| Arc::strong_count(h) == 1));
        }
    }

    #[test]
    fn test_one_shot_released_after_firing() {
        let subs = subscriptions();
        let fired = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let fired_in_handler = fired.clone();
        let h: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            fired_in_handler.fetch_add(1, Ordering::SeqCst);
        });

        let mut captured = None;
        subs.add_once(h.clone(), |t| captured = Some(t));
        assert_eq!(subs.pending_once(), 1);
        assert!(subs.is_empty());

        let raw = captured.unwrap();
        Ping::native(std::ptr::null_mut(), raw.userdata);

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(subs.pending_once(), 0);
        assert_eq!(Arc::strong_count(&h), 1);
    }

    #[test]
    fn test_remove_all_keeps_one_shots_until_clear() {
        let native = NativeLog::default();
        let subs = subscriptions();
        let h = handler();
        subs.add_once(h.clone(), |_| {});

        subs.remove_all(|| *native.bulk.borrow_mut() += 1);
        assert_eq!(subs.pending_once(), 1);

        subs.clear();
        assert_eq!(subs.pending_once(), 0);
        assert_eq!(Arc::strong_count(&h), 1);
    }
}
