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

//! Ownership of a single opaque native address.
//!
//! Every proxy holds exactly one [`NativeHandle`]. The handle is either
//! *owned* (it carries the native free function and releases the address
//! exactly once) or *borrowed* (it refers to an object the native library
//! owns, such as an argument handed to a callback, and never frees it).
//!
//! Release swaps the address to null before freeing, so a handle observed
//! after release reports itself as dead instead of handing out a dangling
//! pointer.

use std::fmt;
use std::os::raw::c_int;
use std::sync::atomic::{AtomicPtr, Ordering};

/// Native destructor for an owned object.
pub type FreeFn<T> = unsafe extern "C" fn(*mut T);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    #[error("native construction of {entity} failed with code {code}")]
    Construction { entity: &'static str, code: i32 },
    #[error("{entity} used after dispose")]
    UseAfterDispose { entity: &'static str },
}

pub struct NativeHandle<T> {
    address: AtomicPtr<T>,
    free: Option<FreeFn<T>>,
    entity: &'static str,
}

// The handle only moves an address around; which thread may *use* the
// object is enforced by the native library itself.
unsafe impl<T> Send for NativeHandle<T> {}
unsafe impl<T> Sync for NativeHandle<T> {}

impl<T> NativeHandle<T> {
    /// Take ownership of `raw`, freeing it with `free` on release.
    ///
    /// A null `raw` is reported as a construction failure with code `-1`.
    pub fn acquire(entity: &'static str, raw: *mut T, free: FreeFn<T>) -> Result<Self, HandleError> {
        Self::acquire_checked(entity, raw, 0, free)
    }

    /// Take ownership of `raw` produced by a fallible native constructor.
    ///
    /// A nonzero `code` is a failure even when `raw` is non-null; in that
    /// case the stray address is freed before the error is returned.
    pub fn acquire_checked(
        entity: &'static str,
        raw: *mut T,
        code: c_int,
        free: FreeFn<T>,
    ) -> Result<Self, HandleError> {
        if code != 0 {
            if !raw.is_null() {
                log::warn!("{entity} constructor returned an address alongside error {code}; freeing it");
                unsafe { free(raw) };
            }
            return Err(HandleError::Construction { entity, code });
        }
        if raw.is_null() {
            return Err(HandleError::Construction { entity, code: -1 });
        }

        Ok(Self {
            address: AtomicPtr::new(raw),
            free: Some(free),
            entity,
        })
    }

    /// Wrap an address the native library keeps ownership of.
    pub fn borrowed(entity: &'static str, raw: *mut T) -> Self {
        Self {
            address: AtomicPtr::new(raw),
            free: None,
            entity,
        }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn is_owned(&self) -> bool {
        self.free.is_some()
    }

    pub fn is_alive(&self) -> bool {
        !self.address.load(Ordering::Acquire).is_null()
    }

    pub fn try_address(&self) -> Result<*mut T, HandleError> {
        let raw = self.address.load(Ordering::Acquire);
        if raw.is_null() {
            Err(HandleError::UseAfterDispose {
                entity: self.entity,
            })
        } else {
            Ok(raw)
        }
    }

    /// The live address.
    ///
    /// # Panics
    ///
    /// Panics if the handle has been released. Infallible accessors on the
    /// proxies route through here, so touching a disposed entity is a
    /// programming error surfaced at the call site.
    pub fn address(&self) -> *mut T {
        match self.try_address() {
            Ok(raw) => raw,
            Err(e) => panic!("{e}"),
        }
    }

    /// Panic like [`address`](Self::address) if the handle was released.
    ///
    /// For proxy methods that only read Rust-side bookkeeping but must still
    /// fail fast once the entity is gone.
    pub fn assert_alive(&self) {
        if let Err(e) = self.try_address() {
            panic!("{e}");
        }
    }

    /// Release the address. Returns `true` if this call performed the
    /// release; later calls are no-ops.
    pub fn release(&self) -> bool {
        let raw = self.address.swap(std::ptr::null_mut(), Ordering::AcqRel);
        if raw.is_null() {
            return false;
        }
        if let Some(free) = self.free {
            log::trace!("Freeing native {} at {:p}", self.entity, raw);
            unsafe { free(raw) };
        }
        true
    }
}

impl<T> Drop for NativeHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> fmt::Debug for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("entity", &self.entity)
            .field("address", &self.address.load(Ordering::Acquire))
            .field("owned", &self.is_owned())
            .finish()
    }
}
