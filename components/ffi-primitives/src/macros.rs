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

//! Declarative macros for the boilerplate of describing a C ABI.
//!
//! [`ffi_opaque!`] declares opaque native object types that can only be
//! handled behind a pointer.

/// Declare one or more opaque native types.
///
/// The generated structs are zero-sized, `!Send`, `!Sync` and `!Unpin`, so
/// the only sensible thing Rust code can do with them is pass `*mut T`
/// around. This mirrors how the native library exposes its objects.
///
/// # Example
///
/// ```rust
/// use saucer_ffi_primitives::ffi_opaque;
///
/// ffi_opaque! {
///     /// A native widget.
///     pub struct Widget;
/// }
///
/// let ptr: *mut Widget = std::ptr::null_mut();
/// assert!(ptr.is_null());
/// ```
#[macro_export]
macro_rules! ffi_opaque {
    ($( $(#[$meta:meta])* pub struct $name:ident; )*) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            pub struct $name {
                _private: [u8; 0],
                _marker: ::std::marker::PhantomData<(*mut u8, ::std::marker::PhantomPinned)>,
            }
        )*
    };
}

#[cfg(test)]
mod tests {
    ffi_opaque! {
        pub struct Opaque;
    }

    #[test]
    fn test_opaque_is_zero_sized() {
        assert_eq!(std::mem::size_of::<Opaque>(), 0);
    }
}
