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

//! FFI-safe types shared across the saucer boundary.
//!
//! Opaque object types are zero-sized markers: only pointers to them ever
//! exist in Rust. Enums that Rust *sends* to the native side are plain
//! fixed-repr enums. Enums the native side *sends* to Rust arrive as raw
//! integers and are decoded with `TryFrom`, so an unexpected discriminant
//! from a newer native build is a recoverable decode failure instead of
//! undefined behaviour.

use bitflags::bitflags;
use saucer_ffi_primitives::ffi_opaque;

// ============================================================================
// Opaque native objects
// ============================================================================

ffi_opaque! {
    /// Byte buffer owned by the native library.
    pub struct SaucerStash;
    /// Parsed URL.
    pub struct SaucerUrl;
    /// Image used for window icons and page favicons.
    pub struct SaucerIcon;
    /// A pending navigation, only valid inside a navigate callback.
    pub struct SaucerNavigation;
    /// A pending permission prompt.
    pub struct SaucerPermissionRequest;
    /// Incoming request for a custom scheme.
    pub struct SaucerSchemeRequest;
    /// Completion handle for a custom scheme request.
    pub struct SaucerSchemeExecutor;
    /// Response handed to a scheme executor.
    pub struct SaucerSchemeResponse;
    /// A physical display.
    pub struct SaucerScreen;
    pub struct SaucerApplicationOptions;
    pub struct SaucerApplication;
    pub struct SaucerWindow;
    pub struct SaucerWebviewOptions;
    pub struct SaucerWebview;
}

// ============================================================================
// Enums
// ============================================================================

macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $repr:ident {
            $( $(#[$variant_meta:meta])* $variant:ident = $value:expr, )*
        }
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$variant_meta])* $variant = $value, )*
        }

        impl TryFrom<$repr> for $name {
            type Error = $repr;

            fn try_from(value: $repr) -> Result<Self, $repr> {
                $(
                    if value == $value {
                        return Ok(Self::$variant);
                    }
                )*
                Err(value)
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> $repr {
                value as $repr
            }
        }
    };
}

native_enum! {
    /// Outcome returned by handlers that may veto an action.
    pub enum SaucerPolicy: i32 {
        Allow = 0,
        Block = 1,
    }
}

native_enum! {
    /// Whether a handler consumed an event.
    pub enum SaucerStatus: i32 {
        Handled = 0,
        Unhandled = 1,
    }
}

native_enum! {
    /// Page load progress reported by the load event.
    pub enum SaucerState: i32 {
        Started = 0,
        Finished = 1,
    }
}

native_enum! {
    pub enum SaucerWindowDecoration: i32 {
        None = 0,
        Partial = 1,
        Full = 2,
    }
}

native_enum! {
    /// When an injected script runs relative to page load.
    pub enum SaucerScriptTime: i32 {
        Creation = 0,
        Ready = 1,
    }
}

native_enum! {
    pub enum SaucerApplicationEvent: i32 {
        Quit = 0,
    }
}

native_enum! {
    pub enum SaucerWindowEvent: i32 {
        Decorated = 0,
        Maximize = 1,
        Minimize = 2,
        Closed = 3,
        Resize = 4,
        Focus = 5,
        Close = 6,
    }
}

native_enum! {
    pub enum SaucerWebviewEvent: i32 {
        Permission = 0,
        Fullscreen = 1,
        DomReady = 2,
        Navigated = 3,
        Navigate = 4,
        Message = 5,
        Request = 6,
        Favicon = 7,
        Title = 8,
        Load = 9,
    }
}

native_enum! {
    /// Reason a scheme request was rejected. Values mirror HTTP statuses.
    pub enum SaucerSchemeError: i16 {
        NotFound = 404,
        Invalid = 400,
        Denied = 401,
        Failed = -1,
    }
}

// ============================================================================
// Flags
// ============================================================================

// Both types are `#[repr(transparent)]` so they cross the boundary as their
// native `u8`. Bits unknown to this build are kept, not truncated.

bitflags! {
    /// Window edges used by interactive resizing.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SaucerWindowEdge: u8 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
        const TOP_LEFT = Self::TOP.bits() | Self::LEFT.bits();
        const TOP_RIGHT = Self::TOP.bits() | Self::RIGHT.bits();
        const BOTTOM_LEFT = Self::BOTTOM.bits() | Self::LEFT.bits();
        const BOTTOM_RIGHT = Self::BOTTOM.bits() | Self::RIGHT.bits();
    }
}

bitflags! {
    /// Capabilities a page may ask for. An empty set means "unknown".
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SaucerPermissionType: u8 {
        const AUDIO_MEDIA = 1;
        const VIDEO_MEDIA = 2;
        const DESKTOP_MEDIA = 4;
        const MOUSE_LOCK = 8;
        const DEVICE_INFO = 16;
        const LOCATION = 32;
        const CLIPBOARD = 64;
        const NOTIFICATION = 128;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::raw::c_int;

    #[test]
    fn test_enum_decode_known_values() {
        assert_eq!(SaucerState::try_from(1), Ok(SaucerState::Finished));
        assert_eq!(
            SaucerWindowDecoration::try_from(2),
            Ok(SaucerWindowDecoration::Full)
        );
        assert_eq!(SaucerSchemeError::try_from(-1i16), Ok(SaucerSchemeError::Failed));
    }

    #[test]
    fn test_enum_decode_unknown_value_is_returned() {
        assert_eq!(SaucerState::try_from(9), Err(9));
        assert_eq!(SaucerWebviewEvent::try_from(10), Err(10));
    }

    #[test]
    fn test_enum_discriminants_match_native_values() {
        assert_eq!(c_int::from(SaucerWindowEvent::Close), 6);
        assert_eq!(c_int::from(SaucerWebviewEvent::Load), 9);
        assert_eq!(i16::from(SaucerSchemeError::NotFound), 404);
        assert_eq!(c_int::from(SaucerPolicy::Block), 1);
    }

    #[test]
    fn test_edge_combinations() {
        assert!(SaucerWindowEdge::BOTTOM_RIGHT.contains(SaucerWindowEdge::RIGHT));
        assert_eq!(
            SaucerWindowEdge::TOP | SaucerWindowEdge::LEFT,
            SaucerWindowEdge::TOP_LEFT
        );
    }

    #[test]
    fn test_flags_keep_unknown_bits() {
        let edge = SaucerWindowEdge::from_bits_retain(0x40 | 1);
        assert!(edge.contains(SaucerWindowEdge::TOP));
        assert_eq!(edge.bits(), 0x41);
        assert_eq!(std::mem::size_of::<SaucerPermissionType>(), 1);
        assert!(SaucerPermissionType::empty().is_empty());
    }

    #[test]
    fn test_opaque_types_are_unsized_markers() {
        assert_eq!(std::mem::size_of::<SaucerWebview>(), 0);
        assert_eq!(
            std::mem::size_of::<*mut SaucerWebview>(),
            std::mem::size_of::<usize>()
        );
    }
}
