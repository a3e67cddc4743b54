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

//! Error taxonomy for the host SDK.
//!
//! Construction and decode failures are values. Use after dispose is a
//! programming error: the infallible accessors panic with
//! [`HandleError::UseAfterDispose`]'s message, and only
//! [`NativeHandle::try_address`](saucer_ffi_primitives::NativeHandle::try_address)
//! returns it as a value.

use saucer_ffi_primitives::{CodecError, HandleError};

#[derive(Debug, thiserror::Error)]
pub enum SaucerError {
    #[error(transparent)]
    Handle(#[from] HandleError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("custom scheme '{scheme}' cannot be registered after the first window was created")]
    SchemeRegistrationClosed { scheme: String },
}

pub type Result<T> = std::result::Result<T, SaucerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_error_message() {
        let err: SaucerError = HandleError::Construction {
            entity: "Url",
            code: 2,
        }
        .into();
        assert_eq!(err.to_string(), "native construction of Url failed with code 2");
    }

    #[test]
    fn test_codec_error_converts() {
        let err: SaucerError = CodecError::InteriorNul { position: 3 }.into();
        assert!(matches!(err, SaucerError::Codec(CodecError::InteriorNul { position: 3 })));
    }

    #[test]
    fn test_scheme_closed_message_names_scheme() {
        let err = SaucerError::SchemeRegistrationClosed {
            scheme: "app".to_string(),
        };
        assert!(err.to_string().contains("'app'"));
    }
}
