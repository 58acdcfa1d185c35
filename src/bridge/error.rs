//! Structured bridge errors.
//!
//! These travel over the wire as `{"code": "...", "message": "..."}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeErrorCode {
    /// A required field is missing or malformed, or a reply had the wrong shape.
    InvalidArguments,
    /// No handler for the method name.
    NotImplemented,
    /// A native resource is not ready, the peer is gone, or permission is required.
    Unavailable,
    /// The call was not answered within the configured timeout.
    Timeout,
}

impl BridgeErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeErrorCode::InvalidArguments => "INVALID_ARGUMENTS",
            BridgeErrorCode::NotImplemented => "NOT_IMPLEMENTED",
            BridgeErrorCode::Unavailable => "UNAVAILABLE",
            BridgeErrorCode::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for BridgeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct BridgeError {
    pub code: BridgeErrorCode,
    pub message: String,
}

impl BridgeError {
    pub fn new(code: BridgeErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCode::InvalidArguments, message)
    }

    pub fn not_implemented(method: &str) -> Self {
        Self::new(
            BridgeErrorCode::NotImplemented,
            format!("method '{}' is not implemented", method),
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(BridgeErrorCode::Unavailable, message)
    }

    pub fn timeout(method: &str) -> Self {
        Self::new(
            BridgeErrorCode::Timeout,
            format!("no reply to '{}' in time", method),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_codes_serialize_screaming_snake_case() {
        for code in [
            BridgeErrorCode::InvalidArguments,
            BridgeErrorCode::NotImplemented,
            BridgeErrorCode::Unavailable,
            BridgeErrorCode::Timeout,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), json!(code.as_str()));
        }
    }

    #[test]
    fn test_error_wire_shape() {
        let err = BridgeError::invalid_arguments("message is required");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"code": "INVALID_ARGUMENTS", "message": "message is required"})
        );
    }

    #[test]
    fn test_display_includes_code() {
        let err = BridgeError::not_implemented("fly");
        assert_eq!(
            err.to_string(),
            "NOT_IMPLEMENTED: method 'fly' is not implemented"
        );
    }
}
