//! JSON error envelope shared by every API route.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable error code carried in [`ErrorEnvelope::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request body was missing a field or malformed.
    ValidationError,
    /// The backend rejected the supplied credentials.
    AuthenticationError,
    /// The requested resource does not exist.
    NotFound,
    /// The backend call failed or returned GraphQL errors.
    InternalError,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error body returned by every route: `{success:false, error, message, code}`.
///
/// `error` is safe to show to the shopper; `message` carries the underlying
/// cause for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    /// User-facing message.
    pub error: String,
    /// Developer-facing detail.
    pub message: String,
    /// Machine-readable code.
    pub code: ErrorCode,
}

impl ErrorEnvelope {
    /// Build an error envelope.
    #[must_use]
    pub fn new(error: impl Into<String>, message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
            code,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let envelope = ErrorEnvelope::new(
            "Email required",
            "The email field is required",
            ErrorCode::ValidationError,
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": "Email required",
                "message": "The email field is required",
                "code": "VALIDATION_ERROR",
            })
        );
    }

    #[test]
    fn test_code_serializes_like_as_str() {
        for code in [
            ErrorCode::ValidationError,
            ErrorCode::AuthenticationError,
            ErrorCode::NotFound,
            ErrorCode::InternalError,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::Value::String(code.as_str().to_string()));
        }
    }
}
