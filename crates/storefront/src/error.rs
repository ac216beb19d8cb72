//! Unified error handling with Sentry integration.
//!
//! Every route answers failures with the same JSON envelope,
//! `{success:false, error, message, code}`. Route handlers return
//! `Result<T, AppError>`; [`error_response`] builds the envelope directly
//! where a handler needs a custom status.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use vendure_storefront_core::{ErrorCode, ErrorEnvelope};

use crate::vendure::{ForwardedCookies, VendureError};
use crate::vendure::documents::ErrorResult;

/// Message shown to shoppers when something failed on our side.
const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body missing a field or malformed.
    #[error("Validation error: {message}")]
    Validation { error: String, message: String },

    /// Backend refused the shopper's credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized { error: String, message: String },

    /// Backend answered a mutation with an `ErrorResult`.
    #[error("Rejected by Vendure ({}): {}", .0.error_code, .0.message)]
    Rejected(ErrorResult),

    /// No route matches the request path.
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Vendure call failed or returned GraphQL errors.
    #[error("Vendure error: {0}")]
    Vendure(#[from] VendureError),
}

impl AppError {
    /// A 400 with a shopper-facing `error` and a diagnostic `message`.
    pub fn validation(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Map a backend `ErrorResult`: credential problems become 401, anything
    /// else is the shopper's request being refused.
    #[must_use]
    pub fn from_error_result(result: ErrorResult) -> Self {
        if result.is_authentication_failure() {
            Self::Unauthorized {
                error: result.message,
                message: result.error_code,
            }
        } else {
            Self::Rejected(result)
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Vendure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Envelope code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } | Self::Rejected(_) => ErrorCode::ValidationError,
            Self::Unauthorized { .. } => ErrorCode::AuthenticationError,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Vendure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation("Invalid request body", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(mut self) -> Response {
        // Cookies the backend set on a failed answer still reach the browser
        let cookies = match &mut self {
            Self::Vendure(e) => e.take_cookies(),
            _ => ForwardedCookies::default(),
        };

        // Capture server errors to Sentry
        if matches!(self, Self::Vendure(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let code = self.code();

        // Shoppers get a generic message for server-side failures; the cause
        // stays in `message`.
        let (error, message) = match self {
            Self::Validation { error, message } | Self::Unauthorized { error, message } => {
                (error, message)
            }
            Self::Rejected(result) => (result.message, result.error_code),
            Self::NotFound { path } => ("Not found".to_string(), format!("No route for {path}")),
            other @ Self::Vendure(_) => (GENERIC_ERROR.to_string(), other.to_string()),
        };

        (cookies, error_response(error, message, status, code)).into_response()
    }
}

/// Build the standard JSON error response.
///
/// `error` is shown to the shopper, `message` carries the detail for
/// diagnostics.
pub fn error_response(
    error: impl Into<String>,
    message: impl Into<String>,
    status: StatusCode,
    code: ErrorCode,
) -> Response {
    (status, Json(ErrorEnvelope::new(error, message, code))).into_response()
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}
