//! Auth status snapshot served to the front end.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The authenticated Vendure user (`me`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub identifier: String,
}

/// The customer record attached to the session (`activeCustomer`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email_address: String,
}

/// Derived view of the current session, recomputed on every request.
///
/// `active_order` is kept as raw JSON: the order shape belongs to the backend
/// and the front end renders it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub user: Option<CurrentUser>,
    pub customer: Option<Customer>,
    pub active_order: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthStatus {
    /// Build a snapshot from the backend's answers.
    ///
    /// The session counts as authenticated exactly when `me` resolved.
    #[must_use]
    pub const fn new(
        user: Option<CurrentUser>,
        customer: Option<Customer>,
        active_order: Option<Value>,
    ) -> Self {
        Self {
            is_authenticated: user.is_some(),
            user,
            customer,
            active_order,
            error: None,
        }
    }

    /// Snapshot returned when the backend could not be asked.
    #[must_use]
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            is_authenticated: false,
            user: None,
            customer: None,
            active_order: None,
            error: Some(error.into()),
        }
    }
}
