//! Vendure Shop API access.
//!
//! # Architecture
//!
//! - One shared [`VendureClient`] per process; every route goes through
//!   [`VendureClient::execute`]
//! - Credentials travel with each call ([`UpstreamCredentials`]); the client
//!   carries no mutable default headers
//! - Backend `Set-Cookie` headers are collected into [`ForwardedCookies`] and
//!   relayed to the browser verbatim
//! - Client-side code persists the bearer token through a [`TokenStore`] and
//!   talks to the backend through a [`ShopSession`]
//!
//! Vendure is the source of truth for customers, sessions and orders. Nothing
//! here is cached or stored server-side.
//!
//! # Example
//!
//! ```rust,ignore
//! use vendure_storefront::vendure::{UpstreamCredentials, VendureClient, documents};
//!
//! let client = VendureClient::new(&config.vendure);
//! let reply = client
//!     .execute(&documents::ACTIVE_ORDER, serde_json::json!({}), &credentials)
//!     .await?;
//! ```

mod client;
pub mod cookies;
mod credentials;
pub mod documents;
mod session;
pub mod token;

pub use client::{GraphQLReply, VendureClient};
pub use cookies::{ForwardedCookies, forward_set_cookies};
pub use credentials::UpstreamCredentials;
pub use session::{SessionError, ShopSession};
pub use token::{FileTokenStore, MemoryTokenStore, NoopTokenStore, TokenStore, TokenStoreError};

use thiserror::Error;

/// Errors that can occur when talking to the Vendure Shop API.
///
/// Variants raised after the backend answered keep its `Set-Cookie`
/// headers; see [`VendureError::take_cookies`].
#[derive(Debug, Error)]
pub enum VendureError {
    /// HTTP transport failed before a response arrived (connection refused,
    /// reset, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response headers arrived but the body could not be read.
    #[error("HTTP error reading response body: {source}")]
    BodyRead {
        source: reqwest::Error,
        cookies: ForwardedCookies,
    },

    /// Non-success status without a GraphQL body.
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
        cookies: ForwardedCookies,
    },

    /// Success status with a body that is not a GraphQL response.
    #[error("Malformed GraphQL response: {source}")]
    Malformed {
        source: serde_json::Error,
        body: String,
        cookies: ForwardedCookies,
    },

    /// GraphQL response carried an `errors` array.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// Response `data` did not have the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response had neither `data` nor `errors`.
    #[error("No data in response")]
    MissingData,
}

impl VendureError {
    /// Move out any `Set-Cookie` values the backend sent with a failed
    /// response, so they can still be relayed.
    pub fn take_cookies(&mut self) -> ForwardedCookies {
        match self {
            Self::BodyRead { cookies, .. }
            | Self::Status { cookies, .. }
            | Self::Malformed { cookies, .. } => std::mem::take(cookies),
            Self::Http(_) | Self::GraphQL(_) | Self::Parse(_) | Self::MissingData => {
                ForwardedCookies::default()
            }
        }
    }
}

/// A GraphQL error returned by the Vendure API.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLError {
    pub message: String,
    pub locations: Vec<GraphQLErrorLocation>,
    pub path: Vec<serde_json::Value>,
    /// Vendure puts its error code under `extensions.code`.
    pub code: Option<String>,
}

/// Location in a GraphQL document where an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(error: graphql_client::Error) -> Self {
        let code = error
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);

        Self {
            message: error.message,
            locations: error.locations.map_or_else(Vec::new, |locs| {
                locs.into_iter()
                    .map(|l| GraphQLErrorLocation {
                        line: i64::from(l.line),
                        column: i64::from(l.column),
                    })
                    .collect()
            }),
            path: error.path.map_or_else(Vec::new, |p| {
                p.into_iter()
                    .map(|fragment| match fragment {
                        graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                        graphql_client::PathFragment::Index(i) => {
                            serde_json::Value::Number(i.into())
                        }
                    })
                    .collect()
            }),
            code,
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if let Some(code) = &e.code {
                parts.push(format!("[{code}]"));
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
