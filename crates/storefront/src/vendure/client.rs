//! Vendure Shop API client implementation.
//!
//! Uses `graphql_client`'s request/response envelopes with `reqwest` for
//! HTTP. Nothing is cached: every call reaches the backend.

use std::sync::Arc;

use graphql_client::QueryBody;
use reqwest::header::{COOKIE, HeaderName};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;
use url::Url;
use vendure_storefront_core::SessionToken;

use super::documents::{Document, MutationOutcome};
use super::{ForwardedCookies, GraphQLError, UpstreamCredentials, VendureError};
use crate::config::VendureConfig;

/// Header selecting a Vendure channel.
const CHANNEL_TOKEN_HEADER: &str = "vendure-token";

/// Longest slice of a response body copied into logs and errors.
const BODY_SNIPPET_CHARS: usize = 500;

// =============================================================================
// VendureClient
// =============================================================================

/// Shared client for the Vendure Shop API.
///
/// Cheap to clone. Holds no per-shopper state: cookies and bearer tokens are
/// supplied on each call.
#[derive(Clone)]
pub struct VendureClient {
    inner: Arc<VendureClientInner>,
}

struct VendureClientInner {
    client: reqwest::Client,
    endpoint: Url,
    channel_token: Option<String>,
    auth_token_header: HeaderName,
}

impl VendureClient {
    /// Create a new Shop API client.
    #[must_use]
    pub fn new(config: &VendureConfig) -> Self {
        Self {
            inner: Arc::new(VendureClientInner {
                client: reqwest::Client::new(),
                endpoint: config.api_url.clone(),
                channel_token: config.channel_token.clone(),
                auth_token_header: config.auth_token_header.clone(),
            }),
        }
    }

    /// Execute a GraphQL document against the Shop API.
    ///
    /// The inbound cookie header and bearer token in `credentials` are
    /// attached as-is. The reply keeps the backend's `errors` array, its
    /// `Set-Cookie` headers and any issued auth token; deciding what an
    /// `errors` array means is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, or if the backend
    /// answers with something that is not a GraphQL response.
    #[instrument(skip(self, variables, credentials), fields(operation = document.operation_name))]
    pub async fn execute(
        &self,
        document: &Document,
        variables: Value,
        credentials: &UpstreamCredentials,
    ) -> Result<GraphQLReply, VendureError> {
        let body = QueryBody {
            variables,
            query: document.source,
            operation_name: document.operation_name,
        };

        let mut request = self
            .inner
            .client
            .post(self.inner.endpoint.as_str())
            .json(&body);

        if let Some(cookie) = &credentials.cookie {
            request = request.header(COOKIE, cookie.clone());
        }
        if let Some(token) = &credentials.bearer {
            request = request.bearer_auth(token.expose());
        }
        if let Some(channel) = &self.inner.channel_token {
            request = request.header(CHANNEL_TOKEN_HEADER, channel);
        }

        let response = request.send().await?;
        let status = response.status();
        let cookies = ForwardedCookies::from_headers(response.headers());
        let auth_token = response
            .headers()
            .get(&self.inner.auth_token_header)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(SessionToken::new);

        let response_text = match response.text().await {
            Ok(text) => text,
            Err(source) => return Err(VendureError::BodyRead { source, cookies }),
        };
        let snippet = || response_text.chars().take(BODY_SNIPPET_CHARS).collect::<String>();

        let parsed: graphql_client::Response<Value> = match serde_json::from_str(&response_text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                tracing::error!(
                    status = %status,
                    body = %snippet(),
                    "Vendure API returned non-success status"
                );
                return Err(VendureError::Status {
                    status,
                    body: snippet(),
                    cookies,
                });
            }
            Err(source) => {
                tracing::error!(
                    error = %source,
                    body = %snippet(),
                    "Failed to parse Vendure GraphQL response"
                );
                return Err(VendureError::Malformed {
                    source,
                    body: snippet(),
                    cookies,
                });
            }
        };

        let errors: Vec<GraphQLError> = parsed
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(GraphQLError::from)
            .collect();

        if !errors.is_empty() {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");
        }

        if parsed.data.is_none() && errors.is_empty() {
            if !status.is_success() {
                return Err(VendureError::Status {
                    status,
                    body: snippet(),
                    cookies,
                });
            }
            tracing::error!(
                body = %snippet(),
                "Vendure GraphQL response has no data and no errors"
            );
        }

        Ok(GraphQLReply {
            data: parsed.data,
            errors,
            cookies,
            auth_token,
        })
    }
}

// =============================================================================
// GraphQLReply
// =============================================================================

/// One Shop API answer: `{data, errors}` plus what the backend set on the
/// HTTP response.
#[derive(Debug)]
pub struct GraphQLReply {
    pub data: Option<Value>,
    pub errors: Vec<GraphQLError>,
    cookies: ForwardedCookies,
    auth_token: Option<SessionToken>,
}

impl GraphQLReply {
    /// Move the cookies out, so they can be forwarded whatever the data
    /// turns out to be.
    pub fn take_cookies(&mut self) -> ForwardedCookies {
        std::mem::take(&mut self.cookies)
    }

    /// Move out the token issued through the auth token header, if any.
    pub fn take_auth_token(&mut self) -> Option<SessionToken> {
        self.auth_token.take()
    }

    /// Deserialize `data`, treating any GraphQL error as failure.
    ///
    /// # Errors
    ///
    /// Returns [`VendureError::GraphQL`] if the reply carried errors,
    /// [`VendureError::MissingData`] if it carried no data, and
    /// [`VendureError::Parse`] if the data has an unexpected shape.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, VendureError> {
        if !self.errors.is_empty() {
            return Err(VendureError::GraphQL(self.errors));
        }
        let data = self.data.ok_or(VendureError::MissingData)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Split the union returned under `field` into success or `ErrorResult`.
    ///
    /// # Errors
    ///
    /// Same as [`into_data`](Self::into_data); a missing or null `field` is
    /// [`VendureError::MissingData`].
    pub fn into_outcome<T: DeserializeOwned>(
        self,
        field: &str,
    ) -> Result<MutationOutcome<T>, VendureError> {
        let mut data: Value = self.into_data()?;
        let value = data
            .get_mut(field)
            .map(Value::take)
            .filter(|v| !v.is_null())
            .ok_or(VendureError::MissingData)?;
        Ok(MutationOutcome::from_value(value)?)
    }
}
