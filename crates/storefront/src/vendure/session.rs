//! Client-side session against the Shop API.
//!
//! The bearer-token half of the auth model: the token lives in a
//! [`TokenStore`], is read on every call and passed explicitly, and is
//! replaced whenever the backend issues a new one.

use serde_json::{Value, json};
use thiserror::Error;
use tracing::instrument;
use vendure_storefront_core::{AuthStatus, CurrentUser};

use super::documents::{self, AuthStatusData, Document, MutationOutcome};
use super::{GraphQLReply, TokenStore, TokenStoreError, UpstreamCredentials, VendureClient, VendureError};

/// Errors from a client-side session call.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Vendure(#[from] VendureError),

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

/// A shopper's session as seen from the client.
pub struct ShopSession<S> {
    client: VendureClient,
    store: S,
}

impl<S: TokenStore> ShopSession<S> {
    #[must_use]
    pub const fn new(client: VendureClient, store: S) -> Self {
        Self { client, store }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Run a document with the stored token attached.
    ///
    /// A token issued in the reply replaces the stored one before the reply
    /// is returned, so the next call already carries it.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or a new token cannot be stored.
    pub async fn query(
        &self,
        document: &Document,
        variables: Value,
    ) -> Result<GraphQLReply, SessionError> {
        let credentials = UpstreamCredentials::with_bearer(self.store.get_token());
        let mut reply = self.client.execute(document, variables, &credentials).await?;

        if let Some(token) = reply.take_auth_token() {
            self.store.set_token(&token)?;
        }

        Ok(reply)
    }

    /// Log in with a username (usually the email address) and password.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or GraphQL failure. Wrong credentials
    /// are not an error; they come back as [`MutationOutcome::Rejected`].
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<MutationOutcome<CurrentUser>, SessionError> {
        let reply = self
            .query(
                &documents::LOGIN,
                json!({
                    "username": username,
                    "password": password,
                    "rememberMe": remember_me,
                }),
            )
            .await?;
        Ok(reply.into_outcome("login")?)
    }

    /// Log out on the backend and forget the stored token.
    ///
    /// The token is cleared even when the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or the storage error if clearing failed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SessionError> {
        let result = self.query(&documents::LOGOUT, json!({})).await;
        self.store.clear_token()?;
        result.map(|_| ())
    }

    /// Fetch the current auth status, degrading instead of failing.
    #[instrument(skip(self))]
    pub async fn auth_status(&self) -> AuthStatus {
        let data = match self.query(&documents::AUTH_STATUS, json!({})).await {
            Ok(reply) => reply.into_data::<AuthStatusData>().map_err(SessionError::from),
            Err(e) => Err(e),
        };

        match data {
            Ok(data) => AuthStatus::new(data.me, data.active_customer, data.active_order),
            Err(e) => {
                tracing::warn!(error = %e, "Auth status check failed");
                AuthStatus::degraded(e.to_string())
            }
        }
    }
}
