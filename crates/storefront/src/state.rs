//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::vendure::VendureClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Immutable after startup: per-shopper state
/// lives in the browser and in Vendure, never here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    vendure: VendureClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let vendure = VendureClient::new(&config.vendure);

        Self {
            inner: Arc::new(AppStateInner { config, vendure }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Vendure Shop API client.
    #[must_use]
    pub fn vendure(&self) -> &VendureClient {
        &self.inner.vendure
    }
}
