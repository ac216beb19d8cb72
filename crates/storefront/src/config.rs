//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target a local Vendure dev server.
//!
//! - `VENDURE_API_URL` - Shop API endpoint (falls back to
//!   `NEXT_PUBLIC_VENDURE_API_URL`, default: `http://localhost:3000/shop-api`)
//! - `VENDURE_CHANNEL_TOKEN` - Channel token sent as `vendure-token`
//! - `VENDURE_AUTH_TOKEN_HEADER` - Header carrying issued session tokens
//!   (default: `vendure-auth-token`)
//! - `SITE_URL` - Public URL of the storefront, used in `robots.txt` (falls
//!   back to `NEXT_PUBLIC_SITE_URL`, default: `http://localhost:3001`)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3001)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

const DEFAULT_VENDURE_API_URL: &str = "http://localhost:3000/shop-api";
const DEFAULT_SITE_URL: &str = "http://localhost:3001";
const DEFAULT_AUTH_TOKEN_HEADER: &str = "vendure-auth-token";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront, without trailing slash
    pub site_url: String,
    /// Vendure Shop API configuration
    pub vendure: VendureConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Vendure Shop API configuration.
#[derive(Debug, Clone)]
pub struct VendureConfig {
    /// GraphQL endpoint of the Shop API
    pub api_url: Url,
    /// Channel token, when the storefront serves a non-default channel
    pub channel_token: Option<String>,
    /// Response header in which Vendure returns bearer session tokens
    pub auth_token_header: HeaderName,
}

impl VendureConfig {
    /// Configuration pointing at `api_url` with every other setting default.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            channel_token: None,
            auth_token_header: HeaderName::from_static(DEFAULT_AUTH_TOKEN_HEADER),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("STOREFRONT_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = env.parse_or("STOREFRONT_PORT", 3001_u16)?;

        let site_url = env
            .first_of(&["SITE_URL", "NEXT_PUBLIC_SITE_URL"])
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let (api_url_key, api_url) = env
            .first_of_keyed(&["VENDURE_API_URL", "NEXT_PUBLIC_VENDURE_API_URL"])
            .unwrap_or(("VENDURE_API_URL", DEFAULT_VENDURE_API_URL.to_string()));
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar(api_url_key.to_string(), e.to_string()))?;

        let auth_token_header = match env.get("VENDURE_AUTH_TOKEN_HEADER") {
            Some(name) => HeaderName::try_from(name.as_str()).map_err(|e| {
                ConfigError::InvalidEnvVar("VENDURE_AUTH_TOKEN_HEADER".to_string(), e.to_string())
            })?,
            None => HeaderName::from_static(DEFAULT_AUTH_TOKEN_HEADER),
        };

        let vendure = VendureConfig {
            api_url,
            channel_token: env.get("VENDURE_CHANNEL_TOKEN"),
            auth_token_header,
        };

        let sentry_sample_rate = env.parse_or("SENTRY_SAMPLE_RATE", 1.0_f32)?;
        let sentry_traces_sample_rate = env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?;
        for (key, rate) in [
            ("SENTRY_SAMPLE_RATE", sentry_sample_rate),
            ("SENTRY_TRACES_SAMPLE_RATE", sentry_traces_sample_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    format!("must be between 0.0 and 1.0 (got {rate})"),
                ));
            }
        }

        Ok(Self {
            host,
            port,
            site_url,
            vendure,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup that treats blank values as unset.
struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn first_of(&self, keys: &[&str]) -> Option<String> {
        self.first_of_keyed(keys).map(|(_, value)| value)
    }

    fn first_of_keyed<'k>(&self, keys: &[&'k str]) -> Option<(&'k str, String)> {
        keys.iter()
            .find_map(|key| self.get(key).map(|value| (*key, value)))
    }

    /// Parse `key` if set, otherwise fall back to `default`.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}
