//! HTTP route handlers for the storefront gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check (added in main)
//! GET  /robots.txt                      - Crawler rules
//!
//! # Auth
//! GET  /api/auth/status                 - Current user, customer and order
//! POST /api/auth/login                  - Log in with email and password
//! POST /api/auth/logout                 - End the Vendure session
//! POST /api/auth/register               - Register a customer account
//! POST /api/auth/verify                 - Verify an account
//! POST /api/auth/resend-verification    - Resend the verification email
//!
//! # Cart
//! GET  /api/cart                        - Active order
//! POST /api/cart/add                    - Add a variant
//! POST /api/cart/adjust                 - Change a line's quantity
//! POST /api/cart/remove                 - Remove a line
//! ```

pub mod auth;
pub mod cart;
pub mod robots;

use axum::{
    Router,
    extract::FromRequest,
    http::Uri,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections use the standard error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Trimmed value, or `None` when missing or blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(auth::status))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
        .route("/verify", post(auth::verify))
        .route("/resend-verification", post(auth::resend_verification))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/adjust", post(cart::adjust))
        .route("/remove", post(cart::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/robots.txt", get(robots::robots))
        .nest("/api/auth", auth_routes())
        .nest("/api/cart", cart_routes())
        .fallback(not_found)
}

/// Unmatched paths answer with the error envelope.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        path: uri.path().to_string(),
    }
}
