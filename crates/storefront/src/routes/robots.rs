//! `robots.txt` route handler.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Paths crawlers should skip: the JSON API and shopper-only pages.
const DISALLOWED: &[&str] = &["/api/", "/account/", "/checkout/"];

/// Serve `robots.txt` pointing crawlers at the sitemap.
pub async fn robots(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots_txt(&state.config().site_url),
    )
        .into_response()
}

/// Render the `robots.txt` body for a storefront served at `site_url`.
#[must_use]
pub fn robots_txt(site_url: &str) -> String {
    let mut body = String::from("User-agent: *\nAllow: /\n");
    for path in DISALLOWED {
        body.push_str("Disallow: ");
        body.push_str(path);
        body.push('\n');
    }
    body.push_str("\nSitemap: ");
    body.push_str(site_url.trim_end_matches('/'));
    body.push_str("/sitemap.xml\n");
    body
}
