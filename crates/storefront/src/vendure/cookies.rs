//! Relaying backend `Set-Cookie` headers to the browser.
//!
//! Vendure keeps the shopper's session in a cookie it sets on Shop API
//! responses. The gateway never interprets those cookies; it copies every
//! `Set-Cookie` value onto the response it sends back, so the browser's
//! session stays continuous.

use axum::http::{HeaderMap, HeaderValue, header::SET_COOKIE};
use axum::response::{IntoResponseParts, ResponseParts};

/// `Set-Cookie` values collected from one backend response.
///
/// Built fresh for every reply, so cookies never leak from one request into
/// another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedCookies(Vec<HeaderValue>);

impl ForwardedCookies {
    /// Collect every `Set-Cookie` header, in order, from a backend response.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(headers.get_all(SET_COOKIE).iter().cloned().collect())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderValue> {
        self.0.iter()
    }
}

/// Append every collected cookie to an outgoing header map, unmodified.
///
/// Existing `Set-Cookie` headers on the outgoing response are kept.
pub fn forward_set_cookies(outgoing: &mut HeaderMap, cookies: &ForwardedCookies) {
    for value in cookies.iter() {
        outgoing.append(SET_COOKIE, value.clone());
    }
}

impl IntoResponseParts for ForwardedCookies {
    type Error = std::convert::Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        forward_set_cookies(res.headers_mut(), &self);
        Ok(res)
    }
}
