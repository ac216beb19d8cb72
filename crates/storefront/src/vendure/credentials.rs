//! Per-call credentials for backend requests.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use vendure_storefront_core::SessionToken;

/// What a backend call is authenticated with.
///
/// Server-side handlers extract this from the inbound browser request (its
/// `Cookie` header and any `Authorization: Bearer` header); client-side code
/// builds it from the token store. It is always passed explicitly to
/// [`VendureClient::execute`](super::VendureClient::execute).
#[derive(Debug, Clone, Default)]
pub struct UpstreamCredentials {
    /// Inbound `Cookie` header, forwarded as-is.
    pub cookie: Option<HeaderValue>,
    /// Bearer token sent as `Authorization`.
    pub bearer: Option<SessionToken>,
}

impl UpstreamCredentials {
    /// Only a bearer token, if any.
    #[must_use]
    pub fn with_bearer(token: Option<SessionToken>) -> Self {
        Self {
            cookie: None,
            bearer: token,
        }
    }

    /// Read credentials off an inbound request's headers.
    ///
    /// Multiple `Cookie` headers are joined with `"; "` the way HTTP/2
    /// clients split them. Values are handled as bytes, so non-UTF-8 cookies
    /// are forwarded too.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies: Vec<&HeaderValue> = headers.get_all(COOKIE).iter().collect();
        let cookie = match cookies.as_slice() {
            [] => None,
            [one] => Some((*one).clone()),
            many => {
                let joined = many
                    .iter()
                    .map(|v| v.as_bytes())
                    .collect::<Vec<_>>()
                    .join(&b"; "[..]);
                HeaderValue::from_bytes(&joined).ok()
            }
        };

        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(SessionToken::from_bearer);

        Self { cookie, bearer }
    }
}

impl<S> FromRequestParts<S> for UpstreamCredentials
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_headers() {
        let creds = UpstreamCredentials::from_headers(&HeaderMap::new());
        assert!(creds.cookie.is_none());
        assert!(creds.bearer.is_none());
    }

    #[test]
    fn test_single_cookie_passes_through() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=abc; session.sig=def"));
        let creds = UpstreamCredentials::from_headers(&headers);
        assert_eq!(
            creds.cookie.unwrap().to_str().unwrap(),
            "session=abc; session.sig=def"
        );
    }

    #[test]
    fn test_split_cookie_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("b=2"));
        let creds = UpstreamCredentials::from_headers(&headers);
        assert_eq!(creds.cookie.unwrap().to_str().unwrap(), "a=1; b=2");
    }

    #[test]
    fn test_non_utf8_cookie_is_forwarded() {
        let raw = HeaderValue::from_bytes(b"a=\xff").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, raw.clone());
        let creds = UpstreamCredentials::from_headers(&headers);
        assert_eq!(creds.cookie.unwrap(), raw);
    }

    #[test]
    fn test_split_cookie_headers_join_bytes() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_bytes(b"a=\xff").unwrap());
        headers.append(COOKIE, HeaderValue::from_static("b=2"));
        let creds = UpstreamCredentials::from_headers(&headers);
        assert_eq!(creds.cookie.unwrap().as_bytes(), b"a=\xff; b=2");
    }

    #[test]
    fn test_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        let creds = UpstreamCredentials::from_headers(&headers);
        assert_eq!(creds.bearer.unwrap().expose(), "tok");
    }

    #[test]
    fn test_non_bearer_authorization_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        let creds = UpstreamCredentials::from_headers(&headers);
        assert!(creds.bearer.is_none());
    }
}
