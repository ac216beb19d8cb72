//! Session token type.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Key under which client-side storage keeps the session token.
pub const TOKEN_STORAGE_KEY: &str = "vendure_auth_token";

/// An opaque Vendure session token.
///
/// Issued by the backend on login (via the auth token response header) and
/// presented back as a bearer credential. The structure is never inspected.
/// `Debug` output is redacted so the token cannot leak into logs.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Returns the raw token.
    ///
    /// Only call this at the point the token is written to a header or to
    /// storage.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Parse a token out of an `Authorization: Bearer ...` header value.
    ///
    /// Returns `None` for other schemes or an empty token.
    #[must_use]
    pub fn from_bearer(header: &str) -> Option<Self> {
        let (scheme, token) = header.trim().split_once(' ')?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }
        Some(Self::new(token))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for SessionToken {}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl From<&str> for SessionToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let token = SessionToken::new("abc123secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("abc123secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_from_bearer() {
        let token = SessionToken::from_bearer("Bearer abc").unwrap();
        assert_eq!(token.expose(), "abc");

        let token = SessionToken::from_bearer("bearer   xyz ").unwrap();
        assert_eq!(token.expose(), "xyz");
    }

    #[test]
    fn test_from_bearer_rejects_other_schemes() {
        assert!(SessionToken::from_bearer("Basic dXNlcjpwYXNz").is_none());
        assert!(SessionToken::from_bearer("Bearer ").is_none());
        assert!(SessionToken::from_bearer("abc").is_none());
    }
}
