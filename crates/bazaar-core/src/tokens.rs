//! Bearer token types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An access token for authenticated API requests.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token for obtaining new access tokens.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// The access/refresh token pair issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: AccessToken::new(access_token),
            refresh_token: RefreshToken::new(refresh_token),
        }
    }

    /// Apply the result of a refresh exchange.
    ///
    /// The refresh token is only replaced when the server rotated it.
    pub fn rotate(&mut self, access_token: AccessToken, refresh_token: Option<RefreshToken>) {
        self.access_token = access_token;
        if let Some(refresh_token) = refresh_token {
            self.refresh_token = refresh_token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn credential_pair_hides_both_tokens() {
        let pair = CredentialPair::new("access-secret", "refresh-secret");
        let debug = format!("{:?}", pair);
        assert!(!debug.contains("access-secret"));
        assert!(!debug.contains("refresh-secret"));
    }

    #[test]
    fn rotate_keeps_refresh_token_when_not_rotated() {
        let mut pair = CredentialPair::new("a1", "r1");
        pair.rotate(AccessToken::new("a2"), None);
        assert_eq!(pair.access_token.as_str(), "a2");
        assert_eq!(pair.refresh_token.as_str(), "r1");

        pair.rotate(AccessToken::new("a3"), Some(RefreshToken::new("r2")));
        assert_eq!(pair.refresh_token.as_str(), "r2");
    }

    #[test]
    fn credential_pair_uses_camel_case_keys() {
        let pair = CredentialPair::new("a", "r");
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
    }
}
