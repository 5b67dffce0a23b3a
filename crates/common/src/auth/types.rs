//! Credential pair and auth endpoint wire formats.

use serde::{Deserialize, Serialize};

/// Access and refresh credentials for the SIVICOS backend.
///
/// Both fields are opaque bearer strings. The pair is created on successful
/// login or refresh, owned by the session layer, persisted through a
/// [`crate::auth::storage::TokenStore`], and destroyed together on logout or
/// on a failed refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer credential attached to every authenticated request
    pub access_token: String,

    /// Credential exchanged at the refresh endpoint for a new access token
    pub refresh_token: String,
}

impl TokenPair {
    /// Create a new credential pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }

    /// Whether the pair carries a usable access credential.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<LoginResponse> for TokenPair {
    fn from(response: LoginResponse) -> Self {
        Self::new(response.access_token, response.refresh_token)
    }
}

/// Response body of `POST /auth/refresh`.
///
/// Only a new access credential is issued; the refresh credential stays
/// valid until logout or server-side invalidation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_roundtrip() {
        let pair = TokenPair::new("access-1", "refresh-1");
        let json = serde_json::to_string(&pair).unwrap();
        let parsed: TokenPair = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pair);
    }

    #[test]
    fn has_access_token_rejects_empty() {
        assert!(TokenPair::new("access-1", "refresh-1").has_access_token());
        assert!(!TokenPair::new("", "refresh-1").has_access_token());
    }

    #[test]
    fn login_response_uses_camel_case() {
        let json = r#"{"accessToken":"a1","refreshToken":"r1"}"#;
        let parsed: LoginResponse = serde_json::from_str(json).unwrap();
        let pair: TokenPair = parsed.into();
        assert_eq!(pair, TokenPair::new("a1", "r1"));
    }

    #[test]
    fn refresh_response_uses_camel_case() {
        let json = r#"{"accessToken":"a2"}"#;
        let parsed: RefreshResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "a2");
    }
}
