//! Token set held by the OIDC client
//!
//! The access token, ID token and (when the provider issues one) refresh
//! token, with expiry bookkeeping.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Tokens obtained from a login strategy
///
/// - Optional refresh token (implicit flow never issues one)
/// - Both `expires_in` (duration) and `expires_at` (timestamp)
/// - Optional ID token and granted scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer access token
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (JWT) carrying identity claims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Absolute expiration timestamp (UTC), derived from `expires_in` at
    /// creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes (space-separated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Create a new `TokenSet` with calculated expiration time
    ///
    /// # Arguments
    /// * `access_token` - The access token
    /// * `refresh_token` - Optional refresh token
    /// * `id_token` - Optional ID token
    /// * `expires_in` - Token lifetime in seconds; `<= 0` means no expiry,
    ///   as does a lifetime beyond the representable date range
    /// * `scope` - Optional space-separated scopes
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        id_token: Option<String>,
        expires_in: i64,
        scope: Option<String>,
    ) -> Self {
        let expires_at = if expires_in > 0 { expiry_from_now(expires_in) } else { None };

        Self {
            access_token,
            refresh_token,
            id_token,
            token_type: "Bearer".to_string(),
            expires_in,
            expires_at,
            scope,
        }
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold
    ///
    /// Returns `false` when no expiry is set.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => match expiry_from_now(threshold_seconds) {
                Some(limit) => limit >= expires_at,
                // Out of the date range: any expiry lies before a positive
                // threshold and after a negative one.
                None => threshold_seconds > 0,
            },
            None => false,
        }
    }

    /// A non-empty access token that has not expired.
    #[must_use]
    pub fn has_valid_access_token(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired(0)
    }

    /// Seconds until expiration, `None` when no expiry is set
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }

    /// Keep a previously issued refresh token when a refresh response omits
    /// it (RFC 6749 §6 allows reusing the old one).
    #[must_use]
    pub fn inherit_refresh_token(mut self, previous: Option<&Self>) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.and_then(|p| p.refresh_token.clone());
        }
        self
    }
}

/// `now + seconds`, or `None` when the result is not representable.
fn expiry_from_now(seconds: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(seconds).and_then(|delta| Utc::now().checked_add_signed(delta))
}

/// Token endpoint response (RFC 6749 §5.1)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(
            response.access_token,
            response.refresh_token,
            response.id_token,
            response.expires_in,
            response.scope,
        );
        tokens.token_type = response.token_type;
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_set_creation() {
        let token_set = TokenSet::new(
            "access_token_123".to_string(),
            Some("refresh_token_456".to_string()),
            Some("id_token_789".to_string()),
            3600,
            Some("openid profile email".to_string()),
        );

        assert_eq!(token_set.access_token, "access_token_123");
        assert_eq!(token_set.id_token, Some("id_token_789".to_string()));
        assert!(token_set.expires_at.is_some());
        assert_eq!(token_set.token_type, "Bearer");
        assert!(token_set.has_valid_access_token());
    }

    #[test]
    fn test_token_expiry_check() {
        let token_set = TokenSet::new("access".to_string(), None, None, 3600, None);

        assert!(!token_set.is_expired(300));
        assert!(token_set.is_expired(7200));
    }

    #[test]
    fn test_expired_token_is_not_valid() {
        let mut token_set = TokenSet::new("access".to_string(), None, None, 3600, None);
        token_set.expires_at = Some(Utc::now() - chrono::Duration::seconds(5));

        assert!(!token_set.has_valid_access_token());
    }

    #[test]
    fn test_empty_access_token_is_not_valid() {
        let token_set = TokenSet::new(String::new(), None, None, 3600, None);
        assert!(!token_set.has_valid_access_token());
    }

    #[test]
    fn test_no_expiry_set() {
        let token_set = TokenSet::new("access".to_string(), None, None, 0, None);

        assert!(!token_set.is_expired(300));
        assert!(token_set.seconds_until_expiry().is_none());
        assert!(token_set.has_valid_access_token());
    }

    #[test]
    fn test_unrepresentable_lifetime_has_no_expiry() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":9223372036854775807}"#)
                .unwrap();
        let token_set: TokenSet = response.into();

        assert_eq!(token_set.expires_in, i64::MAX);
        assert!(token_set.expires_at.is_none());
        assert!(token_set.has_valid_access_token());

        // Within TimeDelta's range, past the end of the date range.
        let far = TokenSet::new("access".to_string(), None, None, i64::MAX / 1000 - 1, None);
        assert!(far.expires_at.is_none());
    }

    #[test]
    fn test_huge_threshold_counts_as_expired() {
        let token_set = TokenSet::new("access".to_string(), None, None, 3600, None);

        assert!(token_set.is_expired(i64::MAX));
        assert!(!token_set.is_expired(i64::MIN));
    }

    #[test]
    fn test_seconds_until_expiry() {
        let token_set = TokenSet::new("access".to_string(), None, None, 3600, None);

        let secs = token_set.seconds_until_expiry().unwrap();
        assert!(secs > 3590 && secs <= 3600);
    }

    #[test]
    fn test_inherit_refresh_token() {
        let previous =
            TokenSet::new("old".to_string(), Some("refresh-1".to_string()), None, 3600, None);
        let refreshed = TokenSet::new("new".to_string(), None, None, 3600, None)
            .inherit_refresh_token(Some(&previous));
        assert_eq!(refreshed.refresh_token.as_deref(), Some("refresh-1"));

        let rotated =
            TokenSet::new("new".to_string(), Some("refresh-2".to_string()), None, 3600, None)
                .inherit_refresh_token(Some(&previous));
        assert_eq!(rotated.refresh_token.as_deref(), Some("refresh-2"));
    }

    #[test]
    fn test_token_response_defaults() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":60}"#).unwrap();
        let token_set: TokenSet = response.into();

        assert_eq!(token_set.access_token, "abc");
        assert_eq!(token_set.token_type, "Bearer");
        assert!(token_set.refresh_token.is_none());
        assert!(token_set.expires_at.is_some());
    }
}
