//! OpenID Provider metadata
//!
//! Subset of the discovery document (OpenID Connect Discovery 1.0 §3) that
//! the login flows need. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Provider metadata loaded from the discovery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub authorization_endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
    #[serde(default)]
    pub response_types_supported: Vec<String>,
    #[serde(default)]
    pub scopes_supported: Vec<String>,
}

impl DiscoveryDocument {
    /// Compare the advertised issuer with the configured one, ignoring a
    /// trailing slash.
    #[must_use]
    pub fn issuer_matches(&self, expected: &str) -> bool {
        self.issuer.trim_end_matches('/') == expected.trim_end_matches('/')
    }
}
