//! Session snapshot
//!
//! A session is never stored by the orchestrator. It is assembled on demand
//! from whatever the OIDC client currently holds.

use serde::{Deserialize, Serialize};

/// Opaque identity claims (decoded ID token or userinfo response).
pub type IdentityClaims = serde_json::Map<String, serde_json::Value>;

/// Read-only view of the current authentication state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_claims: Option<IdentityClaims>,
}

impl Session {
    /// True when no token and no claims are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.id_token.is_none() && self.identity_claims.is_none()
    }

    /// The `sub` claim, when claims are present.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.identity_claims.as_ref()?.get("sub")?.as_str()
    }
}
