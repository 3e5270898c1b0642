//! OAuth lifecycle events
//!
//! The OIDC client publishes an [`OAuthEvent`] for every notable lifecycle
//! step. Subscribers filter on [`OAuthEvent::event_type`] and route on
//! [`OAuthEvent::is_error`].

use serde::{Deserialize, Serialize};

use crate::constants::EVENT_TOKEN_RECEIVED;

/// Tagged event emitted on the OAuth event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum OAuthEvent {
    /// New tokens were stored.
    TokenReceived,
    /// Error event with diagnostic detail.
    Error {
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// Any other informational event.
    Other { kind: String },
}

impl OAuthEvent {
    #[must_use]
    pub fn token_received() -> Self {
        Self::TokenReceived
    }

    #[must_use]
    pub fn error(kind: impl Into<String>, detail: Option<String>) -> Self {
        Self::Error { kind: kind.into(), detail }
    }

    /// Informational event. A `token_received` kind is normalised to
    /// [`OAuthEvent::TokenReceived`].
    #[must_use]
    pub fn other(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        if kind == EVENT_TOKEN_RECEIVED {
            Self::TokenReceived
        } else {
            Self::Other { kind }
        }
    }

    /// Event type string used for filtering.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::TokenReceived => EVENT_TOKEN_RECEIVED,
            Self::Error { kind, .. } | Self::Other { kind } => kind,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Diagnostic detail carried by error events.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Error { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
