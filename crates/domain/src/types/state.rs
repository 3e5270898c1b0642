//! Login orchestration states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named states of the startup login pipeline.
///
/// Transitions run strictly forward:
///
/// ```text
/// Init ─► DiscoveryLoaded ─► HashLoginAttempted ─┬─► TokenValid
///   │                                            └─► SilentRefreshAttempted ─┬─► RedirectTriggered
///   └──────────────────────────► Failed ◄────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    #[default]
    Init,
    DiscoveryLoaded,
    HashLoginAttempted,
    TokenValid,
    SilentRefreshAttempted,
    RedirectTriggered,
    Failed,
}

impl LoginState {
    /// Whether the pipeline has settled in this state.
    ///
    /// `SilentRefreshAttempted` is terminal only when the refresh succeeded;
    /// the orchestrator never leaves it in that case.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::TokenValid | Self::SilentRefreshAttempted | Self::RedirectTriggered | Self::Failed
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::DiscoveryLoaded => "discovery_loaded",
            Self::HashLoginAttempted => "hash_login_attempted",
            Self::TokenValid => "token_valid",
            Self::SilentRefreshAttempted => "silent_refresh_attempted",
            Self::RedirectTriggered => "redirect_triggered",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategy settled a successful bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapOutcome {
    /// A valid access token was present after the hash login step.
    AlreadyAuthenticated,
    /// Silent refresh obtained a new session.
    SilentlyRefreshed,
    /// The user was sent to the identity provider.
    RedirectedToLogin,
}

impl BootstrapOutcome {
    /// The state the pipeline ends in for this outcome.
    #[must_use]
    pub const fn final_state(self) -> LoginState {
        match self {
            Self::AlreadyAuthenticated => LoginState::TokenValid,
            Self::SilentlyRefreshed => LoginState::SilentRefreshAttempted,
            Self::RedirectedToLogin => LoginState::RedirectTriggered,
        }
    }
}
