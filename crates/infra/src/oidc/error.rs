//! Errors raised by the reference OIDC client.

use gangway_domain::constants::ERROR_LOGIN_REQUIRED;
use gangway_domain::{FailureReason, GangwayError, LoginFailure};
use thiserror::Error;

/// OIDC client failure.
#[derive(Debug, Error)]
pub enum OidcError {
    /// The provider answered with an OAuth error response.
    #[error("OAuth error: {0}")]
    Provider(FailureReason),

    #[error("state mismatch: expected {expected}, received {received}")]
    StateMismatch { expected: String, received: String },

    /// A callback arrived with no authorization request outstanding.
    #[error("no pending authorization request")]
    NoPendingRequest,

    #[error("no refresh token available")]
    NoRefreshToken,

    #[error("discovery document not loaded")]
    DiscoveryNotLoaded,

    #[error("provider does not advertise a {0} endpoint")]
    MissingEndpoint(&'static str),

    #[error("client used before configure()")]
    NotConfigured,

    #[error("no access token available")]
    NotAuthenticated,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error(transparent)]
    Gangway(#[from] GangwayError),
}

impl OidcError {
    /// Convert into a login-attempt failure.
    ///
    /// Provider errors keep their code. A missing refresh token maps to
    /// `login_required` since only an interactive login can issue one.
    /// Everything else carries no reason.
    #[must_use]
    pub fn into_login_failure(self) -> LoginFailure {
        match self {
            Self::Provider(reason) => LoginFailure::with_reason(reason),
            Self::NoRefreshToken => LoginFailure::with_reason(
                FailureReason::new(ERROR_LOGIN_REQUIRED)
                    .with_description("no refresh token available"),
            ),
            Self::StateMismatch { .. } => LoginFailure::with_reason(
                FailureReason::new("invalid_state").with_description("state parameter mismatch"),
            ),
            _ => LoginFailure::without_reason(),
        }
    }
}

impl From<OidcError> for GangwayError {
    fn from(err: OidcError) -> Self {
        let message = err.to_string();
        match err {
            OidcError::Gangway(inner) => inner,
            OidcError::NotConfigured => Self::Config(message),
            OidcError::DiscoveryNotLoaded | OidcError::MissingEndpoint(_) => {
                Self::Discovery(message)
            }
            _ => Self::Auth(message),
        }
    }
}
