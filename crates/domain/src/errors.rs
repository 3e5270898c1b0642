//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::LoginFailure;

/// Main error type for Gangway
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GangwayError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider metadata could not be fetched or was rejected.
    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// Silent refresh failed with a code that a redirect cannot resolve.
    #[error("Silent refresh failed: {0}")]
    SilentRefresh(LoginFailure),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Gangway operations
pub type Result<T> = std::result::Result<T, GangwayError>;
