//! Login attempt results
//!
//! Every login strategy (hash-fragment login, silent refresh) produces a
//! [`LoginAttemptResult`]. Failures carry an optional OAuth-style reason so
//! callers can decide whether user interaction would resolve them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::INTERACTION_REQUIRED_ERRORS;

/// Outcome of a single login strategy step.
pub type LoginAttemptResult = Result<LoginSuccess, LoginFailure>;

/// Success marker for a login strategy step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginSuccess {
    /// Tokens were obtained or confirmed during this step.
    SessionEstablished,
    /// There was nothing to process, e.g. no callback fragment in the URL.
    NothingToProcess,
}

/// OAuth error payload attached to a failed attempt.
///
/// Mirrors the RFC 6749 §5.2 error response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl FailureReason {
    /// Create a reason carrying only an error code.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), error_description: None }
    }

    /// Attach a human readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.error_description = Some(description.into());
        self
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Failed login attempt.
///
/// `reason` is absent when the failure did not come from the identity
/// provider (transport errors, timeouts, missing configuration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

impl LoginFailure {
    #[must_use]
    pub fn with_reason(reason: FailureReason) -> Self {
        Self { reason: Some(reason) }
    }

    /// Shorthand for a failure carrying just an error code.
    #[must_use]
    pub fn with_code(error: impl Into<String>) -> Self {
        Self::with_reason(FailureReason::new(error))
    }

    #[must_use]
    pub fn without_reason() -> Self {
        Self { reason: None }
    }

    /// The `reason.error` code, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.reason.as_ref().map(|r| r.error.as_str())
    }

    /// Whether only explicit user interaction at the identity provider can
    /// resolve this failure.
    ///
    /// A failure without a reason is never interaction-required.
    #[must_use]
    pub fn requires_interaction(&self) -> bool {
        self.error_code().is_some_and(|code| INTERACTION_REQUIRED_ERRORS.contains(&code))
    }
}

impl fmt::Display for LoginFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{reason}"),
            None => write!(f, "no reason given"),
        }
    }
}

impl std::error::Error for LoginFailure {}
