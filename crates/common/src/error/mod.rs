//! Error classification
//!
//! Gangway error types implement [`ErrorClassification`] so retry decisions
//! and log levels are made the same way everywhere.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Silent refresh needs the user at the provider |
//! | **Warning** | Degraded but operational | Timeouts, transient provider failures |
//! | **Error** | Failure requiring attention | Bad configuration, rejected discovery document |
//! | **Critical** | Integrity at risk | Internal invariant violations |
//!
//! Module-specific errors classify themselves next to their definition:
//!
//! ```rust,ignore
//! impl ErrorClassification for StoreError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Locked)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         ErrorSeverity::Warning
//!     }
//! }
//! ```

use std::fmt;

use gangway_domain::GangwayError;

/// Standard interface for classifying errors by retryability and severity.
pub trait ErrorClassification {
    /// Transient failures that may succeed if attempted again.
    fn is_retryable(&self) -> bool;

    /// Used for log level decisions.
    fn severity(&self) -> ErrorSeverity;
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl ErrorClassification for GangwayError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Network(_) | Self::Auth(_) => ErrorSeverity::Warning,
            Self::SilentRefresh(failure) if failure.requires_interaction() => ErrorSeverity::Info,
            Self::Config(_)
            | Self::Discovery(_)
            | Self::SilentRefresh(_)
            | Self::Storage(_)
            | Self::Navigation(_) => ErrorSeverity::Error,
            Self::Internal(_) => ErrorSeverity::Critical,
        }
    }
}
