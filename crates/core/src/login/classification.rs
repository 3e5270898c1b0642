//! Event and failure classification
//!
//! Two decisions live here: how loudly an OAuth event is logged, and
//! whether a failed silent refresh should fall back to an interactive
//! redirect.

use gangway_common::error::ErrorSeverity;
use gangway_domain::{LoginFailure, OAuthEvent};

/// Log severity for an OAuth event: error events at `Error`, everything
/// else at `Warning`.
#[must_use]
pub fn classify_event(event: &OAuthEvent) -> ErrorSeverity {
    if event.is_error() {
        ErrorSeverity::Error
    } else {
        ErrorSeverity::Warning
    }
}

/// Whether a silent refresh failure is resolved by sending the user to the
/// identity provider. Failures without a reason never are.
#[must_use]
pub fn requires_interaction(failure: &LoginFailure) -> bool {
    failure.requires_interaction()
}

#[cfg(test)]
mod tests {
    use gangway_domain::constants::INTERACTION_REQUIRED_ERRORS;

    use super::*;

    #[test]
    fn error_events_log_at_error() {
        let event = OAuthEvent::error("silent_refresh_error", Some("login_required".into()));
        assert_eq!(classify_event(&event), ErrorSeverity::Error);
    }

    #[test]
    fn other_events_log_at_warning() {
        assert_eq!(classify_event(&OAuthEvent::token_received()), ErrorSeverity::Warning);
        assert_eq!(classify_event(&OAuthEvent::other("logout")), ErrorSeverity::Warning);
    }

    #[test]
    fn interaction_codes() {
        for code in INTERACTION_REQUIRED_ERRORS {
            assert!(requires_interaction(&LoginFailure::with_code(code)));
        }
        assert!(!requires_interaction(&LoginFailure::with_code("temporarily_unavailable")));
        assert!(!requires_interaction(&LoginFailure::without_reason()));
    }
}
