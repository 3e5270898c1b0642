//! Domain constants
//!
//! Event type names, OpenID Connect error codes and configuration defaults
//! shared by every Gangway crate.

// OpenID Connect Core 1.0 §3.1.2.6 error codes that only an interactive
// login can resolve.
pub const ERROR_INTERACTION_REQUIRED: &str = "interaction_required";
pub const ERROR_LOGIN_REQUIRED: &str = "login_required";
pub const ERROR_ACCOUNT_SELECTION_REQUIRED: &str = "account_selection_required";
pub const ERROR_CONSENT_REQUIRED: &str = "consent_required";

/// Silent-refresh error codes that are resolved by redirecting the user to
/// the identity provider.
pub const INTERACTION_REQUIRED_ERRORS: [&str; 4] = [
    ERROR_INTERACTION_REQUIRED,
    ERROR_LOGIN_REQUIRED,
    ERROR_ACCOUNT_SELECTION_REQUIRED,
    ERROR_CONSENT_REQUIRED,
];

// Event types emitted on the OAuth event bus
pub const EVENT_TOKEN_RECEIVED: &str = "token_received";
pub const EVENT_TOKEN_REFRESHED: &str = "token_refreshed";
pub const EVENT_TOKEN_EXPIRES: &str = "token_expires";
pub const EVENT_TOKEN_ERROR: &str = "token_error";
pub const EVENT_DISCOVERY_LOADED: &str = "discovery_document_loaded";
pub const EVENT_DISCOVERY_LOAD_ERROR: &str = "discovery_document_load_error";
pub const EVENT_SILENT_REFRESH_ERROR: &str = "silent_refresh_error";
pub const EVENT_USER_PROFILE_LOADED: &str = "user_profile_loaded";
pub const EVENT_USER_PROFILE_LOAD_ERROR: &str = "user_profile_load_error";
pub const EVENT_LOGOUT: &str = "logout";

// Configuration defaults
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "profile", "email"];
pub const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 300;
pub const WELL_KNOWN_CONFIGURATION_PATH: &str = ".well-known/openid-configuration";
