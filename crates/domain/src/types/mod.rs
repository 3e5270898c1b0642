//! Domain types and models

pub mod discovery;
pub mod event;
pub mod login;
pub mod session;
pub mod state;
pub mod token;

pub use discovery::DiscoveryDocument;
pub use event::OAuthEvent;
pub use login::{FailureReason, LoginAttemptResult, LoginFailure, LoginSuccess};
pub use session::{IdentityClaims, Session};
pub use state::{BootstrapOutcome, LoginState};
pub use token::{TokenResponse, TokenSet};
