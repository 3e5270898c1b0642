//! # Gangway Core
//!
//! Login orchestration policy - no infrastructure dependencies.
//!
//! This crate contains:
//! - The [`LoginOrchestrator`] startup state machine and manual triggers
//! - Port interfaces (traits) for the OIDC client, event bus, session
//!   storage and navigation
//! - Event and error classification
//!
//! ## Architecture Principles
//! - Only depends on `gangway-common` and `gangway-domain`
//! - No HTTP, file system or platform code
//! - All collaborators injected via traits

pub mod login;

pub use login::classification::{classify_event, requires_interaction};
pub use login::ports::{EventBus, EventFilter, EventHandler, Navigator, OidcClient, SessionStore};
pub use login::LoginOrchestrator;
