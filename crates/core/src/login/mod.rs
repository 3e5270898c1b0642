//! Login orchestration
//!
//! [`LoginOrchestrator`] decides on every application start whether the
//! user is already authenticated, can be silently re-authenticated, or
//! must be sent to the identity provider.

pub mod classification;
pub mod observer;
pub mod orchestrator;
pub mod ports;

pub use orchestrator::LoginOrchestrator;
