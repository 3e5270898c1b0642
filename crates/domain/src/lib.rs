//! # Gangway Domain
//!
//! Domain types for OpenID Connect login orchestration.
//!
//! This crate contains:
//! - The immutable [`AuthConfig`] record
//! - Session, token, discovery and event types
//! - Login attempt results and the orchestration state set
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other Gangway crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::{AuthConfig, AuthConfigRecord};
pub use errors::*;
pub use types::*;
