//! # Gangway Infrastructure
//!
//! Infrastructure implementations of the core login ports.
//!
//! This crate contains:
//! - Configuration loading (environment, TOML/JSON files)
//! - The retrying HTTP client
//! - The reference OpenID Connect client and discovery loader
//! - File-backed session storage
//! - The system browser navigator
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `gangway-core`
//! - Depends on `gangway-domain`, `gangway-common` and `gangway-core`
//! - Contains all "impure" code (I/O, network, platform)

pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod oidc;
pub mod platform;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::HttpClient;
pub use observability::init_tracing;
pub use oidc::{HttpDiscoveryLoader, OidcError, StandardOidcClient};
pub use platform::SystemNavigator;
pub use storage::FileSessionStore;
