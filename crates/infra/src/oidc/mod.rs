//! Reference OpenID Connect client
//!
//! [`StandardOidcClient`] implements the core `OidcClient` port over HTTP:
//! implicit-flow callback processing, refresh-token based silent refresh,
//! end-session logout and the userinfo endpoint. Tokens and claims are
//! persisted through the `SessionStore` port under the keys below.

pub mod client;
pub mod discovery;
pub mod error;
pub mod fragment;
pub mod nonce;
mod token_manager;

pub use client::StandardOidcClient;
pub use discovery::HttpDiscoveryLoader;
pub use error::OidcError;
pub use fragment::CallbackParams;

/// JSON-encoded [`TokenSet`](gangway_domain::TokenSet).
pub const KEY_TOKENS: &str = "gangway.tokens";
/// JSON-encoded identity claims.
pub const KEY_IDENTITY_CLAIMS: &str = "gangway.identity_claims";
/// `state` sent with the pending authorization request.
pub const KEY_PENDING_STATE: &str = "gangway.pending_state";
/// `nonce` sent with the pending authorization request.
pub const KEY_PENDING_NONCE: &str = "gangway.pending_nonce";
