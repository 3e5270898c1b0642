//! Port interfaces for login orchestration
//!
//! These traits define the boundaries between the orchestration policy and
//! the identity-provider protocol, event transport, local storage and
//! browser-level navigation.

use std::sync::Arc;

use async_trait::async_trait;
use gangway_common::events::{EventRegistry, Subscription};
use gangway_domain::{
    AuthConfig, DiscoveryDocument, IdentityClaims, LoginAttemptResult, OAuthEvent, Result,
};
use url::Url;

/// OpenID Connect client capability.
///
/// Implementations own token storage and must serialize concurrent
/// refreshes (startup refresh and background refresh may overlap).
#[async_trait]
pub trait OidcClient: Send + Sync {
    /// Apply configuration. Called once, before any other operation.
    fn configure(&self, config: Arc<AuthConfig>);

    /// Fetch provider metadata from the configured discovery endpoint.
    async fn load_discovery_document(&self) -> Result<DiscoveryDocument>;

    /// Process a login response present in the current location, if any.
    async fn try_login(&self) -> LoginAttemptResult;

    fn has_valid_access_token(&self) -> bool;

    /// Obtain fresh tokens without user interaction.
    async fn silent_refresh(&self) -> LoginAttemptResult;

    /// Start the interactive implicit flow by navigating away.
    async fn init_implicit_flow(&self) -> Result<()>;

    /// End the local session. Succeeds when there is none.
    async fn log_out(&self) -> Result<()>;

    /// Arm background refresh shortly before token expiry.
    fn setup_automatic_silent_refresh(&self);

    /// Fetch claims from the userinfo endpoint.
    async fn load_user_profile(&self) -> Result<IdentityClaims>;

    fn access_token(&self) -> Option<String>;

    fn id_token(&self) -> Option<String>;

    fn identity_claims(&self) -> Option<IdentityClaims>;
}

/// Observer callback for OAuth events.
pub type EventHandler = Arc<dyn Fn(&OAuthEvent) + Send + Sync>;

/// Predicate selecting which events a filtered observer sees.
pub type EventFilter = Arc<dyn Fn(&OAuthEvent) -> bool + Send + Sync>;

/// Observer registration over OAuth lifecycle events.
pub trait EventBus: Send + Sync {
    fn subscribe(&self, handler: EventHandler) -> Subscription;

    fn subscribe_filtered(&self, filter: EventFilter, handler: EventHandler) -> Subscription;

    fn unsubscribe(&self, subscription: Subscription) -> bool;

    fn publish(&self, event: &OAuthEvent);
}

impl EventBus for EventRegistry<OAuthEvent> {
    fn subscribe(&self, handler: EventHandler) -> Subscription {
        EventRegistry::<OAuthEvent>::subscribe(self, move |event: &OAuthEvent| handler(event))
    }

    fn subscribe_filtered(&self, filter: EventFilter, handler: EventHandler) -> Subscription {
        EventRegistry::<OAuthEvent>::subscribe_filtered(
            self,
            move |event: &OAuthEvent| filter(event),
            move |event: &OAuthEvent| handler(event),
        )
    }

    fn unsubscribe(&self, subscription: Subscription) -> bool {
        EventRegistry::<OAuthEvent>::unsubscribe(self, subscription)
    }

    fn publish(&self, event: &OAuthEvent) {
        EventRegistry::<OAuthEvent>::publish(self, event);
    }
}

/// Persisted key/value session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every entry.
    async fn clear(&self) -> Result<()>;
}

/// Browser-level navigation side effects.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Restart the application.
    async fn reload(&self) -> Result<()>;

    /// Leave the application for `url`.
    async fn redirect_to(&self, url: &Url) -> Result<()>;

    /// Location the application was entered with, including any fragment
    /// carrying a login response.
    fn current_location(&self) -> Option<Url>;

    /// Drop the fragment from the current location once its login response
    /// has been consumed.
    fn clear_fragment(&self);
}

#[cfg(feature = "test-utils")]
#[async_trait]
impl SessionStore for gangway_common::testing::MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(Self::get(self, key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::set(self, key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        Self::remove(self, key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Self::clear(self);
        Ok(())
    }
}
