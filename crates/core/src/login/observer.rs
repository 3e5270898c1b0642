//! Event bus observers registered at bootstrap

use std::sync::Arc;

use gangway_common::error::ErrorSeverity;
use gangway_common::events::Subscription;
use gangway_domain::constants::EVENT_TOKEN_RECEIVED;
use gangway_domain::OAuthEvent;
use tracing::{debug, error, warn};

use super::classification::classify_event;
use super::ports::{EventBus, OidcClient};

/// Log every event at the level chosen by [`classify_event`].
pub fn subscribe_event_logger(bus: &dyn EventBus) -> Subscription {
    bus.subscribe(Arc::new(log_event))
}

fn log_event(event: &OAuthEvent) {
    match classify_event(event) {
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(event_type = event.event_type(), detail = event.detail(), "oauth event");
        }
        ErrorSeverity::Warning | ErrorSeverity::Info => {
            warn!(event_type = event.event_type(), detail = event.detail(), "oauth event");
        }
    }
}

/// Load the user profile whenever tokens arrive.
///
/// The load runs as a detached task; its outcome never reaches the
/// publisher.
pub fn subscribe_profile_loader(bus: &dyn EventBus, client: Arc<dyn OidcClient>) -> Subscription {
    bus.subscribe_filtered(
        Arc::new(|event: &OAuthEvent| event.event_type() == EVENT_TOKEN_RECEIVED),
        Arc::new(move |_| spawn_profile_load(Arc::clone(&client))),
    )
}

fn spawn_profile_load(client: Arc<dyn OidcClient>) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        warn!("token received outside a tokio runtime, skipping profile load");
        return;
    };

    runtime.spawn(async move {
        match client.load_user_profile().await {
            Ok(claims) => debug!(claims = claims.len(), "user profile loaded"),
            Err(err) => warn!(error = %err, "user profile load failed"),
        }
    });
}
