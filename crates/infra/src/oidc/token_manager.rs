//! Background refresh ahead of token expiry
//!
//! Wakes only when the access token enters the refresh threshold (no
//! polling while a fresh token is held). The task holds a weak reference
//! and stops once the client is dropped.

use std::sync::Weak;

use gangway_core::OidcClient;
use gangway_domain::constants::EVENT_TOKEN_EXPIRES;
use gangway_domain::OAuthEvent;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use super::client::{Inner, StandardOidcClient};

/// Re-check interval while unauthenticated, without expiry, or after a
/// failed refresh.
const RECHECK_INTERVAL: Duration = Duration::from_secs(60);

/// What the loop does after waking up.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Refresh,
    Wait(Duration),
}

pub(super) async fn auto_refresh_loop(inner: Weak<Inner>) {
    info!("Starting token auto-refresh background task");

    loop {
        let step = match inner.upgrade() {
            Some(strong) => next_step(&StandardOidcClient::from_inner(strong)),
            None => break,
        };

        match step {
            Step::Wait(duration) => {
                debug!(seconds = duration.as_secs(), "Auto-refresh: sleeping until next check");
                sleep(duration).await;
            }
            Step::Refresh => {
                let Some(strong) = inner.upgrade() else { break };
                let client = StandardOidcClient::from_inner(strong);

                info!("Auto-refresh: token expiring soon, refreshing");
                client.publish(&OAuthEvent::other(EVENT_TOKEN_EXPIRES));
                let refreshed = client.silent_refresh().await;
                let still_due = next_step(&client) == Step::Refresh;
                drop(client);

                if let Err(failure) = refreshed {
                    error!(reason = %failure, "Auto-refresh failed");
                    sleep(RECHECK_INTERVAL).await;
                } else if still_due {
                    // Token lifetime shorter than the threshold.
                    sleep(RECHECK_INTERVAL).await;
                }
            }
        }
    }

    debug!("Auto-refresh task stopped");
}

fn next_step(client: &StandardOidcClient) -> Step {
    let seconds_until_expiry = client.tokens().and_then(|t| t.seconds_until_expiry());
    let step = plan(seconds_until_expiry, client.refresh_threshold_seconds());

    if step == Step::Refresh && !client.has_refresh_token() {
        return Step::Wait(RECHECK_INTERVAL);
    }
    step
}

fn plan(seconds_until_expiry: Option<i64>, threshold_seconds: i64) -> Step {
    let Some(seconds_until_expiry) = seconds_until_expiry else {
        return Step::Wait(RECHECK_INTERVAL);
    };

    let seconds_until_refresh = seconds_until_expiry.saturating_sub(threshold_seconds);
    if seconds_until_refresh <= 0 {
        Step::Refresh
    } else {
        Step::Wait(Duration::from_secs(seconds_until_refresh.unsigned_abs()))
    }
}
