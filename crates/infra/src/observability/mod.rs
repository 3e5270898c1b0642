//! Tracing subscriber setup
//!
//! `RUST_LOG` selects the filter; `info` when unset.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// `json` switches the fmt layer to newline-delimited JSON. Returns `false`
/// when a subscriber was already installed (the existing one is kept).
pub fn init_tracing(json: bool) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter());

    let installed = if json {
        registry.with(tracing_subscriber::fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_target(true)).try_init()
    };

    installed.is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
