//! System browser navigator
//!
//! `redirect_to` hands the URL to the platform's default browser. `reload`
//! has no browser equivalent on the desktop: it is broadcast to the
//! application shell, which restarts its login pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use gangway_core::Navigator;
use gangway_domain::{GangwayError, Result};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};
use url::Url;

const RELOAD_CHANNEL_CAPACITY: usize = 8;

/// Opens URLs with the system handler.
pub type UrlOpener = Arc<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

/// Signal sent to the shell when a reload is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadRequested;

/// [`Navigator`] for desktop shells.
pub struct SystemNavigator {
    opener: UrlOpener,
    reloads: broadcast::Sender<ReloadRequested>,
    location: RwLock<Option<Url>>,
}

impl SystemNavigator {
    /// Navigator opening URLs with the `open` crate.
    #[must_use]
    pub fn new() -> Self {
        Self::with_opener(Arc::new(|url: &str| open::that(url)))
    }

    /// Navigator with a custom opener (tests, embedded webviews).
    #[must_use]
    pub fn with_opener(opener: UrlOpener) -> Self {
        let (reloads, _) = broadcast::channel(RELOAD_CHANNEL_CAPACITY);
        Self { opener, reloads, location: RwLock::new(None) }
    }

    /// Receive reload requests.
    #[must_use]
    pub fn subscribe_reloads(&self) -> broadcast::Receiver<ReloadRequested> {
        self.reloads.subscribe()
    }

    /// Record the location the application was (re)entered with, e.g. the
    /// redirect URI carrying a login response.
    pub fn set_current_location(&self, location: Option<Url>) {
        *self.location.write() = location;
    }
}

impl Default for SystemNavigator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Navigator for SystemNavigator {
    async fn reload(&self) -> Result<()> {
        let receivers = self.reloads.send(ReloadRequested).unwrap_or(0);
        info!(receivers, "Reload requested");
        Ok(())
    }

    async fn redirect_to(&self, url: &Url) -> Result<()> {
        debug!(host = url.host_str().unwrap_or_default(), "Opening URL in system browser");
        (self.opener)(url.as_str()).map_err(|e| {
            GangwayError::Navigation(format!(
                "failed to open {}: {e}",
                url.origin().ascii_serialization()
            ))
        })
    }

    fn current_location(&self) -> Option<Url> {
        self.location.read().clone()
    }

    fn clear_fragment(&self) {
        if let Some(location) = self.location.write().as_mut() {
            location.set_fragment(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[tokio::test]
    async fn redirect_uses_opener() {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&opened);
        let navigator = SystemNavigator::with_opener(Arc::new(move |url: &str| {
            sink.lock().push(url.to_string());
            Ok(())
        }));

        let url = Url::parse("https://idp.example.com/authorize?client_id=spa").unwrap();
        navigator.redirect_to(&url).await.unwrap();

        assert_eq!(*opened.lock(), vec![url.to_string()]);
    }

    #[tokio::test]
    async fn opener_failure_is_navigation_error() {
        let navigator = SystemNavigator::with_opener(Arc::new(|_: &str| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"))
        }));

        let url = Url::parse("https://idp.example.com/authorize").unwrap();
        let err = navigator.redirect_to(&url).await.unwrap_err();

        assert!(matches!(err, GangwayError::Navigation(_)));
    }

    #[tokio::test]
    async fn reload_is_broadcast() {
        let navigator = SystemNavigator::with_opener(Arc::new(|_: &str| Ok(())));
        let mut first = navigator.subscribe_reloads();
        let mut second = navigator.subscribe_reloads();

        navigator.reload().await.unwrap();

        assert_eq!(first.recv().await.unwrap(), ReloadRequested);
        assert_eq!(second.recv().await.unwrap(), ReloadRequested);
    }

    #[tokio::test]
    async fn reload_without_listeners_succeeds() {
        let navigator = SystemNavigator::with_opener(Arc::new(|_: &str| Ok(())));
        navigator.reload().await.unwrap();
    }

    #[test]
    fn current_location_round_trip() {
        let navigator = SystemNavigator::with_opener(Arc::new(|_: &str| Ok(())));
        assert!(navigator.current_location().is_none());

        let url = Url::parse("http://localhost:4200/#access_token=at").unwrap();
        navigator.set_current_location(Some(url.clone()));
        assert_eq!(navigator.current_location(), Some(url));
    }

    #[test]
    fn clear_fragment_keeps_path_and_query() {
        let navigator = SystemNavigator::with_opener(Arc::new(|_: &str| Ok(())));
        navigator.clear_fragment();
        assert!(navigator.current_location().is_none());

        let url = Url::parse("http://localhost:4200/app?tab=1#access_token=at&state=s").unwrap();
        navigator.set_current_location(Some(url));
        navigator.clear_fragment();

        let location = navigator.current_location().unwrap();
        assert_eq!(location.as_str(), "http://localhost:4200/app?tab=1");
        assert!(location.fragment().is_none());
    }
}
