//! Startup login state machine and manual triggers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gangway_common::error::{ErrorClassification, ErrorSeverity};
use gangway_common::events::Subscription;
use gangway_domain::{
    AuthConfig, BootstrapOutcome, GangwayError, IdentityClaims, LoginState, Result, Session,
};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use super::classification::requires_interaction;
use super::observer::{subscribe_event_logger, subscribe_profile_loader};
use super::ports::{EventBus, Navigator, OidcClient, SessionStore};

/// Drives the login fallback chain: cached token, login response in the
/// current location, silent refresh, interactive redirect.
pub struct LoginOrchestrator {
    config: Arc<AuthConfig>,
    client: Arc<dyn OidcClient>,
    events: Arc<dyn EventBus>,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    state: RwLock<LoginState>,
    bootstrapped: AtomicBool,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl LoginOrchestrator {
    pub fn new(
        config: AuthConfig,
        client: Arc<dyn OidcClient>,
        events: Arc<dyn EventBus>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            client,
            events,
            store,
            navigator,
            state: RwLock::new(LoginState::Init),
            bootstrapped: AtomicBool::new(false),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Run the startup pipeline. Only the first call does anything.
    ///
    /// 1. Configure the client, register the event logger and the profile
    ///    loader, arm background refresh.
    /// 2. Load the discovery document. Failure here is fatal.
    /// 3. Process a login response in the current location. Its outcome is
    ///    ignored.
    /// 4. Stop if a valid access token is present.
    /// 5. Otherwise refresh silently. If that fails with an
    ///    interaction-required code, start the implicit flow.
    ///
    /// Starting the implicit flow counts as success
    /// ([`BootstrapOutcome::RedirectedToLogin`]) even though the user is
    /// not authenticated yet: the application is about to be left and the
    /// next start resumes with a login response.
    ///
    /// # Errors
    /// - [`GangwayError::Internal`] on a second call
    /// - the discovery error when provider metadata cannot be loaded
    /// - [`GangwayError::SilentRefresh`] when silent refresh fails with a
    ///   code a redirect cannot resolve, or with no code at all
    /// - the navigation error when the redirect cannot be started
    #[instrument(skip(self), fields(issuer = %self.config.issuer()))]
    pub async fn bootstrap(&self) -> Result<BootstrapOutcome> {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            return Err(GangwayError::Internal("already bootstrapped".to_string()));
        }

        self.client.configure(Arc::clone(&self.config));
        {
            let mut subscriptions = self.subscriptions.lock();
            subscriptions.push(subscribe_event_logger(self.events.as_ref()));
            subscriptions
                .push(subscribe_profile_loader(self.events.as_ref(), Arc::clone(&self.client)));
        }
        self.client.setup_automatic_silent_refresh();

        match self.run_fallback_chain().await {
            Ok(outcome) => {
                info!(outcome = ?outcome, "login bootstrap complete");
                Ok(outcome)
            }
            Err(err) => {
                self.set_state(LoginState::Failed);
                log_bootstrap_failure(&err);
                Err(err)
            }
        }
    }

    async fn run_fallback_chain(&self) -> Result<BootstrapOutcome> {
        let document = self.client.load_discovery_document().await?;
        debug!(issuer = %document.issuer, "discovery document loaded");
        self.set_state(LoginState::DiscoveryLoaded);

        match self.client.try_login().await {
            Ok(success) => debug!(result = ?success, "login response processed"),
            Err(failure) => debug!(reason = %failure, "no usable login response"),
        }
        self.set_state(LoginState::HashLoginAttempted);

        if self.client.has_valid_access_token() {
            self.set_state(LoginState::TokenValid);
            return Ok(BootstrapOutcome::AlreadyAuthenticated);
        }

        let refreshed = self.client.silent_refresh().await;
        self.set_state(LoginState::SilentRefreshAttempted);

        match refreshed {
            Ok(_) => Ok(BootstrapOutcome::SilentlyRefreshed),
            Err(failure) if requires_interaction(&failure) => {
                info!(reason = %failure, "interaction required, redirecting to identity provider");
                self.client.init_implicit_flow().await?;
                self.set_state(LoginState::RedirectTriggered);
                Ok(BootstrapOutcome::RedirectedToLogin)
            }
            Err(failure) => Err(GangwayError::SilentRefresh(failure)),
        }
    }

    /// Start the interactive login flow.
    ///
    /// # Errors
    /// Propagates the client's navigation error.
    pub async fn login(&self) -> Result<()> {
        self.client.init_implicit_flow().await?;
        self.set_state(LoginState::RedirectTriggered);
        Ok(())
    }

    /// End the session. Succeeds when no session exists.
    ///
    /// # Errors
    /// Propagates the client's logout error.
    pub async fn logout(&self) -> Result<()> {
        self.client.log_out().await
    }

    /// Refresh tokens on demand. Returns whether new tokens were obtained.
    /// A failure is logged and never triggers a redirect.
    ///
    /// # Errors
    /// None at present. Refresh failures surface as `Ok(false)`.
    pub async fn refresh(&self) -> Result<bool> {
        match self.client.silent_refresh().await {
            Ok(_) => Ok(true),
            Err(failure) => {
                warn!(reason = %failure, "manual refresh failed");
                Ok(false)
            }
        }
    }

    /// Restart the application.
    ///
    /// # Errors
    /// Propagates the navigator's error.
    pub async fn reload(&self) -> Result<()> {
        self.navigator.reload().await
    }

    /// Wipe all persisted session state, then restart the application.
    ///
    /// # Errors
    /// Returns the storage error without reloading if clearing fails.
    pub async fn reset(&self) -> Result<()> {
        self.store.clear().await?;
        self.navigator.reload().await
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.client.access_token()
    }

    #[must_use]
    pub fn id_token(&self) -> Option<String> {
        self.client.id_token()
    }

    #[must_use]
    pub fn identity_claims(&self) -> Option<IdentityClaims> {
        self.client.identity_claims()
    }

    /// Snapshot of what the client currently holds.
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            access_token: self.access_token(),
            id_token: self.id_token(),
            identity_claims: self.identity_claims(),
        }
    }

    #[must_use]
    pub fn state(&self) -> LoginState {
        *self.state.read()
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn set_state(&self, next: LoginState) {
        let mut state = self.state.write();
        debug!(from = %*state, to = %next, "login state transition");
        *state = next;
    }
}

fn log_bootstrap_failure(err: &GangwayError) {
    match err.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => {
            error!(error = %err, "login bootstrap failed");
        }
        ErrorSeverity::Warning => warn!(error = %err, "login bootstrap failed"),
        ErrorSeverity::Info => info!(error = %err, "login bootstrap failed"),
    }
}

impl Drop for LoginOrchestrator {
    fn drop(&mut self) {
        for subscription in self.subscriptions.get_mut().drain(..) {
            self.events.unsubscribe(subscription);
        }
    }
}
