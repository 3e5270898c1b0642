//! Scripted collaborators for orchestrator tests.
//!
//! Every mock records its calls into one shared [`CallLog`] so tests can
//! assert ordering across collaborators.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gangway_common::events::EventRegistry;
use gangway_common::testing::{CallLog, MemorySessionStore};
use gangway_core::{LoginOrchestrator, Navigator, OidcClient, SessionStore};
use gangway_domain::{
    AuthConfig, DiscoveryDocument, GangwayError, IdentityClaims, LoginAttemptResult,
    LoginFailure, LoginSuccess, OAuthEvent, Result,
};
use parking_lot::Mutex;
use serde_json::json;
use url::Url;

pub const ISSUER: &str = "https://idp.example.com/realms/gangway";

pub fn test_config() -> AuthConfig {
    AuthConfig::new(ISSUER, "gangway-spa", "http://localhost:4200/").unwrap()
}

pub fn discovery_document() -> DiscoveryDocument {
    DiscoveryDocument {
        issuer: ISSUER.to_string(),
        authorization_endpoint: format!("{ISSUER}/protocol/openid-connect/auth"),
        token_endpoint: Some(format!("{ISSUER}/protocol/openid-connect/token")),
        userinfo_endpoint: Some(format!("{ISSUER}/protocol/openid-connect/userinfo")),
        end_session_endpoint: None,
        jwks_uri: None,
        response_types_supported: vec!["id_token token".to_string()],
        scopes_supported: Vec::new(),
    }
}

/// OIDC client whose every answer is set up front.
pub struct ScriptedClient {
    log: CallLog,
    bus: Arc<EventRegistry<OAuthEvent>>,
    discovery: Mutex<Result<DiscoveryDocument>>,
    try_login: Mutex<LoginAttemptResult>,
    try_login_events: Mutex<Vec<OAuthEvent>>,
    valid_token: AtomicBool,
    silent_refresh: Mutex<LoginAttemptResult>,
    implicit_flow: Mutex<Result<()>>,
    access_token: Mutex<Option<String>>,
    claims: Mutex<Option<IdentityClaims>>,
    configured: Mutex<Option<Arc<AuthConfig>>>,
}

impl ScriptedClient {
    fn new(log: CallLog, bus: Arc<EventRegistry<OAuthEvent>>) -> Self {
        Self {
            log,
            bus,
            discovery: Mutex::new(Ok(discovery_document())),
            try_login: Mutex::new(Ok(LoginSuccess::NothingToProcess)),
            try_login_events: Mutex::new(Vec::new()),
            valid_token: AtomicBool::new(false),
            silent_refresh: Mutex::new(Ok(LoginSuccess::SessionEstablished)),
            implicit_flow: Mutex::new(Ok(())),
            access_token: Mutex::new(None),
            claims: Mutex::new(None),
            configured: Mutex::new(None),
        }
    }

    pub fn fail_discovery(&self, message: &str) {
        self.discovery_fails_with(GangwayError::Discovery(message.to_string()));
    }

    pub fn discovery_fails_with(&self, err: GangwayError) {
        *self.discovery.lock() = Err(err);
    }

    pub fn try_login_returns(&self, result: LoginAttemptResult) {
        *self.try_login.lock() = result;
    }

    /// Events published while the login response is processed.
    pub fn emit_during_try_login(&self, events: Vec<OAuthEvent>) {
        *self.try_login_events.lock() = events;
    }

    pub fn set_valid_token(&self, valid: bool) {
        self.valid_token.store(valid, Ordering::SeqCst);
        *self.access_token.lock() = valid.then(|| "cached-access-token".to_string());
    }

    pub fn silent_refresh_fails(&self, failure: LoginFailure) {
        *self.silent_refresh.lock() = Err(failure);
    }

    pub fn fail_implicit_flow(&self, message: &str) {
        *self.implicit_flow.lock() = Err(GangwayError::Navigation(message.to_string()));
    }

    pub fn configured(&self) -> Option<Arc<AuthConfig>> {
        self.configured.lock().clone()
    }
}

#[async_trait]
impl OidcClient for ScriptedClient {
    fn configure(&self, config: Arc<AuthConfig>) {
        self.log.record("configure");
        *self.configured.lock() = Some(config);
    }

    async fn load_discovery_document(&self) -> Result<DiscoveryDocument> {
        self.log.record("load_discovery_document");
        self.discovery.lock().clone()
    }

    async fn try_login(&self) -> LoginAttemptResult {
        self.log.record("try_login");
        let events = std::mem::take(&mut *self.try_login_events.lock());
        for event in &events {
            self.bus.publish(event);
        }
        self.try_login.lock().clone()
    }

    fn has_valid_access_token(&self) -> bool {
        self.log.record("has_valid_access_token");
        self.valid_token.load(Ordering::SeqCst)
    }

    async fn silent_refresh(&self) -> LoginAttemptResult {
        self.log.record("silent_refresh");
        let result = self.silent_refresh.lock().clone();
        if result.is_ok() {
            *self.access_token.lock() = Some("refreshed-access-token".to_string());
            self.valid_token.store(true, Ordering::SeqCst);
            self.bus.publish(&OAuthEvent::token_received());
        }
        result
    }

    async fn init_implicit_flow(&self) -> Result<()> {
        self.log.record("init_implicit_flow");
        self.implicit_flow.lock().clone()
    }

    async fn log_out(&self) -> Result<()> {
        self.log.record("log_out");
        *self.access_token.lock() = None;
        *self.claims.lock() = None;
        self.valid_token.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn setup_automatic_silent_refresh(&self) {
        self.log.record("setup_automatic_silent_refresh");
    }

    async fn load_user_profile(&self) -> Result<IdentityClaims> {
        self.log.record("load_user_profile");
        let claims = match json!({ "sub": "alice", "email": "alice@example.com" }) {
            serde_json::Value::Object(map) => map,
            _ => IdentityClaims::new(),
        };
        *self.claims.lock() = Some(claims.clone());
        Ok(claims)
    }

    fn access_token(&self) -> Option<String> {
        self.access_token.lock().clone()
    }

    fn id_token(&self) -> Option<String> {
        None
    }

    fn identity_claims(&self) -> Option<IdentityClaims> {
        self.claims.lock().clone()
    }
}

/// Session store recording `clear` into the shared log.
pub struct RecordingStore {
    log: CallLog,
    pub inner: MemorySessionStore,
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.get(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.log.record("clear");
        self.inner.clear();
        Ok(())
    }
}

/// Navigator that only records.
pub struct RecordingNavigator {
    log: CallLog,
    pub redirects: Mutex<Vec<Url>>,
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn reload(&self) -> Result<()> {
        self.log.record("reload");
        Ok(())
    }

    async fn redirect_to(&self, url: &Url) -> Result<()> {
        self.log.record("redirect_to");
        self.redirects.lock().push(url.clone());
        Ok(())
    }

    fn current_location(&self) -> Option<Url> {
        None
    }

    fn clear_fragment(&self) {}
}

/// Wired-up collaborators plus the shared call log.
pub struct Harness {
    pub log: CallLog,
    pub bus: Arc<EventRegistry<OAuthEvent>>,
    pub client: Arc<ScriptedClient>,
    pub store: Arc<RecordingStore>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new() -> Self {
        let log = CallLog::new();
        let bus = Arc::new(EventRegistry::new());
        Self {
            client: Arc::new(ScriptedClient::new(log.clone(), Arc::clone(&bus))),
            store: Arc::new(RecordingStore { log: log.clone(), inner: MemorySessionStore::new() }),
            navigator: Arc::new(RecordingNavigator { log: log.clone(), redirects: Mutex::new(Vec::new()) }),
            bus,
            log,
        }
    }

    pub fn orchestrator(&self) -> LoginOrchestrator {
        LoginOrchestrator::new(
            test_config(),
            self.client.clone(),
            self.bus.clone(),
            self.store.clone(),
            self.navigator.clone(),
        )
    }
}

/// Shared in-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Lines mentioning `needle`.
    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        self.contents().lines().filter(|l| l.contains(needle)).map(str::to_string).collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
