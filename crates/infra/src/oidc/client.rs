//! HTTP implementation of the `OidcClient` port
//!
//! Handles:
//! - Implicit-flow callback processing (`state` and `nonce` checks)
//! - Silent refresh through the `refresh_token` grant
//! - Authorization redirect and end-session logout
//! - Userinfo loading
//! - Background refresh ahead of expiry
//!
//! ID token claims are decoded but signatures are not verified.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use gangway_core::{EventBus, Navigator, OidcClient, SessionStore};
use gangway_domain::constants::{
    DEFAULT_REFRESH_THRESHOLD_SECS, EVENT_DISCOVERY_LOADED, EVENT_DISCOVERY_LOAD_ERROR,
    EVENT_LOGOUT, EVENT_SILENT_REFRESH_ERROR, EVENT_TOKEN_ERROR, EVENT_TOKEN_REFRESHED,
    EVENT_USER_PROFILE_LOADED, EVENT_USER_PROFILE_LOAD_ERROR,
};
use gangway_domain::{
    AuthConfig, DiscoveryDocument, FailureReason, GangwayError, IdentityClaims,
    LoginAttemptResult, LoginSuccess, OAuthEvent, Result, TokenResponse, TokenSet,
};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::discovery::HttpDiscoveryLoader;
use super::error::OidcError;
use super::fragment::CallbackParams;
use super::nonce::{generate_nonce, generate_state, state_matches};
use super::token_manager::auto_refresh_loop;
use super::{KEY_IDENTITY_CLAIMS, KEY_PENDING_NONCE, KEY_PENDING_STATE, KEY_TOKENS};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Reference OIDC client.
///
/// Cheap to clone; clones share tokens, discovery metadata and the
/// refresh guard.
#[derive(Clone)]
pub struct StandardOidcClient {
    inner: Arc<Inner>,
}

pub(super) struct Inner {
    http: HttpClient,
    grant_http: HttpClient,
    discovery_loader: HttpDiscoveryLoader,
    events: Arc<dyn EventBus>,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    config: RwLock<Option<Arc<AuthConfig>>>,
    discovery: RwLock<Option<DiscoveryDocument>>,
    tokens: RwLock<Option<TokenSet>>,
    claims: RwLock<Option<IdentityClaims>>,
    /// Serializes refresh-token grants.
    refresh_guard: tokio::sync::Mutex<()>,
    auto_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.auto_refresh.get_mut().take() {
            handle.abort();
        }
    }
}

impl StandardOidcClient {
    /// # Errors
    /// Returns [`GangwayError::Network`] if an HTTP client cannot be built.
    pub fn new(
        events: Arc<dyn EventBus>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(Inner {
                http: HttpClient::new()?,
                grant_http: HttpClient::single_attempt()?,
                discovery_loader: HttpDiscoveryLoader::new()?,
                events,
                store,
                navigator,
                config: RwLock::new(None),
                discovery: RwLock::new(None),
                tokens: RwLock::new(None),
                claims: RwLock::new(None),
                refresh_guard: tokio::sync::Mutex::new(()),
                auto_refresh: Mutex::new(None),
            }),
        })
    }

    pub(super) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Current token set, if any.
    #[must_use]
    pub fn tokens(&self) -> Option<TokenSet> {
        self.inner.tokens.read().clone()
    }

    /// Loaded provider metadata, if any.
    #[must_use]
    pub fn discovery_document(&self) -> Option<DiscoveryDocument> {
        self.inner.discovery.read().clone()
    }

    pub(super) fn refresh_threshold_seconds(&self) -> i64 {
        self.inner
            .config
            .read()
            .as_ref()
            .map_or(DEFAULT_REFRESH_THRESHOLD_SECS, |c| c.refresh_threshold_seconds())
    }

    pub(super) fn has_refresh_token(&self) -> bool {
        self.inner.tokens.read().as_ref().is_some_and(|t| t.refresh_token.is_some())
    }

    pub(super) fn publish(&self, event: &OAuthEvent) {
        self.inner.events.publish(event);
    }

    fn config(&self) -> std::result::Result<Arc<AuthConfig>, OidcError> {
        self.inner.config.read().clone().ok_or(OidcError::NotConfigured)
    }

    fn endpoint(
        &self,
        name: &'static str,
        select: impl FnOnce(&DiscoveryDocument) -> Option<&String>,
    ) -> std::result::Result<String, OidcError> {
        let guard = self.inner.discovery.read();
        let document = guard.as_ref().ok_or(OidcError::DiscoveryNotLoaded)?;
        select(document).cloned().ok_or(OidcError::MissingEndpoint(name))
    }

    /// Load tokens and claims persisted by an earlier run.
    async fn restore_session(&self) {
        if self.inner.tokens.read().is_some() {
            return;
        }

        match self.read_stored::<TokenSet>(KEY_TOKENS).await {
            Ok(Some(tokens)) => {
                debug!(expires_at = ?tokens.expires_at, "Restored persisted token set");
                *self.inner.tokens.write() = Some(tokens);
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Ignoring unreadable persisted tokens"),
        }

        match self.read_stored::<IdentityClaims>(KEY_IDENTITY_CLAIMS).await {
            Ok(Some(claims)) => *self.inner.claims.write() = Some(claims),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Ignoring unreadable persisted claims"),
        }
    }

    async fn read_stored<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> std::result::Result<Option<T>, OidcError> {
        let Some(raw) = self.inner.store.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| OidcError::Gangway(InfraError::from(e).into()))
    }

    async fn write_stored<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> std::result::Result<(), OidcError> {
        let raw =
            serde_json::to_string(value).map_err(|e| OidcError::Gangway(InfraError::from(e).into()))?;
        self.inner.store.set(key, &raw).await?;
        Ok(())
    }

    async fn save_tokens(&self, tokens: TokenSet) -> std::result::Result<(), OidcError> {
        self.write_stored(KEY_TOKENS, &tokens).await?;
        *self.inner.tokens.write() = Some(tokens);
        Ok(())
    }

    async fn save_claims(&self, claims: IdentityClaims) -> std::result::Result<(), OidcError> {
        self.write_stored(KEY_IDENTITY_CLAIMS, &claims).await?;
        *self.inner.claims.write() = Some(claims);
        Ok(())
    }

    async fn clear_pending_request(&self) -> std::result::Result<(), OidcError> {
        self.inner.store.remove(KEY_PENDING_STATE).await?;
        self.inner.store.remove(KEY_PENDING_NONCE).await?;
        Ok(())
    }

    async fn process_callback(&self, params: CallbackParams) -> std::result::Result<(), OidcError> {
        let expected_state = self.inner.store.get(KEY_PENDING_STATE).await?;
        let expected_nonce = self.inner.store.get(KEY_PENDING_NONCE).await?;
        self.clear_pending_request().await?;

        if let Some(reason) = params.error {
            return Err(OidcError::Provider(reason));
        }

        let expected_state = expected_state.ok_or(OidcError::NoPendingRequest)?;
        let received_state = params.state.unwrap_or_default();
        if !state_matches(&expected_state, &received_state) {
            return Err(OidcError::StateMismatch {
                expected: expected_state,
                received: received_state,
            });
        }

        let access_token = params
            .access_token
            .ok_or_else(|| OidcError::MalformedToken("callback carries no access_token".into()))?;

        let claims = match &params.id_token {
            Some(id_token) => {
                let claims = decode_id_token_claims(id_token)?;
                check_nonce(&claims, expected_nonce.as_deref())?;
                Some(claims)
            }
            None => None,
        };

        let tokens = TokenSet::new(
            access_token,
            None,
            params.id_token,
            params.expires_in.unwrap_or_default(),
            params.scope,
        );
        self.save_tokens(tokens).await?;
        if let Some(claims) = claims {
            self.save_claims(claims).await?;
        }
        Ok(())
    }

    async fn refresh_grant(&self) -> std::result::Result<(), OidcError> {
        self.restore_session().await;

        let config = self.config()?;
        let previous = self.tokens();
        let refresh_token = previous
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
            .ok_or(OidcError::NoRefreshToken)?;
        let endpoint = self.endpoint("token", |d| d.token_endpoint.as_ref())?;

        let scope = config.scope_string();
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", config.client_id()),
            ("refresh_token", refresh_token.as_str()),
            ("scope", scope.as_str()),
        ];

        let http = &self.inner.grant_http;
        let response = http.send(http.post(endpoint).form(&form)).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<FailureReason>(&body) {
                Ok(reason) => OidcError::Provider(reason),
                Err(_) => OidcError::Gangway(GangwayError::Network(format!(
                    "token endpoint returned HTTP {}",
                    status.as_u16()
                ))),
            });
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| OidcError::Gangway(InfraError::from(e).into()))?;
        let tokens = TokenSet::from(token_response).inherit_refresh_token(previous.as_ref());

        if let Some(id_token) = &tokens.id_token {
            match decode_id_token_claims(id_token) {
                Ok(claims) => self.save_claims(claims).await?,
                Err(err) => warn!(error = %err, "Refreshed ID token could not be decoded"),
            }
        }
        self.save_tokens(tokens).await
    }

    async fn fetch_user_profile(&self) -> std::result::Result<IdentityClaims, OidcError> {
        let access_token = self.access_token().ok_or(OidcError::NotAuthenticated)?;
        let endpoint = self.endpoint("userinfo", |d| d.userinfo_endpoint.as_ref())?;

        let http = &self.inner.http;
        let response = http.send(http.get(endpoint).bearer_auth(access_token)).await?;
        let claims: IdentityClaims = response
            .error_for_status()
            .map_err(|e| OidcError::Gangway(InfraError::from(e).into()))?
            .json()
            .await
            .map_err(|e| OidcError::Gangway(InfraError::from(e).into()))?;

        self.save_claims(claims.clone()).await?;
        Ok(claims)
    }

    async fn end_session(&self) -> std::result::Result<(), OidcError> {
        let config = self.config()?;
        let id_token_hint = self.id_token();

        *self.inner.tokens.write() = None;
        *self.inner.claims.write() = None;
        self.inner.store.remove(KEY_TOKENS).await?;
        self.inner.store.remove(KEY_IDENTITY_CLAIMS).await?;
        self.clear_pending_request().await?;

        info!("Local session cleared");
        self.publish(&OAuthEvent::other(EVENT_LOGOUT));

        let Ok(endpoint) = self.endpoint("end_session", |d| d.end_session_endpoint.as_ref()) else {
            debug!("Provider advertises no end_session_endpoint; staying local");
            return Ok(());
        };

        let mut params = vec![("client_id", config.client_id().to_string())];
        if let Some(hint) = id_token_hint {
            params.push(("id_token_hint", hint));
        }
        if let Some(uri) = config.post_logout_redirect_uri() {
            params.push(("post_logout_redirect_uri", uri.to_string()));
        }

        let url = with_query(&endpoint, &params)?;
        self.inner.navigator.redirect_to(&url).await?;
        Ok(())
    }
}

#[async_trait]
impl OidcClient for StandardOidcClient {
    fn configure(&self, config: Arc<AuthConfig>) {
        info!(issuer = %config.issuer(), client_id = config.client_id(), "OIDC client configured");
        *self.inner.config.write() = Some(config);
    }

    async fn load_discovery_document(&self) -> Result<DiscoveryDocument> {
        let config = self.config()?;
        let result =
            self.inner.discovery_loader.load(config.discovery_url(), config.issuer()).await;

        match result {
            Ok(document) => {
                *self.inner.discovery.write() = Some(document.clone());
                self.publish(&OAuthEvent::other(EVENT_DISCOVERY_LOADED));
                Ok(document)
            }
            Err(err) => {
                self.publish(&OAuthEvent::error(EVENT_DISCOVERY_LOAD_ERROR, Some(err.to_string())));
                Err(err)
            }
        }
    }

    async fn try_login(&self) -> LoginAttemptResult {
        self.restore_session().await;

        let Some(params) =
            self.inner.navigator.current_location().as_ref().and_then(CallbackParams::from_location)
        else {
            return Ok(LoginSuccess::NothingToProcess);
        };
        self.inner.navigator.clear_fragment();

        match self.process_callback(params).await {
            Ok(()) => {
                info!("Login response processed");
                self.publish(&OAuthEvent::token_received());
                Ok(LoginSuccess::SessionEstablished)
            }
            Err(err) => {
                warn!(error = %err, "Login response rejected");
                let failure = err.into_login_failure();
                self.publish(&OAuthEvent::error(EVENT_TOKEN_ERROR, Some(failure.to_string())));
                Err(failure)
            }
        }
    }

    fn has_valid_access_token(&self) -> bool {
        self.inner.tokens.read().as_ref().is_some_and(TokenSet::has_valid_access_token)
    }

    async fn silent_refresh(&self) -> LoginAttemptResult {
        let _guard = self.inner.refresh_guard.lock().await;

        match self.refresh_grant().await {
            Ok(()) => {
                info!("Silent refresh succeeded");
                self.publish(&OAuthEvent::token_received());
                self.publish(&OAuthEvent::other(EVENT_TOKEN_REFRESHED));
                Ok(LoginSuccess::SessionEstablished)
            }
            Err(err) => {
                warn!(error = %err, "Silent refresh failed");
                let failure = err.into_login_failure();
                self.publish(&OAuthEvent::error(
                    EVENT_SILENT_REFRESH_ERROR,
                    Some(failure.to_string()),
                ));
                Err(failure)
            }
        }
    }

    async fn init_implicit_flow(&self) -> Result<()> {
        let config = self.config()?;
        let endpoint = self.endpoint("authorization", |d| Some(&d.authorization_endpoint))?;

        let state = generate_state();
        let nonce = generate_nonce();
        self.inner.store.set(KEY_PENDING_STATE, &state).await?;
        self.inner.store.set(KEY_PENDING_NONCE, &nonce).await?;

        let params = [
            ("response_type", "id_token token".to_string()),
            ("client_id", config.client_id().to_string()),
            ("redirect_uri", config.redirect_uri().to_string()),
            ("scope", config.scope_string()),
            ("state", state),
            ("nonce", nonce),
        ];
        let url = with_query(&endpoint, &params)?;

        info!(endpoint = %endpoint, "Redirecting to authorization endpoint");
        self.inner.navigator.redirect_to(&url).await
    }

    async fn log_out(&self) -> Result<()> {
        self.restore_session().await;

        let has_session = self.inner.tokens.read().is_some() || self.inner.claims.read().is_some();
        if !has_session {
            debug!("Logout requested without a session");
            return Ok(());
        }

        self.end_session().await.map_err(GangwayError::from)
    }

    fn setup_automatic_silent_refresh(&self) {
        let mut slot = self.inner.auto_refresh.lock();
        if slot.is_some() {
            debug!("Automatic silent refresh already running");
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime; automatic silent refresh disabled");
            return;
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        *slot = Some(runtime.spawn(auto_refresh_loop(weak)));
    }

    async fn load_user_profile(&self) -> Result<IdentityClaims> {
        match self.fetch_user_profile().await {
            Ok(claims) => {
                debug!(claims = claims.len(), "User profile loaded");
                self.publish(&OAuthEvent::other(EVENT_USER_PROFILE_LOADED));
                Ok(claims)
            }
            Err(err) => {
                let err = GangwayError::from(err);
                self.publish(&OAuthEvent::error(EVENT_USER_PROFILE_LOAD_ERROR, Some(err.to_string())));
                Err(err)
            }
        }
    }

    fn access_token(&self) -> Option<String> {
        self.inner.tokens.read().as_ref().map(|t| t.access_token.clone())
    }

    fn id_token(&self) -> Option<String> {
        self.inner.tokens.read().as_ref().and_then(|t| t.id_token.clone())
    }

    fn identity_claims(&self) -> Option<IdentityClaims> {
        self.inner.claims.read().clone()
    }
}

/// Append form-encoded `params` to `endpoint`, keeping any existing query.
fn with_query<V: AsRef<str>>(
    endpoint: &str,
    params: &[(&str, V)],
) -> std::result::Result<Url, OidcError> {
    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if endpoint.contains('?') { '&' } else { '?' };

    Url::parse(&format!("{endpoint}{separator}{query}"))
        .map_err(|e| OidcError::Gangway(InfraError::from(e).into()))
}

/// Decode the payload segment of a compact JWT.
pub(crate) fn decode_id_token_claims(
    id_token: &str,
) -> std::result::Result<IdentityClaims, OidcError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| OidcError::MalformedToken("ID token is not a compact JWT".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| OidcError::MalformedToken(format!("ID token payload: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| OidcError::MalformedToken(format!("ID token claims: {e}")))
}

fn check_nonce(
    claims: &IdentityClaims,
    expected: Option<&str>,
) -> std::result::Result<(), OidcError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    match claims.get("nonce").and_then(serde_json::Value::as_str) {
        Some(actual) if state_matches(expected, actual) => Ok(()),
        _ => Err(OidcError::MalformedToken("ID token nonce does not match request".into())),
    }
}
