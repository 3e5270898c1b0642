//! Login configuration
//!
//! [`AuthConfig`] is validated once at construction and never mutated after
//! it is handed to the orchestrator. [`AuthConfigRecord`] is the plain,
//! string-typed shape used by config files and the environment loader.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{DEFAULT_REFRESH_THRESHOLD_SECS, DEFAULT_SCOPES, WELL_KNOWN_CONFIGURATION_PATH};
use crate::errors::{GangwayError, Result};

/// Validated OpenID Connect client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AuthConfigRecord", into = "AuthConfigRecord")]
pub struct AuthConfig {
    issuer: Url,
    client_id: String,
    redirect_uri: Url,
    scopes: Vec<String>,
    discovery_url: Url,
    post_logout_redirect_uri: Option<Url>,
    refresh_threshold_seconds: i64,
}

impl AuthConfig {
    /// Create a configuration with default scopes and a discovery URL
    /// derived from the issuer.
    ///
    /// # Errors
    /// Returns [`GangwayError::Config`] when a URL does not parse or the
    /// client id is blank.
    pub fn new(issuer: &str, client_id: &str, redirect_uri: &str) -> Result<Self> {
        let issuer = parse_url("issuer", issuer)?;
        let redirect_uri = parse_url("redirect_uri", redirect_uri)?;
        if client_id.trim().is_empty() {
            return Err(GangwayError::Config("client_id must not be empty".to_string()));
        }
        let discovery_url = default_discovery_url(&issuer)?;

        Ok(Self {
            issuer,
            client_id: client_id.to_string(),
            redirect_uri,
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
            discovery_url,
            post_logout_redirect_uri: None,
            refresh_threshold_seconds: DEFAULT_REFRESH_THRESHOLD_SECS,
        })
    }

    /// Replace the requested scopes. An empty list keeps the defaults.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();
        if !scopes.is_empty() {
            self.scopes = scopes;
        }
        self
    }

    /// Override the discovery endpoint.
    ///
    /// # Errors
    /// Returns [`GangwayError::Config`] when the URL does not parse.
    pub fn with_discovery_url(mut self, discovery_url: &str) -> Result<Self> {
        self.discovery_url = parse_url("discovery_url", discovery_url)?;
        Ok(self)
    }

    /// Where the provider sends the user after end-session.
    ///
    /// # Errors
    /// Returns [`GangwayError::Config`] when the URL does not parse.
    pub fn with_post_logout_redirect_uri(mut self, uri: &str) -> Result<Self> {
        self.post_logout_redirect_uri = Some(parse_url("post_logout_redirect_uri", uri)?);
        Ok(self)
    }

    /// Seconds before expiry at which background refresh fires. Negative
    /// values are clamped to zero.
    #[must_use]
    pub fn with_refresh_threshold_seconds(mut self, seconds: i64) -> Self {
        self.refresh_threshold_seconds = seconds.max(0);
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &Url {
        &self.issuer
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Scopes as a space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    #[must_use]
    pub fn discovery_url(&self) -> &Url {
        &self.discovery_url
    }

    #[must_use]
    pub fn post_logout_redirect_uri(&self) -> Option<&Url> {
        self.post_logout_redirect_uri.as_ref()
    }

    #[must_use]
    pub fn refresh_threshold_seconds(&self) -> i64 {
        self.refresh_threshold_seconds
    }
}

/// Unvalidated configuration as read from files or the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfigRecord {
    pub issuer: String,
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_threshold_seconds: Option<i64>,
}

impl TryFrom<AuthConfigRecord> for AuthConfig {
    type Error = GangwayError;

    fn try_from(record: AuthConfigRecord) -> Result<Self> {
        let mut config = Self::new(&record.issuer, &record.client_id, &record.redirect_uri)?
            .with_scopes(record.scopes);
        if let Some(url) = record.discovery_url.as_deref().filter(|u| !u.is_empty()) {
            config = config.with_discovery_url(url)?;
        }
        if let Some(uri) = record.post_logout_redirect_uri.as_deref().filter(|u| !u.is_empty()) {
            config = config.with_post_logout_redirect_uri(uri)?;
        }
        if let Some(seconds) = record.refresh_threshold_seconds {
            config = config.with_refresh_threshold_seconds(seconds);
        }
        Ok(config)
    }
}

impl From<AuthConfig> for AuthConfigRecord {
    fn from(config: AuthConfig) -> Self {
        Self {
            issuer: config.issuer.into(),
            client_id: config.client_id,
            redirect_uri: config.redirect_uri.into(),
            scopes: config.scopes,
            discovery_url: Some(config.discovery_url.into()),
            post_logout_redirect_uri: config.post_logout_redirect_uri.map(Into::into),
            refresh_threshold_seconds: Some(config.refresh_threshold_seconds),
        }
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url> {
    Url::parse(value.trim())
        .map_err(|e| GangwayError::Config(format!("invalid {field} '{value}': {e}")))
}

fn default_discovery_url(issuer: &Url) -> Result<Url> {
    let base = issuer.as_str().trim_end_matches('/');
    parse_url("discovery_url", &format!("{base}/{WELL_KNOWN_CONFIGURATION_PATH}"))
}
