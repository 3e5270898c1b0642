//! Provider metadata loading

use gangway_domain::{DiscoveryDocument, GangwayError, Result};
use tracing::{debug, info};
use url::Url;

use crate::http::HttpClient;

/// Fetches and validates the OpenID Provider discovery document.
///
/// A single attempt is made; a failed load is fatal to startup and
/// retrying is left to the caller.
#[derive(Debug, Clone)]
pub struct HttpDiscoveryLoader {
    http: HttpClient,
}

impl HttpDiscoveryLoader {
    /// # Errors
    /// Returns [`GangwayError::Network`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Ok(Self { http: HttpClient::single_attempt()? })
    }

    #[must_use]
    pub fn with_client(http: HttpClient) -> Self {
        Self { http }
    }

    /// Load the document at `url` and check it was issued by
    /// `expected_issuer`.
    ///
    /// # Errors
    /// Every failure (transport, status, body, issuer) is reported as
    /// [`GangwayError::Discovery`].
    pub async fn load(&self, url: &Url, expected_issuer: &Url) -> Result<DiscoveryDocument> {
        debug!(%url, "Loading discovery document");

        let response = self
            .http
            .send(self.http.get(url.clone()))
            .await
            .map_err(|e| GangwayError::Discovery(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GangwayError::Discovery(format!("{url} returned HTTP {}", status.as_u16())));
        }

        let document: DiscoveryDocument = response
            .json()
            .await
            .map_err(|e| GangwayError::Discovery(format!("invalid discovery document: {e}")))?;

        if !document.issuer_matches(expected_issuer.as_str()) {
            return Err(GangwayError::Discovery(format!(
                "issuer mismatch: expected {expected_issuer}, document advertises {}",
                document.issuer
            )));
        }

        info!(issuer = %document.issuer, "Discovery document loaded");
        Ok(document)
    }
}
