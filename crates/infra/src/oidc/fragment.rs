//! Implicit-flow callback parsing
//!
//! The provider returns tokens (or an error) in the URL fragment of the
//! redirect URI, form-encoded per OAuth 2.0 §4.2.2.

use gangway_domain::FailureReason;
use url::Url;

/// Parameters carried by a login response fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub error: Option<FailureReason>,
}

impl CallbackParams {
    /// Parse the fragment of `location`.
    ///
    /// Returns `None` when there is no fragment or it carries neither
    /// tokens nor an error (an ordinary in-app anchor).
    #[must_use]
    pub fn from_location(location: &Url) -> Option<Self> {
        Self::parse(location.fragment()?)
    }

    #[must_use]
    pub fn parse(fragment: &str) -> Option<Self> {
        let mut params = Self::default();
        let mut error_code = None;
        let mut error_description = None;

        for (key, value) in url::form_urlencoded::parse(fragment.trim_start_matches('#').as_bytes()) {
            let value = value.into_owned();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "access_token" => params.access_token = Some(value),
                "id_token" => params.id_token = Some(value),
                "token_type" => params.token_type = Some(value),
                "expires_in" => params.expires_in = value.parse().ok(),
                "scope" => params.scope = Some(value),
                "state" => params.state = Some(value),
                "error" => error_code = Some(value),
                "error_description" => error_description = Some(value),
                _ => {}
            }
        }

        params.error = error_code.map(|code| {
            let reason = FailureReason::new(code);
            match error_description {
                Some(desc) => reason.with_description(desc),
                None => reason,
            }
        });

        params.is_login_response().then_some(params)
    }

    #[must_use]
    pub fn is_login_response(&self) -> bool {
        self.access_token.is_some() || self.id_token.is_some() || self.error.is_some()
    }
}
