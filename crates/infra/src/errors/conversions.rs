//! Conversions from external infrastructure errors into domain errors.

use gangway_domain::GangwayError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GangwayError);

impl From<InfraError> for GangwayError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GangwayError> for InfraError {
    fn from(value: GangwayError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoGangwayError {
    fn into_gangway(self) -> GangwayError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GangwayError */
/* -------------------------------------------------------------------------- */

impl IntoGangwayError for HttpError {
    fn into_gangway(self) -> GangwayError {
        if self.is_builder() {
            return GangwayError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return GangwayError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return GangwayError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return GangwayError::Network(format!("HTTP response body could not be decoded: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => GangwayError::Auth(message),
                _ => GangwayError::Network(message),
            };
        }

        GangwayError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_gangway())
    }
}

/* -------------------------------------------------------------------------- */
/* serde / io / url → GangwayError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        Self(GangwayError::Storage(format!("invalid JSON: {value}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(GangwayError::Storage(value.to_string()))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        Self(GangwayError::Config(format!("invalid URL: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
