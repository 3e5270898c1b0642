//! reqwest wrapper with bounded retries.
//!
//! Server errors and connection failures are retried with exponential
//! backoff up to `max_attempts`. Identity-provider calls that must not be
//! repeated (discovery, token grants) use a single-attempt client.

use std::time::Duration;

use gangway_common::error::ErrorClassification;
use gangway_domain::GangwayError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("gangway/", env!("CARGO_PKG_VERSION"));

/// HTTP client with retry and timeout support.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with default timeout and retry settings.
    ///
    /// # Errors
    /// Returns [`GangwayError::Config`] if the TLS backend fails to
    /// initialise.
    pub fn new() -> Result<Self, GangwayError> {
        Self::builder().build()
    }

    /// Client that sends every request exactly once.
    ///
    /// # Errors
    /// See [`HttpClient::new`].
    pub fn single_attempt() -> Result<Self, GangwayError> {
        Self::builder().max_attempts(1).build()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub fn get<U: reqwest::IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post<U: reqwest::IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Execute `builder`, retrying transient failures.
    ///
    /// Non-success statuses other than 5xx are returned as responses, not
    /// errors; callers inspect the status themselves.
    ///
    /// # Errors
    /// Returns the last transport error once no attempts remain, or at once
    /// when the error is not retryable.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, GangwayError> {
        let attempts = self.max_attempts.max(1);
        let template = builder.build().map_err(|err| GangwayError::from(InfraError::from(err)))?;

        for attempt in 1..=attempts {
            let request = template.try_clone().ok_or_else(|| {
                GangwayError::Internal("streaming request bodies cannot be retried".into())
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "received HTTP response");

                    if status.is_server_error() && attempt < attempts {
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");

                    let err = GangwayError::from(InfraError::from(err));
                    if attempt < attempts && err.is_retryable() {
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }
                    return Err(err);
                }
            }
        }

        Err(GangwayError::Internal("http client exhausted retries without a result".into()))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = u32::try_from(retry_number.saturating_sub(1).min(8)).unwrap_or(8);
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl HttpClientBuilder {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts (initial try + retries).
    #[must_use]
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// # Errors
    /// Returns [`GangwayError::Config`] if the reqwest client cannot be
    /// built.
    pub fn build(self) -> Result<HttpClient, GangwayError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .no_proxy()
            .build()
            .map_err(|err| GangwayError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use reqwest::StatusCode;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fast_client(attempts: usize) -> HttpClient {
        HttpClient::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(attempts)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    ResponseTemplate::new(502)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let client = fast_client(3);
        let response = client.send(client.get(server.uri())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn single_attempt_client_returns_first_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::single_attempt().unwrap();
        let response = client.send(client.get(server.uri())).await.unwrap();

        assert_eq!(client.max_attempts(), 1);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn client_errors_are_returned_as_responses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(3);
        let response = client.send(client.post(server.uri())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = fast_client(2);
        let result = client.send(client.get(format!("http://{addr}"))).await;

        assert!(matches!(result, Err(GangwayError::Network(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn retryable_transport_errors_back_off_between_attempts() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::builder()
            .base_backoff(Duration::from_millis(40))
            .max_attempts(3)
            .build()
            .unwrap();
        let started = std::time::Instant::now();
        let result = client.send(client.get(format!("http://{addr}"))).await;

        assert!(matches!(result, Err(GangwayError::Network(_))));
        assert!(started.elapsed() >= Duration::from_millis(120), "retries did not back off");
    }

    #[tokio::test]
    async fn invalid_requests_are_not_retried() {
        let client = HttpClient::builder()
            .base_backoff(Duration::from_secs(5))
            .max_attempts(3)
            .build()
            .unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            client.send(client.get("http://[::1")),
        )
        .await
        .expect("invalid request must fail without backing off");

        assert!(matches!(result, Err(GangwayError::Config(_))), "got {result:?}");
    }
}
