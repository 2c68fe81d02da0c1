use std::sync::Arc;
use std::time::Duration;

use peoplexd_common::auth::AccessTokenProvider;
use peoplexd_domain::constants::{
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_RETRY_DELAY_MS, RETRYABLE_STATUS_CODES,
};
use peoplexd_domain::{PeopleXdError, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::errors::{token_error, InfraError};

/// Buffered response of an authorized call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| InfraError::from(err).into())
    }
}

/// GET, HEAD and OPTIONS may be replayed without side effects.
pub fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn is_transient(err: &PeopleXdError) -> bool {
    matches!(err, PeopleXdError::TransientUpstreamFailure { .. })
}

/// Authorized HTTP client for one upstream host.
///
/// Every call carries the current bearer token. Idempotent calls get one
/// token refresh after a 401 and one delayed retry after a 502/503/504 or a
/// client-side timeout; everything else is surfaced on the first failure.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
    retry_delay: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder(
        base_url: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> HttpClientBuilder {
        HttpClientBuilder::new(base_url.into(), tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint relative to the base URL.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse> {
        self.request(Method::GET, endpoint, None).await
    }

    /// Issue an authorized request.
    ///
    /// # Errors
    /// - `AuthenticationFailure` when no token can be obtained
    /// - `UnauthorizedAfterRefresh` when a 401 on an idempotent call could not
    ///   be recovered; both the first 401 and the follow-up failure are kept
    /// - `TransientUpstreamFailure` when a 502/503/504 or timeout persisted
    ///   (or the method is not idempotent)
    /// - `UpstreamRejected` for any other non-2xx status
    /// - `Network` for transport failures
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        let url = self.url_for(endpoint);
        let idempotent = is_idempotent(&method);
        let mut transient_retry_used = false;

        loop {
            let token = self.tokens.use_or_fetch_token().await.map_err(token_error)?;

            match self.send_once(&method, &url, &token, body).await {
                Ok(response) => return Ok(response),
                Err(err) if idempotent && err.is_unauthorized() => {
                    return self.retry_after_refresh(&method, &url, body, err).await;
                }
                Err(err) if idempotent && !transient_retry_used && is_transient(&err) => {
                    warn!(
                        %method,
                        %url,
                        error = %err,
                        delay_ms = self.retry_delay.as_millis(),
                        "transient upstream failure, retrying once"
                    );
                    transient_retry_used = true;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => {
                    error!(%method, %url, error = %err, "request failed");
                    return Err(err);
                }
            }
        }
    }

    async fn retry_after_refresh(
        &self,
        method: &Method,
        url: &str,
        body: Option<&serde_json::Value>,
        original: PeopleXdError,
    ) -> Result<ApiResponse> {
        warn!(%method, %url, "received 401, refreshing token and retrying once");

        let combined = |retry: PeopleXdError| {
            error!(%method, %url, original = %original, retry = %retry, "retry after 401 failed");
            PeopleXdError::UnauthorizedAfterRefresh {
                original: Box::new(original.clone()),
                retry: Box::new(retry),
            }
        };

        let token = match self.tokens.force_refresh().await {
            Ok(token) => token,
            Err(err) => return Err(combined(token_error(err))),
        };

        self.send_once(method, url, &token, body).await.map_err(combined)
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        token: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(method.clone(), url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(payload) = body {
            debug!(%method, %url, body = %payload, "sending HTTP request");
            builder = builder.body(serde_json::to_vec(payload).map_err(InfraError::from)?);
        } else {
            debug!(%method, %url, "sending HTTP request");
        }

        let response = builder.send().await.map_err(InfraError::from)?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(InfraError::from)?;
        debug!(%method, %url, %status, body = %text, "received HTTP response");

        if status.is_success() {
            return Ok(ApiResponse { status, headers, body: text });
        }

        let message = if text.is_empty() {
            status.canonical_reason().unwrap_or("no response body").to_string()
        } else {
            text
        };

        if RETRYABLE_STATUS_CODES.contains(&status.as_u16()) {
            return Err(PeopleXdError::TransientUpstreamFailure {
                status: Some(status.as_u16()),
                message,
            });
        }

        Err(PeopleXdError::UpstreamRejected { status: status.as_u16(), message })
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
    timeout: Duration,
    retry_delay: Duration,
    user_agent: Option<String>,
}

impl HttpClientBuilder {
    fn new(base_url: String, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            base_url,
            tokens,
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            user_agent: None,
        }
    }

    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay before the single transient retry.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(InfraError::from)?;

        let trimmed = self.base_url.trim();
        let base_url =
            if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{trimmed}/") };

        Ok(HttpClient { client, base_url, tokens: self.tokens, retry_delay: self.retry_delay })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use async_trait::async_trait;
    use peoplexd_common::auth::TokenManagerError;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;

    /// Hands out `token-N` where N is the number of forced refreshes so far.
    #[derive(Default)]
    struct CountingTokens {
        refreshes: AtomicUsize,
        fail_refresh: bool,
    }

    #[async_trait]
    impl AccessTokenProvider for CountingTokens {
        async fn use_or_fetch_token(&self) -> std::result::Result<String, TokenManagerError> {
            Ok(format!("token-{}", self.refreshes.load(Ordering::SeqCst)))
        }

        async fn force_refresh(&self) -> std::result::Result<String, TokenManagerError> {
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_refresh {
                return Err(TokenManagerError::Transport("token endpoint down".into()));
            }
            Ok(format!("token-{n}"))
        }
    }

    fn client_for(server: &MockServer, tokens: Arc<CountingTokens>) -> HttpClient {
        HttpClient::builder(server.uri(), tokens)
            .timeout(Duration::from_millis(200))
            .retry_delay(Duration::from_millis(10))
            .build()
            .expect("http client")
    }

    async fn attempts(server: &MockServer) -> usize {
        server.received_requests().await.unwrap().len()
    }

    #[tokio::test]
    async fn sends_bearer_and_content_type_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .and(header("authorization", "Bearer token-0"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(CountingTokens::default()));
        let response = client.get("v1/ping").await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn get_401_refreshes_once_and_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer token-0"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = Arc::new(CountingTokens::default());
        let client = client_for(&server, Arc::clone(&tokens));
        let response = client.get("v1/person/appointment/1").await.expect("response");

        assert_eq!(response.body(), "fresh");
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(attempts(&server).await, 2);
    }

    #[tokio::test]
    async fn post_401_is_surfaced_without_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let tokens = Arc::new(CountingTokens::default());
        let client = client_for(&server, Arc::clone(&tokens));
        let payload = serde_json::json!({ "name": "x" });
        let err = client.request(Method::POST, "v1/things", Some(&payload)).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 0);
        assert_eq!(attempts(&server).await, 1);
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({ "name": "x" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(CountingTokens::default()));
        let payload = serde_json::json!({ "name": "x" });
        let response = client.request(Method::POST, "v1/things", Some(&payload)).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn get_503_is_retried_once_after_delay() {
        let server = MockServer::start().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        Mock::given(method("GET"))
            .respond_with(move |_req: &Request| -> ResponseTemplate {
                if counter_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200).set_body_string("recovered")
                }
            })
            .mount(&server)
            .await;

        let tokens = Arc::new(CountingTokens::default());
        let provider: Arc<dyn AccessTokenProvider> = Arc::clone(&tokens) as _;
        let client = HttpClient::builder(server.uri(), provider)
            .retry_delay(Duration::from_millis(50))
            .build()
            .expect("http client");

        let started = Instant::now();
        let response = client.get("v1/x").await.expect("response");

        assert_eq!(response.body(), "recovered");
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(attempts(&server).await, 2);
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn persistent_503_surfaces_after_single_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(CountingTokens::default()));
        let err = client.get("v1/x").await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert!(matches!(err, PeopleXdError::TransientUpstreamFailure { .. }));
        assert_eq!(attempts(&server).await, 2);
    }

    /// Validates the retryable status set.
    ///
    /// Assertions:
    /// - A GET recovers after one retry for each of 502, 503 and 504.
    /// - A POST with the same statuses gets exactly one attempt.
    /// - A 500 is surfaced after one attempt, even for GET.
    #[tokio::test]
    async fn gateway_statuses_are_transient() {
        for status in RETRYABLE_STATUS_CODES {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status))
                .up_to_n_times(1)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
                .mount(&server)
                .await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let client = client_for(&server, Arc::new(CountingTokens::default()));

            let response = client.get("v1/x").await.expect("recovered response");
            assert_eq!(response.body(), "recovered", "GET after {status}");
            assert_eq!(attempts(&server).await, 2, "GET after {status}");

            let err = client.request(Method::POST, "v1/x", None).await.unwrap_err();
            assert_eq!(err.status(), Some(status));
            assert!(matches!(err, PeopleXdError::TransientUpstreamFailure { .. }));
            assert_eq!(attempts(&server).await, 3, "POST after {status}");
        }

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(CountingTokens::default()));
        let err = client.get("v1/x").await.unwrap_err();

        assert!(matches!(err, PeopleXdError::UpstreamRejected { status: 500, .. }));
        assert_eq!(attempts(&server).await, 1);
    }

    #[tokio::test]
    async fn post_503_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(CountingTokens::default()));
        let err = client.request(Method::POST, "v1/x", None).await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(attempts(&server).await, 1);
    }

    #[tokio::test]
    async fn get_timeout_is_retried_once() {
        let server = MockServer::start().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        Mock::given(method("GET"))
            .respond_with(move |_req: &Request| -> ResponseTemplate {
                if counter_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(200).set_delay(Duration::from_millis(1_000))
                } else {
                    ResponseTemplate::new(200).set_body_string("fast")
                }
            })
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(CountingTokens::default()));
        let response = client.get("v1/x").await.expect("response");

        assert_eq!(response.body(), "fast");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_statuses_are_surfaced_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such person"))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(CountingTokens::default()));
        let err = client.get("v1/person/appointment/0").await.unwrap_err();

        assert_eq!(
            err,
            PeopleXdError::UpstreamRejected { status: 404, message: "no such person".into() }
        );
        assert_eq!(attempts(&server).await, 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_both_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let tokens = Arc::new(CountingTokens { fail_refresh: true, ..Default::default() });
        let client = client_for(&server, Arc::clone(&tokens));
        let err = client.get("v1/x").await.unwrap_err();

        assert!(err.refresh_failed());
        assert!(err.original().is_some_and(PeopleXdError::is_unauthorized));
        assert_eq!(attempts(&server).await, 1);
    }

    #[tokio::test]
    async fn second_401_keeps_both_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let tokens = Arc::new(CountingTokens::default());
        let client = client_for(&server, Arc::clone(&tokens));
        let err = client.get("v1/x").await.unwrap_err();

        assert!(!err.refresh_failed());
        assert!(err.retry_error().is_some_and(PeopleXdError::is_unauthorized));
        assert_eq!(tokens.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(attempts(&server).await, 2);
    }

    #[test]
    fn only_safe_methods_are_idempotent() {
        assert!(is_idempotent(&Method::GET));
        assert!(is_idempotent(&Method::HEAD));
        assert!(is_idempotent(&Method::OPTIONS));
        assert!(!is_idempotent(&Method::POST));
        assert!(!is_idempotent(&Method::PUT));
        assert!(!is_idempotent(&Method::DELETE));
    }

    #[test]
    fn endpoint_is_joined_to_base_url() {
        let tokens: Arc<dyn AccessTokenProvider> = Arc::new(CountingTokens::default());
        let client =
            HttpClient::builder("https://example.com/ws", tokens).build().expect("http client");
        assert_eq!(client.url_for("/v1/x"), "https://example.com/ws/v1/x");
        assert_eq!(client.url_for("v1/x"), "https://example.com/ws/v1/x");
    }
}
