//! OAuth 2.0 client-credentials token fetcher
//!
//! `POST {base}oauth/token?grant_type=client_credentials` with HTTP basic
//! credentials. One attempt per call; retrying and coalescing belong to the
//! token manager and the request layer.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use peoplexd_common::auth::{TokenFetcher, TokenManagerError, TokenResponse};
use peoplexd_domain::constants::{CLIENT_CREDENTIALS_GRANT, OAUTH_TOKEN_PATH};
use peoplexd_domain::{ClientConfig, Result};
use reqwest::Client as ReqwestClient;
use tracing::debug;

use crate::errors::InfraError;

/// Fetches tokens from the provider's client-credentials endpoint.
pub struct ClientCredentialsFetcher {
    client: ReqwestClient,
    token_url: String,
    client_id: String,
    client_secret: String,
    timeout: Duration,
}

impl ClientCredentialsFetcher {
    /// Create a fetcher for `{base_url}oauth/token`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client =
            ReqwestClient::builder().timeout(timeout).no_proxy().build().map_err(InfraError::from)?;

        let base = base_url.trim();
        let token_url = if base.ends_with('/') {
            format!("{base}{OAUTH_TOKEN_PATH}")
        } else {
            format!("{base}/{OAUTH_TOKEN_PATH}")
        };

        Ok(Self {
            client,
            token_url,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            &config.normalized_base_url(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config.token.request_timeout(),
        )
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    fn transport_error(&self, err: &reqwest::Error) -> TokenManagerError {
        if err.is_timeout() {
            TokenManagerError::Timeout(self.timeout)
        } else {
            TokenManagerError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl TokenFetcher for ClientCredentialsFetcher {
    async fn fetch_token(&self) -> std::result::Result<TokenResponse, TokenManagerError> {
        debug!(url = %self.token_url, client_id = %self.client_id, "requesting client-credentials token");

        let response = self
            .client
            .post(&self.token_url)
            .query(&[("grant_type", CLIENT_CREDENTIALS_GRANT)])
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| self.transport_error(&err))?;

        if !status.is_success() {
            return Err(TokenManagerError::Rejected { status: status.as_u16(), message: body });
        }

        serde_json::from_str::<TokenResponse>(&body)
            .map_err(|err| TokenManagerError::InvalidResponse(err.to_string()))
    }
}

impl fmt::Debug for ClientCredentialsFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsFetcher")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}
