//! PeopleXD client facade
//!
//! Wires one configuration into a token manager, an authorized HTTP client
//! and the provider services. Each client owns its own token manager.

use std::sync::Arc;

use peoplexd_common::auth::{AccessTokenProvider, TokenManager, TokenManagerConfig};
use peoplexd_core::AppointmentService;
use peoplexd_domain::{ClientConfig, ProcessedAppointment, RawAppointment, Result};
use reqwest::Method;
use tracing::info;

use super::appointments::AppointmentApi;
use super::reference::ReferenceService;
use crate::auth::ClientCredentialsFetcher;
use crate::errors::token_error;
use crate::http::{ApiResponse, HttpClient};

/// Token manager used by [`PeopleXdClient`].
pub type PeopleXdTokenManager = TokenManager<ClientCredentialsFetcher>;

/// Entry point for the PeopleXD API.
pub struct PeopleXdClient {
    config: ClientConfig,
    tokens: Arc<PeopleXdTokenManager>,
    http: HttpClient,
    appointments: AppointmentService,
}

impl PeopleXdClient {
    /// Build a client and obtain the first token.
    ///
    /// # Errors
    /// Returns `PeopleXdError::Config` for an invalid configuration and
    /// `PeopleXdError::AuthenticationFailure` when the first token cannot be
    /// obtained.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let client = Self::build(config)?;
        client.tokens.use_or_fetch_token().await.map_err(token_error)?;
        info!(base_url = %client.config.base_url, "PeopleXD client connected");
        Ok(client)
    }

    /// Build a client without contacting the provider. The first request
    /// fetches the token.
    ///
    /// # Errors
    /// Returns `PeopleXdError::Config` for an invalid configuration.
    pub fn build(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let fetcher = ClientCredentialsFetcher::from_config(&config)?;
        let tokens = Arc::new(TokenManager::new(
            fetcher,
            TokenManagerConfig {
                skew: config.token.skew(),
                request_timeout: config.token.request_timeout(),
            },
        ));

        let provider: Arc<dyn AccessTokenProvider> = tokens.clone();
        let http = HttpClient::builder(config.normalized_base_url(), provider)
            .timeout(config.http.request_timeout())
            .retry_delay(config.http.retry_delay())
            .build()?;

        let appointments = AppointmentService::new(
            Arc::new(AppointmentApi::new(http.clone())),
            Arc::new(ReferenceService::new(http.clone())),
        )
        .with_title_code_substitutions(config.title_code_substitutions.clone());

        Ok(Self { config, tokens, http, appointments })
    }

    /// Issue an authorized request against an endpoint relative to the base
    /// URL.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        self.http.request(method, endpoint, body).await
    }

    /// Raw, unmerged appointment records.
    pub async fn appointments(&self, staff_id: &str) -> Result<Vec<RawAppointment>> {
        self.appointments.appointments(staff_id).await
    }

    pub async fn full_department(&self, code: &str) -> Result<String> {
        self.appointments.full_department(code).await
    }

    /// Full job title, after applying the configured code substitutions.
    pub async fn full_job_title(&self, code: &str) -> Result<String> {
        self.appointments.full_job_title(code).await
    }

    /// Merged and enriched appointment timeline.
    pub async fn clean_appointments(&self, staff_id: &str) -> Result<Vec<ProcessedAppointment>> {
        self.appointments.clean_appointments(staff_id).await
    }

    /// The configuration the client was built from.
    pub fn options(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_manager(&self) -> &PeopleXdTokenManager {
        &self.tokens
    }
}
