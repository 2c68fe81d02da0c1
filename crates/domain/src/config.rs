//! Client configuration structures
//!
//! Loaded by `peoplexd-infra` from the environment or a TOML/JSON file.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_RETRY_DELAY_MS, DEFAULT_TOKEN_SKEW_SECS,
    DEFAULT_TOKEN_TIMEOUT_MS,
};
use crate::errors::{PeopleXdError, Result};

/// Token lifecycle settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSettings {
    /// Seconds subtracted from the server-reported lifetime
    #[serde(default = "default_skew_seconds")]
    pub skew_seconds: u64,
    /// Timeout for the OAuth token endpoint
    #[serde(default = "default_token_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self { skew_seconds: DEFAULT_TOKEN_SKEW_SECS, request_timeout_ms: DEFAULT_TOKEN_TIMEOUT_MS }
    }
}

impl TokenSettings {
    pub fn skew(&self) -> Duration {
        Duration::from_secs(self.skew_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Request layer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Delay before the single transient-failure retry
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS, retry_delay_ms: DEFAULT_RETRY_DELAY_MS }
    }
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Configuration for one PeopleXD client instance (one host, one credential
/// set).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the provider, e.g. `https://api.corehr.com/ws/tenant/corehr/`
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Position codes replaced before title lookups (e.g. `HPAL` -> `AL`)
    #[serde(default)]
    pub title_code_substitutions: HashMap<String, String>,
    #[serde(default)]
    pub token: TokenSettings,
    #[serde(default)]
    pub http: HttpSettings,
}

impl ClientConfig {
    /// Create a configuration with default token and HTTP settings.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            title_code_substitutions: HashMap::new(),
            token: TokenSettings::default(),
            http: HttpSettings::default(),
        }
    }

    #[must_use]
    pub fn with_title_code_substitutions(mut self, substitutions: HashMap<String, String>) -> Self {
        self.title_code_substitutions = substitutions;
        self
    }

    #[must_use]
    pub fn with_token_settings(mut self, token: TokenSettings) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn with_http_settings(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    /// Base URL guaranteed to end with `/`, ready for path concatenation.
    pub fn normalized_base_url(&self) -> String {
        let trimmed = self.base_url.trim();
        if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        }
    }

    /// Check that required fields are present.
    ///
    /// # Errors
    /// Returns `PeopleXdError::Config` naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(PeopleXdError::Config("base_url is required".to_string()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(PeopleXdError::Config(format!(
                "base_url must be an http(s) URL, got '{base}'"
            )));
        }
        if self.client_id.trim().is_empty() {
            return Err(PeopleXdError::Config("client_id is required".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(PeopleXdError::Config("client_secret is required".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("title_code_substitutions", &self.title_code_substitutions)
            .field("token", &self.token)
            .field("http", &self.http)
            .finish()
    }
}

fn default_skew_seconds() -> u64 {
    DEFAULT_TOKEN_SKEW_SECS
}

fn default_token_timeout_ms() -> u64 {
    DEFAULT_TOKEN_TIMEOUT_MS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}
