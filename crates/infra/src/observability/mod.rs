//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the embedding application. [`init_tracing`] is a ready-made one driven
//! by environment variables:
//!
//! - `PEOPLEXD_LOG`: `EnvFilter` directives (default `info`)
//! - `PEOPLEXD_LOG_FORMAT`: `json` or `pretty` (default `pretty`)

use std::env;
use std::io;

use peoplexd_domain::{PeopleXdError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILTER_ENV: &str = "PEOPLEXD_LOG";
pub const LOG_FORMAT_ENV: &str = "PEOPLEXD_LOG_FORMAT";

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Human-readable, for development
    #[default]
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info,peoplexd_infra=debug`
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string(), format: LogFormat::Pretty }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let filter = env::var(LOG_FILTER_ENV).unwrap_or_else(|_| "info".to_string());
        let format = match env::var(LOG_FORMAT_ENV).as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        Self { filter, format }
    }
}

/// Install a global subscriber configured from the environment.
///
/// # Errors
/// Returns `PeopleXdError::Config` for unparseable filter directives or when
/// a global subscriber is already installed.
pub fn init_tracing() -> Result<()> {
    init_tracing_with(&LoggingConfig::from_env())
}

/// Install a global subscriber with an explicit configuration.
///
/// # Errors
/// See [`init_tracing`].
pub fn init_tracing_with(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|err| PeopleXdError::Config(format!("invalid log filter: {err}")))?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(io::stderr))
            .try_init(),
        LogFormat::Pretty => {
            registry.with(fmt::layer().with_target(true).with_writer(io::stderr)).try_init()
        }
    };

    installed.map_err(|err| PeopleXdError::Config(format!("failed to install subscriber: {err}")))
}
