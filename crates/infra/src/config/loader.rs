//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment if one is present
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PEOPLEXD_URL`: Provider base URL (required)
//! - `PEOPLEXD_CLIENT_ID`: OAuth client id (required)
//! - `PEOPLEXD_CLIENT_SECRET`: OAuth client secret (required)
//! - `PEOPLEXD_TITLE_SUBSTITUTIONS`: `FROM=TO,FROM=TO` position code map
//! - `PEOPLEXD_TOKEN_SKEW_SECS`: Token expiry skew in seconds
//! - `PEOPLEXD_TOKEN_TIMEOUT_MS`: Token endpoint timeout
//! - `PEOPLEXD_REQUEST_TIMEOUT_MS`: Per-request timeout
//! - `PEOPLEXD_RETRY_DELAY_MS`: Delay before the transient retry
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./peoplexd.json` or `./peoplexd.toml` (current working directory)
//! 2. `../peoplexd.json` or `../peoplexd.toml` (parent directory)
//! 3. Relative to executable location

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use peoplexd_domain::{ClientConfig, HttpSettings, PeopleXdError, Result, TokenSettings};

pub const ENV_URL: &str = "PEOPLEXD_URL";
pub const ENV_CLIENT_ID: &str = "PEOPLEXD_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "PEOPLEXD_CLIENT_SECRET";
pub const ENV_TITLE_SUBSTITUTIONS: &str = "PEOPLEXD_TITLE_SUBSTITUTIONS";
pub const ENV_TOKEN_SKEW_SECS: &str = "PEOPLEXD_TOKEN_SKEW_SECS";
pub const ENV_TOKEN_TIMEOUT_MS: &str = "PEOPLEXD_TOKEN_TIMEOUT_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "PEOPLEXD_REQUEST_TIMEOUT_MS";
pub const ENV_RETRY_DELAY_MS: &str = "PEOPLEXD_RETRY_DELAY_MS";

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `PeopleXdError::Config` if configuration cannot be loaded from
/// either source, or the loaded configuration is invalid.
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `PeopleXdError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<ClientConfig> {
    let base_url = env_var(ENV_URL)?;
    let client_id = env_var(ENV_CLIENT_ID)?;
    let client_secret = env_var(ENV_CLIENT_SECRET)?;

    let substitutions = match std::env::var(ENV_TITLE_SUBSTITUTIONS) {
        Ok(raw) => parse_substitutions(&raw)?,
        Err(_) => HashMap::new(),
    };

    let token_defaults = TokenSettings::default();
    let http_defaults = HttpSettings::default();

    let config = ClientConfig::new(base_url, client_id, client_secret)
        .with_title_code_substitutions(substitutions)
        .with_token_settings(TokenSettings {
            skew_seconds: env_number(ENV_TOKEN_SKEW_SECS, token_defaults.skew_seconds)?,
            request_timeout_ms: env_number(
                ENV_TOKEN_TIMEOUT_MS,
                token_defaults.request_timeout_ms,
            )?,
        })
        .with_http_settings(HttpSettings {
            request_timeout_ms: env_number(
                ENV_REQUEST_TIMEOUT_MS,
                http_defaults.request_timeout_ms,
            )?,
            retry_delay_ms: env_number(ENV_RETRY_DELAY_MS, http_defaults.retry_delay_ms)?,
        });

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
///
/// # Errors
/// Returns `PeopleXdError::Config` if the file is missing, malformed or
/// describes an invalid configuration.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PeopleXdError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PeopleXdError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PeopleXdError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| PeopleXdError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| PeopleXdError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(PeopleXdError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend([
            cwd.join("peoplexd.json"),
            cwd.join("peoplexd.toml"),
            cwd.join("../peoplexd.json"),
            cwd.join("../peoplexd.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend([exe_dir.join("peoplexd.json"), exe_dir.join("peoplexd.toml")]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Parse `FROM=TO,FROM=TO`. Blank entries are ignored.
fn parse_substitutions(raw: &str) -> Result<HashMap<String, String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (from, to) = entry.split_once('=').ok_or_else(|| {
                PeopleXdError::Config(format!(
                    "Invalid title substitution '{entry}', expected FROM=TO"
                ))
            })?;
            let (from, to) = (from.trim(), to.trim());
            if from.is_empty() || to.is_empty() {
                return Err(PeopleXdError::Config(format!(
                    "Invalid title substitution '{entry}', expected FROM=TO"
                )));
            }
            Ok((from.to_string(), to.to_string()))
        })
        .collect()
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        PeopleXdError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_number<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| PeopleXdError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
