//! Error types used throughout the client
//!
//! Every failure that reaches a caller is classified, so the caller can decide
//! whether retrying the whole operation makes sense.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of [`PeopleXdError`] for retry decisions and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Token endpoint unreachable or credentials rejected
    Authentication,
    /// Upstream still rejects the call after a token refresh
    Unauthorized,
    /// 502/503/504 or timeout that survived the single retry
    Transient,
    /// Any other non-2xx response
    Rejected,
    /// Lookup returned no items
    NotFound,
    /// Provider data could not be interpreted
    Data,
    /// Transport failure that is not a timeout
    Network,
    /// Local misconfiguration or internal fault
    Config,
}

/// Main error type for the PeopleXD client
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum PeopleXdError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),

    /// A 401 on an idempotent call whose refresh-and-retry also failed.
    ///
    /// `original` is the first 401; `retry` is either the refresh failure
    /// ([`PeopleXdError::AuthenticationFailure`]) or the failure of the
    /// retried call.
    #[error("Retry after 401 failed; original: {original}; retry: {retry}")]
    UnauthorizedAfterRefresh { original: Box<PeopleXdError>, retry: Box<PeopleXdError> },

    /// `status` is `None` when the request timed out on the client side.
    #[error("Transient upstream failure ({}): {message}", status_label(.status))]
    TransientUpstreamFailure { status: Option<u16>, message: String },

    #[error("Upstream rejected request with HTTP {status}: {message}")]
    UpstreamRejected { status: u16, message: String },

    #[error("Not found: {0}")]
    DataNotFound(String),

    #[error("Malformed interval: {0}")]
    MalformedInterval(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[allow(clippy::ref_option)]
fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "timeout".to_string(), |code| format!("HTTP {code}"))
}

impl PeopleXdError {
    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthenticationFailure(_) => ErrorCategory::Authentication,
            Self::UnauthorizedAfterRefresh { .. } => ErrorCategory::Unauthorized,
            Self::TransientUpstreamFailure { .. } => ErrorCategory::Transient,
            Self::UpstreamRejected { .. } => ErrorCategory::Rejected,
            Self::DataNotFound(_) => ErrorCategory::NotFound,
            Self::MalformedInterval(_) | Self::InvalidResponse(_) => ErrorCategory::Data,
            Self::Network(_) => ErrorCategory::Network,
            Self::Config(_) | Self::Internal(_) => ErrorCategory::Config,
        }
    }

    /// Whether retrying the whole operation later is sensible.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Authentication | ErrorCategory::Transient | ErrorCategory::Network
        )
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamRejected { status, .. } => Some(*status),
            Self::TransientUpstreamFailure { status, .. } => *status,
            _ => None,
        }
    }

    /// True for a plain upstream 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::UpstreamRejected { status: 401, .. })
    }

    /// The first 401 of an [`PeopleXdError::UnauthorizedAfterRefresh`].
    #[must_use]
    pub fn original(&self) -> Option<&PeopleXdError> {
        match self {
            Self::UnauthorizedAfterRefresh { original, .. } => Some(original.as_ref()),
            _ => None,
        }
    }

    /// The refresh or retry failure of an
    /// [`PeopleXdError::UnauthorizedAfterRefresh`].
    #[must_use]
    pub fn retry_error(&self) -> Option<&PeopleXdError> {
        match self {
            Self::UnauthorizedAfterRefresh { retry, .. } => Some(retry.as_ref()),
            _ => None,
        }
    }

    /// Distinguishes "refresh failed" from "still unauthorized" after a 401
    /// recovery attempt.
    #[must_use]
    pub fn refresh_failed(&self) -> bool {
        matches!(self.retry_error(), Some(Self::AuthenticationFailure(_)))
    }
}

/// Result type alias for PeopleXD operations
pub type Result<T> = std::result::Result<T, PeopleXdError>;
