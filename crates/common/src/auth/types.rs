//! OAuth token types
//!
//! Defines the token held by the lifecycle manager, the body returned by the
//! client-credentials endpoint, and the errors a token fetch can produce.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on how long a token is trusted, whatever `expires_in` says.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Body of a successful client-credentials token response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds as reported by the server
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl TokenResponse {
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_in: u64) -> Self {
        Self { access_token: access_token.into(), expires_in, token_type: None }
    }
}

/// Bearer token with a precomputed local expiry.
///
/// Immutable once created; the manager replaces it wholesale.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    access_token: String,
    issued_at: Instant,
    expires_at: Instant,
}

impl Token {
    /// Create a token issued at `issued_at` that the server considers valid
    /// for `lifetime`. `skew` is subtracted so the token is treated as
    /// expired early; the result never precedes `issued_at` and never lies
    /// more than [`MAX_TOKEN_LIFETIME`] after it.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        issued_at: Instant,
        lifetime: Duration,
        skew: Duration,
    ) -> Self {
        let valid_for = lifetime.saturating_sub(skew).min(MAX_TOKEN_LIFETIME);
        Self {
            access_token: access_token.into(),
            issued_at,
            expires_at: issued_at.checked_add(valid_for).unwrap_or(issued_at),
        }
    }

    /// Build a token from an endpoint response.
    #[must_use]
    pub fn from_response(response: &TokenResponse, issued_at: Instant, skew: Duration) -> Self {
        Self::new(
            response.access_token.clone(),
            issued_at,
            Duration::from_secs(response.expires_in),
            skew,
        )
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Valid iff `now` is strictly before the skewed expiry.
    #[must_use]
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Time left before the token is considered expired.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Error type for token fetches
///
/// Cloneable so a single failed fetch can be handed to every caller waiting
/// on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenManagerError {
    /// Token endpoint could not be reached
    #[error("Token endpoint unreachable: {0}")]
    Transport(String),

    /// Token endpoint answered with a non-success status
    #[error("Token endpoint rejected request with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Token endpoint answered 2xx with a body that is not a token
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Token fetch exceeded its time budget
    #[error("Token request timed out after {0:?}")]
    Timeout(Duration),
}
