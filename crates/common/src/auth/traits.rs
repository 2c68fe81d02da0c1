//! Traits at the token seams
//!
//! [`TokenFetcher`] abstracts the upstream token endpoint so the manager can
//! be tested without HTTP. [`AccessTokenProvider`] is what the request layer
//! consumes.

use std::sync::Arc;

use async_trait::async_trait;

use super::types::{TokenManagerError, TokenResponse};

/// Performs one token request against the upstream endpoint.
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Request a fresh token. Implementations must not retry internally.
    ///
    /// # Errors
    /// Returns the transport, rejection or decoding failure of the call.
    async fn fetch_token(&self) -> Result<TokenResponse, TokenManagerError>;
}

/// Source of bearer tokens for authorized calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Return the current token, fetching one if absent or expired.
    ///
    /// # Errors
    /// Returns the fetch failure when a new token was needed and could not
    /// be obtained.
    async fn use_or_fetch_token(&self) -> Result<String, TokenManagerError>;

    /// Discard the current token and obtain a new one.
    ///
    /// # Errors
    /// Returns the fetch failure.
    async fn force_refresh(&self) -> Result<String, TokenManagerError>;
}

#[async_trait]
impl<T: AccessTokenProvider + ?Sized> AccessTokenProvider for Arc<T> {
    async fn use_or_fetch_token(&self) -> Result<String, TokenManagerError> {
        (**self).use_or_fetch_token().await
    }

    async fn force_refresh(&self) -> Result<String, TokenManagerError> {
        (**self).force_refresh().await
    }
}

#[async_trait]
impl<T: TokenFetcher + ?Sized> TokenFetcher for Arc<T> {
    async fn fetch_token(&self) -> Result<TokenResponse, TokenManagerError> {
        (**self).fetch_token().await
    }
}
