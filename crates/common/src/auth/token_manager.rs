//! Token manager with coalesced fetching
//!
//! Manages the client-credentials token lifecycle:
//! - Reuse of the current token until its skewed expiry
//! - Single-flight fetch: concurrent callers share one upstream request
//! - Forced refresh after the upstream rejects a token
//! - Bounded fetch time

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::store::TokenStore;
use super::traits::{AccessTokenProvider, TokenFetcher};
use super::types::{Token, TokenManagerError, MAX_TOKEN_LIFETIME};
use crate::time::{Clock, SystemClock};

type SharedFetch = Shared<BoxFuture<'static, Result<String, TokenManagerError>>>;

const DEFAULT_SKEW: Duration = Duration::from_secs(60);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Token manager settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenManagerConfig {
    /// Subtracted from the server-reported lifetime
    pub skew: Duration,
    /// Upper bound for one token fetch
    pub request_timeout: Duration,
}

impl Default for TokenManagerConfig {
    fn default() -> Self {
        Self { skew: DEFAULT_SKEW, request_timeout: DEFAULT_REQUEST_TIMEOUT }
    }
}

/// Token manager with single-flight fetching
///
/// At most one fetch is in flight at any time. Every caller that observes an
/// absent or expired token while a fetch is running awaits that same fetch
/// and receives the same token or the same error.
pub struct TokenManager<F: TokenFetcher + 'static, C: Clock + 'static = SystemClock> {
    fetcher: Arc<F>,
    clock: Arc<C>,
    store: Arc<RwLock<TokenStore>>,
    in_flight: Mutex<Option<SharedFetch>>,
    config: TokenManagerConfig,
}

impl<F: TokenFetcher + 'static> TokenManager<F> {
    /// Create a manager backed by the system clock.
    #[must_use]
    pub fn new(fetcher: F, config: TokenManagerConfig) -> Self {
        Self::with_clock(fetcher, SystemClock, config)
    }
}

impl<F: TokenFetcher + 'static, C: Clock + 'static> TokenManager<F, C> {
    /// Create a manager with an explicit clock.
    #[must_use]
    pub fn with_clock(fetcher: F, clock: C, config: TokenManagerConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            clock: Arc::new(clock),
            store: Arc::new(RwLock::new(TokenStore::new())),
            in_flight: Mutex::new(None),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> TokenManagerConfig {
        self.config
    }

    /// Current token if one is held and not expired. Never fetches.
    #[must_use]
    pub fn current_token(&self) -> Option<Token> {
        self.store.read().valid_token(self.clock.now()).cloned()
    }

    /// Time left on the current token, if any.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<u64> {
        let now = self.clock.now();
        self.store.read().get().map(|token| token.remaining(now).as_secs())
    }

    /// Get a valid access token, fetching one if needed.
    ///
    /// # Errors
    /// Returns the fetch error when no valid token is held and the fetch
    /// fails; the stored token is left unchanged in that case.
    pub async fn use_or_fetch_token(&self) -> Result<String, TokenManagerError> {
        if let Some(token) = self.current_token() {
            return Ok(token.access_token().to_string());
        }
        self.acquire(false).await
    }

    /// Discard the current token and fetch a new one.
    ///
    /// Joins a fetch that is already running instead of starting a second
    /// one.
    ///
    /// # Errors
    /// Returns the fetch error.
    pub async fn force_refresh(&self) -> Result<String, TokenManagerError> {
        debug!("forcing token refresh");
        self.acquire(true).await
    }

    async fn acquire(&self, force: bool) -> Result<String, TokenManagerError> {
        let fetch = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some(pending) if pending.peek().is_none() => {
                    debug!("joining in-flight token fetch");
                    pending.clone()
                }
                _ => {
                    if force {
                        self.store.write().clear();
                    } else if let Some(token) = self.current_token() {
                        // Another caller finished a fetch while we waited for the slot
                        return Ok(token.access_token().to_string());
                    }
                    let fetch = self.start_fetch();
                    *slot = Some(fetch.clone());
                    fetch
                }
            }
        };

        let result = fetch.clone().await;

        let mut slot = self.in_flight.lock();
        if slot.as_ref().is_some_and(|pending| pending.ptr_eq(&fetch)) {
            *slot = None;
        }
        drop(slot);

        result
    }

    fn start_fetch(&self) -> SharedFetch {
        let fetcher = Arc::clone(&self.fetcher);
        let clock = Arc::clone(&self.clock);
        let store = Arc::clone(&self.store);
        let TokenManagerConfig { skew, request_timeout } = self.config;

        async move {
            debug!(timeout_ms = request_timeout.as_millis(), "requesting access token");
            let response = match tokio::time::timeout(request_timeout, fetcher.fetch_token()).await
            {
                Ok(Ok(response)) => response,
                Ok(Err(err)) => {
                    warn!(error = %err, "token fetch failed");
                    return Err(err);
                }
                Err(_) => {
                    warn!(timeout_ms = request_timeout.as_millis(), "token fetch timed out");
                    return Err(TokenManagerError::Timeout(request_timeout));
                }
            };

            if Duration::from_secs(response.expires_in) > MAX_TOKEN_LIFETIME {
                warn!(
                    expires_in = response.expires_in,
                    max_secs = MAX_TOKEN_LIFETIME.as_secs(),
                    "token lifetime capped"
                );
            }
            let token = Token::from_response(&response, clock.now(), skew);
            let access = token.access_token().to_string();
            store.write().set(token);

            info!(expires_in = response.expires_in, skew_secs = skew.as_secs(), "access token issued");
            Ok(access)
        }
        .boxed()
        .shared()
    }
}

#[async_trait]
impl<F: TokenFetcher + 'static, C: Clock + 'static> AccessTokenProvider for TokenManager<F, C> {
    async fn use_or_fetch_token(&self) -> Result<String, TokenManagerError> {
        TokenManager::use_or_fetch_token(self).await
    }

    async fn force_refresh(&self) -> Result<String, TokenManagerError> {
        TokenManager::force_refresh(self).await
    }
}
