//! In-memory holder for the current bearer token.
//!
//! No network or locking logic lives here; the token manager wraps the store
//! in a lock and is its only writer.

use std::time::Instant;

use super::types::Token;

/// Holds at most one token.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: Option<Token>,
}

impl TokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token, valid or not.
    #[must_use]
    pub fn get(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Replace the current token.
    pub fn set(&mut self, token: Token) {
        self.token = Some(token);
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    /// Current token if it has not expired at `now`.
    #[must_use]
    pub fn valid_token(&self, now: Instant) -> Option<&Token> {
        self.token.as_ref().filter(|token| token.is_valid_at(now))
    }
}
