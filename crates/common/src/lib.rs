//! Common runtime pieces shared across PeopleXD client crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: token types, token store and token errors
//! - `runtime`: clock abstraction and the async token lifecycle manager

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use auth::{Token, TokenManagerError, TokenResponse, TokenStore};
#[cfg(feature = "runtime")]
pub use auth::{AccessTokenProvider, TokenFetcher, TokenManager, TokenManagerConfig};
#[cfg(feature = "runtime")]
pub use time::{Clock, MockClock, SystemClock};
