//! OAuth client-credentials token lifecycle
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   TokenManager   │  single-flight fetch + expiry checks
//! └────────┬─────────┘
//!          │
//!          ├──► TokenFetcher   (upstream token endpoint, injected)
//!          ├──► TokenStore     (current token, owned by the manager)
//!          └──► Clock          (expiry math, mockable)
//! ```
//!
//! The manager implements [`AccessTokenProvider`], which is the only thing
//! the request layer depends on.
//!
//! # Module Organization
//!
//! - **[`types`]**: `Token`, `TokenResponse`, `TokenManagerError`
//! - **[`store`]**: `TokenStore`
//! - **`traits`**: `TokenFetcher`, `AccessTokenProvider` (runtime tier)
//! - **`token_manager`**: `TokenManager` (runtime tier)

pub mod store;
pub mod types;

#[cfg(feature = "runtime")]
pub mod token_manager;
#[cfg(feature = "runtime")]
pub mod traits;

pub use store::TokenStore;
#[cfg(feature = "runtime")]
pub use token_manager::{TokenManager, TokenManagerConfig};
#[cfg(feature = "runtime")]
pub use traits::{AccessTokenProvider, TokenFetcher};
pub use types::{Token, TokenManagerError, TokenResponse, MAX_TOKEN_LIFETIME};
