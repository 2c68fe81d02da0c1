//! # PeopleXD Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The resilient, token-authorized HTTP client
//! - The OAuth client-credentials token fetcher
//! - PeopleXD REST adapters and the `PeopleXdClient` facade
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `peoplexd-core` and `peoplexd-common`
//! - Contains all "impure" code (network, environment, files)

pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod peoplexd;

// Re-export commonly used items
pub use auth::ClientCredentialsFetcher;
pub use errors::InfraError;
pub use http::{ApiResponse, HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use peoplexd::{AppointmentApi, PeopleXdClient, ReferenceService};
