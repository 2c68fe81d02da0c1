//! Token endpoint adapters

pub mod client_credentials;

pub use client_credentials::ClientCredentialsFetcher;
