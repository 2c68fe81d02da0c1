//! Authorized HTTP access to the PeopleXD API

pub mod client;

pub use client::{is_idempotent, ApiResponse, HttpClient, HttpClientBuilder};
