//! # PeopleXD Domain
//!
//! Business domain types and models for the PeopleXD client.
//!
//! This crate contains:
//! - Appointment types (raw provider records, merged timeline entries)
//! - Domain error types and Result definitions
//! - Client configuration structures
//! - Domain constants (endpoints, defaults, merge threshold)
//!
//! ## Architecture
//! - No dependencies on other PeopleXD crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
