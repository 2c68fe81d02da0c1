//! Infrastructure-side error conversions

pub mod conversions;

pub use conversions::{token_error, InfraError};
