//! # PeopleXD Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The appointment interval-merge engine
//! - Port interfaces (traits) for the appointment source and reference
//!   lookups
//! - The appointment enrichment service
//!
//! ## Architecture Principles
//! - Only depends on `peoplexd-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod appointments;

// Re-export specific items to avoid ambiguity
pub use appointments::merge::{merge_appointment_slice, merge_appointments, parse_provider_date};
pub use appointments::ports::{AppointmentSource, ReferenceLookup};
pub use appointments::AppointmentService;
