//! Appointment timeline normalization

pub mod merge;
pub mod ports;
pub mod service;

pub use service::AppointmentService;
