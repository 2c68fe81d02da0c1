//! PeopleXD provider adapters and client facade

pub mod appointments;
pub mod client;
pub mod reference;

pub use appointments::AppointmentApi;
pub use client::{PeopleXdClient, PeopleXdTokenManager};
pub use reference::ReferenceService;
