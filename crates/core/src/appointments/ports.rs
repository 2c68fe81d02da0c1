//! Port interfaces for appointment data

use async_trait::async_trait;
use peoplexd_domain::{RawAppointment, Result};

/// Source of raw provider appointment records.
#[async_trait]
pub trait AppointmentSource: Send + Sync {
    /// All appointment records for one staff member, in provider order.
    async fn raw_appointments(&self, staff_id: &str) -> Result<Vec<RawAppointment>>;
}

/// Resolves provider codes into display strings.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Full department name for a department code.
    async fn full_department(&self, code: &str) -> Result<String>;

    /// Full job title for a position code. Callers apply any code
    /// substitution before calling.
    async fn full_job_title(&self, code: &str) -> Result<String>;
}
