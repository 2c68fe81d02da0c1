//! Appointment records endpoint

use async_trait::async_trait;
use peoplexd_core::AppointmentSource;
use peoplexd_domain::constants::APPOINTMENT_ENDPOINT;
use peoplexd_domain::{ItemsEnvelope, RawAppointment, Result};
use tracing::debug;

use crate::http::HttpClient;

/// Reads raw appointments from `v1/person/appointment/{staffId}`.
#[derive(Clone)]
pub struct AppointmentApi {
    http: HttpClient,
}

impl AppointmentApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AppointmentSource for AppointmentApi {
    async fn raw_appointments(&self, staff_id: &str) -> Result<Vec<RawAppointment>> {
        let path = format!("{APPOINTMENT_ENDPOINT}/{}", urlencoding::encode(staff_id));
        let envelope: ItemsEnvelope<RawAppointment> = self.http.get(&path).await?.json()?;
        debug!(staff_id, count = envelope.items.len(), "fetched raw appointments");
        Ok(envelope.items)
    }
}
