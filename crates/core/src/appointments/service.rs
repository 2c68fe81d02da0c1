//! Appointment enrichment service - core business logic

use std::collections::HashMap;
use std::sync::Arc;

use peoplexd_domain::{ProcessedAppointment, RawAppointment, Result};
use tracing::{debug, error};

use super::merge::merge_appointments;
use super::ports::{AppointmentSource, ReferenceLookup};

/// Builds a staff member's normalized, human-readable appointment timeline.
pub struct AppointmentService {
    source: Arc<dyn AppointmentSource>,
    lookup: Arc<dyn ReferenceLookup>,
    title_code_substitutions: HashMap<String, String>,
}

impl AppointmentService {
    /// Create a new appointment service
    pub fn new(source: Arc<dyn AppointmentSource>, lookup: Arc<dyn ReferenceLookup>) -> Self {
        Self { source, lookup, title_code_substitutions: HashMap::new() }
    }

    /// Position codes to replace before title lookups.
    #[must_use]
    pub fn with_title_code_substitutions(mut self, substitutions: HashMap<String, String>) -> Self {
        self.title_code_substitutions = substitutions;
        self
    }

    /// Raw provider records, unmerged.
    pub async fn appointments(&self, staff_id: &str) -> Result<Vec<RawAppointment>> {
        self.source.raw_appointments(staff_id).await
    }

    /// The lookup code for a position, after substitution.
    #[must_use]
    pub fn title_lookup_code<'a>(&'a self, code: &'a str) -> &'a str {
        self.title_code_substitutions.get(code).map_or(code, String::as_str)
    }

    pub async fn full_department(&self, code: &str) -> Result<String> {
        self.lookup.full_department(code).await
    }

    pub async fn full_job_title(&self, code: &str) -> Result<String> {
        let lookup_code = self.title_lookup_code(code);
        if lookup_code != code {
            debug!(code, lookup_code, "substituting position code");
        }
        self.lookup.full_job_title(lookup_code).await
    }

    /// Fetch, merge and enrich a staff member's appointments.
    ///
    /// Lookups run one record at a time; the first failure aborts the whole
    /// call.
    pub async fn clean_appointments(&self, staff_id: &str) -> Result<Vec<ProcessedAppointment>> {
        let raw = self.appointments(staff_id).await?;
        let raw_count = raw.len();
        let mut timeline = merge_appointments(Some(raw));
        debug!(staff_id, raw_count, merged_count = timeline.len(), "merged appointments");

        for appointment in &mut timeline {
            appointment.full_department =
                self.full_department(&appointment.department).await.inspect_err(|err| {
                    error!(staff_id, department = %appointment.department, error = %err, "department lookup failed");
                })?;
            appointment.full_job_title =
                self.full_job_title(&appointment.job_title).await.inspect_err(|err| {
                    error!(staff_id, job_title = %appointment.job_title, error = %err, "job title lookup failed");
                })?;
        }

        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use peoplexd_domain::{Hierarchy, PeopleXdError};
    use tokio::sync::Mutex;

    use super::*;

    struct FixedSource(Vec<RawAppointment>);

    #[async_trait]
    impl AppointmentSource for FixedSource {
        async fn raw_appointments(&self, _staff_id: &str) -> Result<Vec<RawAppointment>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingLookup {
        title_codes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReferenceLookup for RecordingLookup {
        async fn full_department(&self, code: &str) -> Result<String> {
            Ok(format!("Department of {code}"))
        }

        async fn full_job_title(&self, code: &str) -> Result<String> {
            self.title_codes.lock().await.push(code.to_string());
            if code == "UNKNOWN" {
                return Err(PeopleXdError::DataNotFound(code.to_string()));
            }
            Ok(format!("Title {code}"))
        }
    }

    fn raw(id: &str, title: &str, start: &str, end: &str) -> RawAppointment {
        RawAppointment {
            appointment_id: id.to_string(),
            job_title: title.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            hierarchy: Hierarchy { department: "CS".to_string(), ..Hierarchy::default() },
            ..RawAppointment::default()
        }
    }

    #[tokio::test]
    async fn test_clean_appointments_merges_then_enriches() {
        let source = FixedSource(vec![
            raw("A1", "LECT", "20200101", "20200630"),
            raw("A2", "LECT", "20200701", "20201231"),
            raw("A3", "HPAL", "20210101", "20211231"),
        ]);
        let lookup = Arc::new(RecordingLookup::default());
        let service = AppointmentService::new(Arc::new(source), lookup.clone())
            .with_title_code_substitutions(HashMap::from([("HPAL".to_string(), "AL".to_string())]));

        let timeline = service.clean_appointments("12345").await.unwrap();

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].full_department, "Department of CS");
        assert_eq!(timeline[0].full_job_title, "Title LECT");
        assert_eq!(timeline[0].end_date, "20201231");
        assert_eq!(timeline[1].job_title, "HPAL");
        assert_eq!(timeline[1].full_job_title, "Title AL");
        assert_eq!(*lookup.title_codes.lock().await, ["LECT", "AL"]);
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let source = FixedSource(vec![raw("A1", "UNKNOWN", "20200101", "20201231")]);
        let service =
            AppointmentService::new(Arc::new(source), Arc::new(RecordingLookup::default()));

        let err = service.clean_appointments("12345").await.unwrap_err();
        assert_eq!(err, PeopleXdError::DataNotFound("UNKNOWN".to_string()));
    }

    #[tokio::test]
    async fn test_no_appointments_skips_lookups() {
        let lookup = Arc::new(RecordingLookup::default());
        let service = AppointmentService::new(Arc::new(FixedSource(Vec::new())), lookup.clone());

        assert!(service.clean_appointments("12345").await.unwrap().is_empty());
        assert!(lookup.title_codes.lock().await.is_empty());
    }

    #[test]
    fn title_lookup_code_falls_back_to_input() {
        let service = AppointmentService::new(
            Arc::new(FixedSource(Vec::new())),
            Arc::new(RecordingLookup::default()),
        )
        .with_title_code_substitutions(HashMap::from([("HPAL".to_string(), "AL".to_string())]));

        assert_eq!(service.title_lookup_code("HPAL"), "AL");
        assert_eq!(service.title_lookup_code("LECT"), "LECT");
    }
}
