//! Interval-merge engine for provider appointments
//!
//! Collapses a staff member's appointment records into a timeline where
//! consecutive records for the same job title and department, separated by
//! at most [`MERGE_GAP_THRESHOLD_DAYS`] days (or overlapping), become one
//! entry.
//!
//! Records are folded in start-date order. When either the running entry's
//! end date or the next record's start date is missing or unparseable, the
//! next record is dropped and the running entry is left as is.

use chrono::NaiveDate;
use peoplexd_domain::constants::{MERGE_GAP_THRESHOLD_DAYS, PROVIDER_DATE_FORMAT};
use peoplexd_domain::{PeopleXdError, ProcessedAppointment, RawAppointment, Result};
use tracing::{debug, warn};

/// Parse a provider `YYYYMMDD` date.
///
/// # Errors
/// Returns `PeopleXdError::MalformedInterval` for empty input or anything
/// that is not a valid calendar date in that format.
pub fn parse_provider_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PeopleXdError::MalformedInterval("missing date".to_string()));
    }
    if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PeopleXdError::MalformedInterval(format!(
            "'{trimmed}' is not a YYYYMMDD date"
        )));
    }
    NaiveDate::parse_from_str(trimmed, PROVIDER_DATE_FORMAT)
        .map_err(|err| PeopleXdError::MalformedInterval(format!("'{trimmed}': {err}")))
}

/// Signed whole days from `end` to `start`; negative means overlap.
fn gap_days(end: NaiveDate, start: NaiveDate) -> i64 {
    (start - end).num_days()
}

/// Merge an optional list of raw appointments. Absent or empty input yields
/// an empty timeline.
#[must_use]
pub fn merge_appointments(raw: Option<Vec<RawAppointment>>) -> Vec<ProcessedAppointment> {
    raw.map_or_else(Vec::new, |records| merge_appointment_slice(&records))
}

/// Merge raw appointments into a normalized timeline.
///
/// The input is not modified. Records whose start date does not parse sort
/// after all others, keeping their relative order.
#[must_use]
pub fn merge_appointment_slice(records: &[RawAppointment]) -> Vec<ProcessedAppointment> {
    let mut sorted: Vec<&RawAppointment> = records.iter().collect();
    sorted.sort_by_key(|record| {
        let start = parse_provider_date(&record.start_date).ok();
        (start.is_none(), start)
    });

    let mut remaining = sorted.into_iter();
    let Some(first) = remaining.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    let mut current = ProcessedAppointment::from(first);

    for candidate in remaining {
        let (current_end, candidate_start) =
            match (parse_provider_date(&current.end_date), parse_provider_date(&candidate.start_date))
            {
                (Ok(end), Ok(start)) => (end, start),
                (end, start) => {
                    warn!(
                        appointment_id = %candidate.appointment_id,
                        current_id = %current.appointment_id,
                        end_ok = end.is_ok(),
                        start_ok = start.is_ok(),
                        "skipping appointment with missing start or end date"
                    );
                    continue;
                }
            };

        let gap = gap_days(current_end, candidate_start);
        debug!(
            current_id = %current.appointment_id,
            appointment_id = %candidate.appointment_id,
            gap_days = gap,
            "comparing appointments"
        );

        if continues(&current, candidate, gap) {
            extend(&mut current, candidate, current_end);
        } else {
            merged.push(std::mem::replace(&mut current, ProcessedAppointment::from(candidate)));
        }
    }

    merged.push(current);
    merged
}

fn continues(current: &ProcessedAppointment, candidate: &RawAppointment, gap: i64) -> bool {
    current.job_title == candidate.job_title
        && current.department == candidate.department()
        && gap <= MERGE_GAP_THRESHOLD_DAYS
}

/// Only the end date moves; id, flag and start date stay with the first
/// record of the run.
fn extend(current: &mut ProcessedAppointment, candidate: &RawAppointment, current_end: NaiveDate) {
    match parse_provider_date(&candidate.end_date) {
        Ok(candidate_end) if candidate_end > current_end => {
            current.end_date.clone_from(&candidate.end_date);
        }
        Ok(_) => {}
        Err(err) => {
            debug!(
                appointment_id = %candidate.appointment_id,
                error = %err,
                "merged appointment has no usable end date; keeping current end"
            );
        }
    }
}
