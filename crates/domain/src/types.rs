//! Appointment data types exchanged with the PeopleXD provider

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::PRIMARY_FLAG_YES;

/// Organisational hierarchy nested inside every provider appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hierarchy {
    #[serde(deserialize_with = "null_as_default")]
    pub structure_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub management_unit: String,
    #[serde(deserialize_with = "null_as_default")]
    pub department: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cost_centre: String,
    #[serde(deserialize_with = "null_as_default")]
    pub division: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub work_group: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user1: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user2: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user3: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user4: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user5: String,
}

/// Appointment record as returned by `v1/person/appointment/{staffId}`.
///
/// Dates are `YYYYMMDD` strings; missing and `null` fields deserialize as
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAppointment {
    #[serde(deserialize_with = "null_as_default")]
    pub appointment_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub appointment_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub employee_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub primary_flag: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sub_category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_amended_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_end_date: String,
    #[serde(rename = "FTE", deserialize_with = "null_as_default")]
    pub fte: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contract_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job_category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub project: String,
    #[serde(deserialize_with = "null_as_default")]
    pub post_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reason_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hierarchy: Hierarchy,
}

impl RawAppointment {
    /// Department code from the nested hierarchy.
    #[must_use]
    pub fn department(&self) -> &str {
        &self.hierarchy.department
    }

    /// Whether the provider marked this as the primary appointment.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.primary_flag == PRIMARY_FLAG_YES
    }
}

/// Merged appointment in the normalized timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedAppointment {
    pub appointment_id: String,
    pub primary_flag: bool,
    pub job_title: String,
    pub full_job_title: String,
    pub department: String,
    pub full_department: String,
    pub start_date: String,
    pub end_date: String,
}

impl From<&RawAppointment> for ProcessedAppointment {
    /// Seeds a timeline entry; the display fields hold the raw codes until
    /// the lookup services enrich them.
    fn from(raw: &RawAppointment) -> Self {
        Self {
            appointment_id: raw.appointment_id.clone(),
            primary_flag: raw.is_primary(),
            job_title: raw.job_title.clone(),
            full_job_title: raw.job_title.clone(),
            department: raw.department().to_string(),
            full_department: raw.department().to_string(),
            start_date: raw.start_date.clone(),
            end_date: raw.end_date.clone(),
        }
    }
}

/// Envelope used by every PeopleXD collection endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Entry of a reference-type lookup (`DEPT`, `POSTTL`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceItem {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub active: String,
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
