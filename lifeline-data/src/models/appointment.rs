use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::repository::OwnedRecord;
use crate::repository::record::set_text;

fn default_status() -> String {
    "pending".to_string()
}

/// Storage model for a doctor appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Appointment {
    pub id: i64,
    pub user_id: i64,
    pub doctor_name: String,
    pub hospital_name: String,
    pub appointment_date: String,
    /// Free-form status, "pending" unless the client says otherwise
    pub status: String,
    pub created_at: String,
}

/// Input data for booking an appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewAppointment {
    pub doctor_name: String,
    pub hospital_name: String,
    pub appointment_date: String,
    #[serde(default = "default_status")]
    pub status: String,
}

/// Partial update for an appointment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AppointmentPatch {
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub appointment_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl OwnedRecord for Appointment {
    type New = NewAppointment;
    type Patch = AppointmentPatch;

    const TABLE: &'static str = "appointments";
    const COLUMNS: &'static [&'static str] = &[
        "id", "user_id", "doctor_name", "hospital_name", "appointment_date", "status", "created_at",
    ];
    const TIMESTAMP_COLUMN: &'static str = "created_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            doctor_name: row.get("doctor_name")?,
            hospital_name: row.get("hospital_name")?,
            appointment_date: row.get("appointment_date")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert_values(new: NewAppointment) -> Vec<(&'static str, Value)> {
        vec![
            ("doctor_name", Value::Text(new.doctor_name)),
            ("hospital_name", Value::Text(new.hospital_name)),
            ("appointment_date", Value::Text(new.appointment_date)),
            ("status", Value::Text(new.status)),
        ]
    }

    fn patch_values(patch: AppointmentPatch) -> Vec<(&'static str, Value)> {
        let mut values = Vec::new();
        set_text(&mut values, "doctor_name", patch.doctor_name);
        set_text(&mut values, "hospital_name", patch.hospital_name);
        set_text(&mut values, "appointment_date", patch.appointment_date);
        set_text(&mut values, "status", patch.status);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_pending() {
        let new: NewAppointment = serde_json::from_str(
            r#"{"doctor_name":"Dr. Rao","hospital_name":"City Care","appointment_date":"2024-05-01"}"#,
        )
        .unwrap();
        assert_eq!(new.status, "pending");
    }
}
