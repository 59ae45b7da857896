use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::repository::OwnedRecord;
use crate::repository::record::set_text;

fn default_status() -> String {
    "open".to_string()
}

/// Storage model for a request for blood donors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BloodRequest {
    pub id: i64,
    pub user_id: i64,
    pub blood_group: String,
    pub hospital_name: String,
    /// Phone number or other contact detail for donors
    pub contact: String,
    pub status: String,
    pub created_at: String,
}

/// Input data for opening a blood request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewBloodRequest {
    pub blood_group: String,
    pub hospital_name: String,
    pub contact: String,
    #[serde(default = "default_status")]
    pub status: String,
}

/// Partial update for a blood request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BloodRequestPatch {
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl OwnedRecord for BloodRequest {
    type New = NewBloodRequest;
    type Patch = BloodRequestPatch;

    const TABLE: &'static str = "blood_requests";
    const COLUMNS: &'static [&'static str] = &[
        "id", "user_id", "blood_group", "hospital_name", "contact", "status", "created_at",
    ];
    const TIMESTAMP_COLUMN: &'static str = "created_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            blood_group: row.get("blood_group")?,
            hospital_name: row.get("hospital_name")?,
            contact: row.get("contact")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert_values(new: NewBloodRequest) -> Vec<(&'static str, Value)> {
        vec![
            ("blood_group", Value::Text(new.blood_group)),
            ("hospital_name", Value::Text(new.hospital_name)),
            ("contact", Value::Text(new.contact)),
            ("status", Value::Text(new.status)),
        ]
    }

    fn patch_values(patch: BloodRequestPatch) -> Vec<(&'static str, Value)> {
        let mut values = Vec::new();
        set_text(&mut values, "blood_group", patch.blood_group);
        set_text(&mut values, "hospital_name", patch.hospital_name);
        set_text(&mut values, "contact", patch.contact);
        set_text(&mut values, "status", patch.status);
        values
    }
}
