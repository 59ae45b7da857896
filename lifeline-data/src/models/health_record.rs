use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::repository::OwnedRecord;
use crate::repository::record::{set_text, text};

/// Storage model for a health record entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthRecord {
    pub id: i64,
    pub user_id: i64,
    /// Kind of record, e.g. "allergy" or "vaccination"
    pub record_type: String,
    pub description: Option<String>,
    /// Date the record refers to, as sent by the client
    pub date: Option<String>,
    pub created_at: String,
}

/// Input data for creating a health record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewHealthRecord {
    pub record_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Partial update for a health record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthRecordPatch {
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl OwnedRecord for HealthRecord {
    type New = NewHealthRecord;
    type Patch = HealthRecordPatch;

    const TABLE: &'static str = "health_records";
    const COLUMNS: &'static [&'static str] =
        &["id", "user_id", "record_type", "description", "date", "created_at"];
    const TIMESTAMP_COLUMN: &'static str = "created_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            record_type: row.get("record_type")?,
            description: row.get("description")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert_values(new: NewHealthRecord) -> Vec<(&'static str, Value)> {
        vec![
            ("record_type", Value::Text(new.record_type)),
            ("description", text(new.description)),
            ("date", text(new.date)),
        ]
    }

    fn patch_values(patch: HealthRecordPatch) -> Vec<(&'static str, Value)> {
        let mut values = Vec::new();
        set_text(&mut values, "record_type", patch.record_type);
        set_text(&mut values, "description", patch.description);
        set_text(&mut values, "date", patch.date);
        values
    }
}
