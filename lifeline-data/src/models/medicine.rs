use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::repository::OwnedRecord;
use crate::repository::record::{set_text, text};

/// Storage model for a medicine the user takes or took
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Medicine {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
}

/// Input data for creating a medicine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewMedicine {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Partial update for a medicine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MedicinePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl OwnedRecord for Medicine {
    type New = NewMedicine;
    type Patch = MedicinePatch;

    const TABLE: &'static str = "medicines";
    const COLUMNS: &'static [&'static str] = &[
        "id", "user_id", "name", "dosage", "frequency", "start_date", "end_date", "created_at",
    ];
    const TIMESTAMP_COLUMN: &'static str = "created_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            dosage: row.get("dosage")?,
            frequency: row.get("frequency")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert_values(new: NewMedicine) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::Text(new.name)),
            ("dosage", text(new.dosage)),
            ("frequency", text(new.frequency)),
            ("start_date", text(new.start_date)),
            ("end_date", text(new.end_date)),
        ]
    }

    fn patch_values(patch: MedicinePatch) -> Vec<(&'static str, Value)> {
        let mut values = Vec::new();
        set_text(&mut values, "name", patch.name);
        set_text(&mut values, "dosage", patch.dosage);
        set_text(&mut values, "frequency", patch.frequency);
        set_text(&mut values, "start_date", patch.start_date);
        set_text(&mut values, "end_date", patch.end_date);
        values
    }
}
