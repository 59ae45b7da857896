use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::repository::{ListOrder, OwnedRecord};
use crate::repository::record::{set_text, text};

fn default_status() -> String {
    "active".to_string()
}

/// Storage model for a triggered emergency
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Emergency {
    pub id: i64,
    pub user_id: i64,
    pub location: Option<String>,
    /// Information responders need, e.g. allergies or conditions
    pub critical_info: Option<String>,
    pub status: String,
    pub triggered_at: String,
}

/// Input data for triggering an emergency; every field is optional
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewEmergency {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub critical_info: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

impl Default for NewEmergency {
    fn default() -> Self {
        Self {
            location: None,
            critical_info: None,
            status: default_status(),
        }
    }
}

/// Partial update for an emergency
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EmergencyPatch {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub critical_info: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl OwnedRecord for Emergency {
    type New = NewEmergency;
    type Patch = EmergencyPatch;

    const TABLE: &'static str = "emergencies";
    const COLUMNS: &'static [&'static str] =
        &["id", "user_id", "location", "critical_info", "status", "triggered_at"];
    const TIMESTAMP_COLUMN: &'static str = "triggered_at";
    const DEFAULT_ORDER: ListOrder = ListOrder::desc("triggered_at");

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            location: row.get("location")?,
            critical_info: row.get("critical_info")?,
            status: row.get("status")?,
            triggered_at: row.get("triggered_at")?,
        })
    }

    fn insert_values(new: NewEmergency) -> Vec<(&'static str, Value)> {
        vec![
            ("location", text(new.location)),
            ("critical_info", text(new.critical_info)),
            ("status", Value::Text(new.status)),
        ]
    }

    fn patch_values(patch: EmergencyPatch) -> Vec<(&'static str, Value)> {
        let mut values = Vec::new();
        set_text(&mut values, "location", patch.location);
        set_text(&mut values, "critical_info", patch.critical_info);
        set_text(&mut values, "status", patch.status);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_a_valid_emergency() {
        let new: NewEmergency = serde_json::from_str("{}").unwrap();
        assert_eq!(new.status, "active");
        assert!(new.location.is_none());
    }
}
