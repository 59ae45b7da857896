use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::repository::OwnedRecord;
use crate::repository::record::{set_text, text};

/// Storage model for a medical report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    /// Public URL of the uploaded file, if any
    pub file_url: Option<String>,
    pub description: Option<String>,
    pub report_type: Option<String>,
    /// Text recognised from the uploaded file
    pub text_content: Option<String>,
    /// Plain-language summary produced by the language model
    pub ai_summary: Option<String>,
    pub uploaded_at: String,
}

/// Input data for creating a report
///
/// `text_content` is only filled in by the upload pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewReport {
    pub title: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(skip_deserializing)]
    #[cfg_attr(feature = "openapi", schema(read_only))]
    pub text_content: Option<String>,
}

/// Partial update for a report
///
/// `ai_summary` is written by the summariser, never by clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ReportPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub report_type: Option<String>,
    #[serde(skip_deserializing)]
    #[cfg_attr(feature = "openapi", schema(read_only))]
    pub ai_summary: Option<String>,
}

impl OwnedRecord for Report {
    type New = NewReport;
    type Patch = ReportPatch;

    const TABLE: &'static str = "reports";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "title",
        "file_url",
        "description",
        "report_type",
        "text_content",
        "ai_summary",
        "uploaded_at",
    ];
    const TIMESTAMP_COLUMN: &'static str = "uploaded_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            file_url: row.get("file_url")?,
            description: row.get("description")?,
            report_type: row.get("report_type")?,
            text_content: row.get("text_content")?,
            ai_summary: row.get("ai_summary")?,
            uploaded_at: row.get("uploaded_at")?,
        })
    }

    fn insert_values(new: NewReport) -> Vec<(&'static str, Value)> {
        vec![
            ("title", Value::Text(new.title)),
            ("file_url", text(new.file_url)),
            ("description", text(new.description)),
            ("report_type", text(new.report_type)),
            ("text_content", text(new.text_content)),
        ]
    }

    fn patch_values(patch: ReportPatch) -> Vec<(&'static str, Value)> {
        let mut values = Vec::new();
        set_text(&mut values, "title", patch.title);
        set_text(&mut values, "file_url", patch.file_url);
        set_text(&mut values, "description", patch.description);
        set_text(&mut values, "report_type", patch.report_type);
        set_text(&mut values, "ai_summary", patch.ai_summary);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_cannot_set_server_fields() {
        let new: NewReport =
            serde_json::from_str(r#"{"title":"CBC","text_content":"forged"}"#).unwrap();
        assert!(new.text_content.is_none());

        let patch: ReportPatch = serde_json::from_str(r#"{"ai_summary":"forged"}"#).unwrap();
        assert!(Report::patch_values(patch).is_empty());
    }
}
