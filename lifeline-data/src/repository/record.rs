use rusqlite::types::Value;
use rusqlite::Row;
use serde::Serialize;

/// Sort applied to owner-scoped listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrder {
    /// Column to sort by; must be one of the record's columns
    pub column: &'static str,
    /// Newest / largest first
    pub descending: bool,
}

impl ListOrder {
    /// Ascending by `column`
    pub const fn asc(column: &'static str) -> Self {
        Self { column, descending: false }
    }

    /// Descending by `column`
    pub const fn desc(column: &'static str) -> Self {
        Self { column, descending: true }
    }

    pub(crate) fn sql(&self) -> String {
        let dir = if self.descending { "DESC" } else { "ASC" };
        format!("{} {}, id {}", self.column, dir, dir)
    }
}

/// A row that belongs to exactly one user through its `user_id` column
///
/// Implementors describe their table layout; the repository builds every
/// statement from these constants so each query carries the owner filter.
pub trait OwnedRecord: Serialize + Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Payload accepted on insert
    type New: Send + 'static;
    /// Partial update; `None` fields are left untouched
    type Patch: Send + 'static;

    /// Table name
    const TABLE: &'static str;
    /// All columns, in the order `from_row` reads them
    const COLUMNS: &'static [&'static str];
    /// Column stamped with the insertion time
    const TIMESTAMP_COLUMN: &'static str;
    /// Order used when listing a user's rows
    const DEFAULT_ORDER: ListOrder = ListOrder::asc("id");

    /// Build the record from a row selected with `COLUMNS`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Column/value pairs to insert (owner and timestamp excluded)
    fn insert_values(new: Self::New) -> Vec<(&'static str, Value)>;

    /// Column/value pairs for the fields present in the patch
    fn patch_values(patch: Self::Patch) -> Vec<(&'static str, Value)>;
}

/// Optional text into an SQL value
pub(crate) fn text(value: Option<String>) -> Value {
    value.map(Value::Text).unwrap_or(Value::Null)
}

/// Push `column = value` when the patch carries a value
pub(crate) fn set_text(values: &mut Vec<(&'static str, Value)>, column: &'static str, value: Option<String>) {
    if let Some(value) = value {
        values.push((column, Value::Text(value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_order_sql_breaks_ties_by_id() {
        assert_eq!(ListOrder::asc("id").sql(), "id ASC, id ASC");
        assert_eq!(
            ListOrder::desc("triggered_at").sql(),
            "triggered_at DESC, id DESC"
        );
    }

    #[test]
    fn test_set_text_skips_missing_values() {
        let mut values = Vec::new();
        set_text(&mut values, "name", None);
        set_text(&mut values, "dosage", Some("5mg".to_string()));

        assert_eq!(values.len(), 1);
        assert_eq!(values[0].0, "dosage");
        assert_eq!(values[0].1, Value::Text("5mg".to_string()));
    }
}
