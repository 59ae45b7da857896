use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, OptionalExtension};
use tracing::debug;

use super::record::{ListOrder, OwnedRecord};
use super::{with_connection, RepositoryError};
use crate::database::DatabasePool;

/// Owner-scoped CRUD over one table
///
/// Every read, update and delete is filtered by `user_id`, so a caller can
/// never reach a row that belongs to somebody else.
#[async_trait]
pub trait RecordRepository<T: OwnedRecord>: Send + Sync {
    /// Insert a row owned by `user_id` and return it as stored
    async fn insert(&self, user_id: i64, new: T::New) -> Result<T, RepositoryError>;

    /// All rows owned by `user_id`
    async fn list(&self, user_id: i64, order: ListOrder) -> Result<Vec<T>, RepositoryError>;

    /// The row `id` if it belongs to `user_id`
    async fn find(&self, user_id: i64, id: i64) -> Result<Option<T>, RepositoryError>;

    /// Apply `patch` to row `id` owned by `user_id`; `None` when no row matched
    async fn update(&self, user_id: i64, id: i64, patch: T::Patch) -> Result<Option<T>, RepositoryError>;

    /// Delete row `id` owned by `user_id`; `true` when a row was removed
    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;
}

/// SQLite implementation of [`RecordRepository`]
pub struct SqliteRecordRepository<T> {
    pool: DatabasePool,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for SqliteRecordRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: OwnedRecord> SqliteRecordRepository<T> {
    /// Create a repository over the shared pool
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    fn select_columns() -> String {
        T::COLUMNS.join(", ")
    }
}

#[async_trait]
impl<T: OwnedRecord> RecordRepository<T> for SqliteRecordRepository<T> {
    async fn insert(&self, user_id: i64, new: T::New) -> Result<T, RepositoryError> {
        let mut values = T::insert_values(new);
        values.push(("user_id", Value::Integer(user_id)));
        values.push((T::TIMESTAMP_COLUMN, Value::Text(Utc::now().to_rfc3339())));

        debug!("Inserting into {} for user {}", T::TABLE, user_id);

        with_connection(&self.pool, move |conn| {
            let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
            let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                T::TABLE,
                columns.join(", "),
                placeholders.join(", "),
                Self::select_columns(),
            );

            let record = conn.query_row(
                &sql,
                params_from_iter(values.into_iter().map(|(_, value)| value)),
                |row| T::from_row(row),
            )?;
            Ok(record)
        })
        .await
    }

    async fn list(&self, user_id: i64, order: ListOrder) -> Result<Vec<T>, RepositoryError> {
        if !T::COLUMNS.contains(&order.column) {
            return Err(RepositoryError::Validation(format!(
                "{} cannot be ordered by {}",
                T::TABLE,
                order.column
            )));
        }

        with_connection(&self.pool, move |conn| {
            let sql = format!(
                "SELECT {} FROM {} WHERE user_id = ?1 ORDER BY {}",
                Self::select_columns(),
                T::TABLE,
                order.sql(),
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([user_id], |row| T::from_row(row))?;

            let mut result = Vec::new();
            for row in rows {
                result.push(row?);
            }
            Ok(result)
        })
        .await
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<T>, RepositoryError> {
        with_connection(&self.pool, move |conn| {
            let sql = format!(
                "SELECT {} FROM {} WHERE id = ?1 AND user_id = ?2",
                Self::select_columns(),
                T::TABLE,
            );
            let record = conn
                .query_row(&sql, [id, user_id], |row| T::from_row(row))
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn update(&self, user_id: i64, id: i64, patch: T::Patch) -> Result<Option<T>, RepositoryError> {
        let values = T::patch_values(patch);
        if values.is_empty() {
            return Err(RepositoryError::Validation("No fields to update".to_string()));
        }

        debug!("Updating {} row {} for user {}", T::TABLE, id, user_id);

        with_connection(&self.pool, move |conn| {
            let assignments: Vec<String> = values
                .iter()
                .enumerate()
                .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
                .collect();
            let id_param = values.len() + 1;
            let sql = format!(
                "UPDATE {} SET {} WHERE id = ?{} AND user_id = ?{} RETURNING {}",
                T::TABLE,
                assignments.join(", "),
                id_param,
                id_param + 1,
                Self::select_columns(),
            );

            let params = values
                .into_iter()
                .map(|(_, value)| value)
                .chain([Value::Integer(id), Value::Integer(user_id)]);
            let record = conn
                .query_row(&sql, params_from_iter(params), |row| T::from_row(row))
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        with_connection(&self.pool, move |conn| {
            let sql = format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", T::TABLE);
            let removed = conn.execute(&sql, [id, user_id])?;
            Ok(removed > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_pool, DatabaseConfig};
    use crate::models::emergency::{Emergency, NewEmergency};
    use crate::models::medicine::{Medicine, MedicinePatch, NewMedicine};

    fn medicines() -> SqliteRecordRepository<Medicine> {
        let pool = create_pool(&DatabaseConfig::in_memory()).unwrap();
        SqliteRecordRepository::new(pool)
    }

    fn new_medicine(name: &str) -> NewMedicine {
        NewMedicine {
            name: name.to_string(),
            dosage: Some("500mg".to_string()),
            frequency: Some("twice daily".to_string()),
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = medicines();

        let created = repo.insert(1, new_medicine("Metformin")).await.unwrap();
        assert_eq!(created.user_id, 1);
        assert_eq!(created.name, "Metformin");
        assert!(!created.created_at.is_empty());

        let found = repo.find(1, created.id).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.dosage.as_deref(), Some("500mg"));
    }

    #[tokio::test]
    async fn test_rows_are_scoped_to_their_owner() {
        let repo = medicines();

        let mine = repo.insert(1, new_medicine("Aspirin")).await.unwrap();
        repo.insert(2, new_medicine("Ibuprofen")).await.unwrap();

        let listed = repo.list(1, Medicine::DEFAULT_ORDER).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Aspirin");

        assert!(repo.find(2, mine.id).await.unwrap().is_none());

        let patch = MedicinePatch {
            dosage: Some("1g".to_string()),
            ..MedicinePatch::default()
        };
        assert!(repo.update(2, mine.id, patch).await.unwrap().is_none());

        assert!(!repo.delete(2, mine.id).await.unwrap());
        assert!(repo.find(1, mine.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_only_touches_supplied_fields() {
        let repo = medicines();
        let created = repo.insert(7, new_medicine("Lisinopril")).await.unwrap();

        let patch = MedicinePatch {
            dosage: Some("10mg".to_string()),
            ..MedicinePatch::default()
        };
        let updated = repo.update(7, created.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.dosage.as_deref(), Some("10mg"));
        assert_eq!(updated.name, "Lisinopril");
        assert_eq!(updated.frequency.as_deref(), Some("twice daily"));
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected() {
        let repo = medicines();
        let created = repo.insert(7, new_medicine("Lisinopril")).await.unwrap();

        let result = repo.update(7, created.id, MedicinePatch::default()).await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let repo = medicines();
        let created = repo.insert(3, new_medicine("Vitamin D")).await.unwrap();

        assert!(repo.delete(3, created.id).await.unwrap());
        assert!(repo.find(3, created.id).await.unwrap().is_none());
        assert!(!repo.delete(3, created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_honours_order() {
        let repo = medicines();
        let first = repo.insert(5, new_medicine("A")).await.unwrap();
        let second = repo.insert(5, new_medicine("B")).await.unwrap();

        let newest_first = repo.list(5, ListOrder::desc("id")).await.unwrap();
        assert_eq!(newest_first[0].id, second.id);
        assert_eq!(newest_first[1].id, first.id);

        let result = repo.list(5, ListOrder::asc("password")).await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_emergencies_default_to_newest_first() {
        let pool = create_pool(&DatabaseConfig::in_memory()).unwrap();
        let repo: SqliteRecordRepository<Emergency> = SqliteRecordRepository::new(pool);

        let older = repo.insert(1, NewEmergency::default()).await.unwrap();
        let newer = repo
            .insert(
                1,
                NewEmergency {
                    location: Some("Home".to_string()),
                    ..NewEmergency::default()
                },
            )
            .await
            .unwrap();

        let listed = repo.list(1, Emergency::DEFAULT_ORDER).await.unwrap();
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
        assert_eq!(listed[0].status, "active");
    }
}
