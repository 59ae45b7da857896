use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use tracing::debug;

use super::{with_connection, RepositoryError};
use crate::database::DatabasePool;
use crate::models::user::{NewUser, User, UserPatch};

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user; duplicate email or auth id is a constraint error
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Look up the user a token subject refers to
    async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Apply the non-empty fields of `patch`; `None` when the user is gone
    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// SQLite implementation of [`UserRepository`]
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn find_by(&self, column: &'static str, value: String) -> Result<Option<User>, RepositoryError> {
        with_connection(&self.pool, move |conn| {
            let sql = format!("SELECT {} FROM users WHERE {} = ?1", User::COLUMNS, column);
            let user = conn.query_row(&sql, [value], |row| User::from_row(row)).optional()?;
            Ok(user)
        })
        .await
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        debug!("Registering user {}", user.email);

        with_connection(&self.pool, move |conn| {
            let sql = format!(
                "INSERT INTO users (auth_id, name, email, password, age, blood_group, phone_no, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 RETURNING {}",
                User::COLUMNS
            );
            let created = conn.query_row(
                &sql,
                params![
                    user.auth_id,
                    user.name,
                    user.email,
                    user.password_hash,
                    user.age,
                    user.blood_group,
                    user.phone_no,
                    Utc::now().to_rfc3339(),
                ],
                |row| User::from_row(row),
            )?;
            Ok(created)
        })
        .await
    }

    async fn find_by_auth_id(&self, auth_id: &str) -> Result<Option<User>, RepositoryError> {
        self.find_by("auth_id", auth_id.to_string()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.find_by("email", email.to_string()).await
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, RepositoryError> {
        let mut values: Vec<(&'static str, Value)> = Vec::new();
        if let Some(name) = patch.name {
            values.push(("name", Value::Text(name)));
        }
        if let Some(age) = patch.age {
            values.push(("age", Value::Integer(age)));
        }
        if let Some(blood_group) = patch.blood_group {
            values.push(("blood_group", Value::Text(blood_group)));
        }
        if let Some(phone_no) = patch.phone_no {
            values.push(("phone_no", Value::Text(phone_no)));
        }
        if values.is_empty() {
            return Err(RepositoryError::Validation("No fields to update".to_string()));
        }

        with_connection(&self.pool, move |conn| {
            let assignments: Vec<String> = values
                .iter()
                .enumerate()
                .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
                .collect();
            let sql = format!(
                "UPDATE users SET {} WHERE id = ?{} RETURNING {}",
                assignments.join(", "),
                values.len() + 1,
                User::COLUMNS
            );
            let params = values
                .into_iter()
                .map(|(_, value)| value)
                .chain(std::iter::once(Value::Integer(id)));
            let user = conn
                .query_row(&sql, params_from_iter(params), |row| User::from_row(row))
                .optional()?;
            Ok(user)
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        with_connection(&self.pool, move |conn| {
            let removed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
        .await
    }
}
