use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Storage model for a registered user
///
/// The password hash is kept off the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct User {
    pub id: i64,
    /// Stable identifier carried as the token subject
    pub auth_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub age: Option<i64>,
    pub blood_group: Option<String>,
    pub phone_no: Option<String>,
    pub created_at: String,
}

impl User {
    pub(crate) const COLUMNS: &'static str =
        "id, auth_id, name, email, password, age, blood_group, phone_no, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            auth_id: row.get("auth_id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            password_hash: row.get("password")?,
            age: row.get("age")?,
            blood_group: row.get("blood_group")?,
            phone_no: row.get("phone_no")?,
            created_at: row.get("created_at")?,
        })
    }

    /// The identity fields returned by `/api/users/me`
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            auth_id: self.auth_id.clone(),
            email: self.email.clone(),
        }
    }
}

/// Identity fields of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserSummary {
    pub id: i64,
    pub auth_id: String,
    pub email: String,
}

/// A user ready to be stored; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub auth_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: Option<i64>,
    pub blood_group: Option<String>,
    pub phone_no: Option<String>,
}

/// Profile fields a user may change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.blood_group.is_none() && self.phone_no.is_none()
    }
}
