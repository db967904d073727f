//! User row codec and DTOs.

use agora_core::email::Email;
use agora_core::error::CoreError;
use agora_core::types::DbId;
use agora_core::user::{User, UserId};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

/// Column list shared across queries, in [`UserRow`] field order.
pub const COLUMNS: &str = "id, email, username, first_name, last_name, password";

/// Raw `users` row, keyed by storage column names.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl UserRow {
    /// Decode an untyped result row into a [`User`].
    ///
    /// Every column must be present with the expected primitive type and the
    /// stored email must still be well formed. Anything else means the stored
    /// data is corrupt and is reported as [`CoreError::Decode`].
    pub fn decode(row: &SqliteRow) -> Result<User, CoreError> {
        let shaped = UserRow::from_row(row).map_err(|e| CoreError::Decode(e.to_string()))?;
        User::try_from(shaped)
    }

    /// Map an entity onto storage column names. No validation: the entity is
    /// valid by construction.
    pub fn encode(user: &User) -> UserRow {
        UserRow {
            id: user.id.get(),
            email: user.email.as_str().to_string(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password: user.password.clone(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(row.email)
            .map_err(|e| CoreError::Decode(format!("stored email for user {}: {e}", row.id)))?;

        Ok(User {
            id: UserId::new(row.id),
            email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            password: row.password,
        })
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        UserRow::encode(user)
    }
}

/// Safe user representation for API responses (no password).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// DTO for creating a new user. Fields are already trimmed and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub email: Email,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// DTO for editing an existing user. Fields are already trimmed and
/// validated. `email: None` keeps the current address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditUser {
    pub email: Option<Email>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}
