//! Repository for the `users` table.
//!
//! Sole authority for reading and writing users. Uniqueness of `email` and
//! `username` is checked inside the same transaction as the write, and the
//! table's UNIQUE constraints back that up: a violation that slips past the
//! pre-check is reported as the same "already taken" error.

use agora_core::email::Email;
use agora_core::error::{CoreError, UserKey};
use agora_core::password::generate_password;
use agora_core::user::{User, UserId};
use sqlx::SqliteConnection;

use crate::error::RepoError;
use crate::models::user::{CreateUser, EditUser, UserRow, COLUMNS};
use crate::retry::retry_transient;
use crate::DbPool;

/// Provides create, edit and lookup operations for users. There is no delete.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with a freshly generated password, returning the
    /// stored entity.
    ///
    /// Fails with [`CoreError::EmailAlreadyTaken`] or
    /// [`CoreError::UsernameAlreadyTaken`] (checked in that order).
    pub async fn create(pool: &DbPool, input: &CreateUser) -> Result<User, RepoError> {
        let user = retry_transient(|| Self::create_once(pool, input)).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(user)
    }

    async fn create_once(pool: &DbPool, input: &CreateUser) -> Result<User, RepoError> {
        let mut tx = pool.begin().await?;

        if !is_unique_email(&mut tx, &input.email, None).await? {
            return Err(CoreError::EmailAlreadyTaken(input.email.clone()).into());
        }
        if !is_unique_username(&mut tx, &input.username, None).await? {
            return Err(CoreError::UsernameAlreadyTaken(input.username.clone()).into());
        }

        let query = format!(
            "INSERT INTO users (email, username, first_name, last_name, password)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(input.email.as_str())
            .bind(&input.username)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(generate_password())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &input.email, &input.username))?;

        let Some(row) = row else {
            return Err(CoreError::Internal("insert into users returned no row".into()).into());
        };
        let user = UserRow::decode(&row)?;

        tx.commit().await?;
        Ok(user)
    }

    /// Replace the mutable fields (email, username, first and last name) of
    /// user `id`. The password is never touched.
    ///
    /// Fails with [`CoreError::UserNotFound`] if `id` does not exist, then
    /// with the "already taken" errors if another user owns the new email or
    /// username. The user's own current values never conflict.
    pub async fn edit(pool: &DbPool, id: UserId, input: &EditUser) -> Result<User, RepoError> {
        let user = retry_transient(|| Self::edit_once(pool, id, input)).await?;
        tracing::info!(user_id = %user.id, "Edited user");
        Ok(user)
    }

    async fn edit_once(pool: &DbPool, id: UserId, input: &EditUser) -> Result<User, RepoError> {
        let mut tx = pool.begin().await?;

        let existing = find_by_id_in(&mut tx, id)
            .await?
            .ok_or(CoreError::UserNotFound(UserKey::Id(id)))?;

        let email = input.email.clone().unwrap_or(existing.email);

        if !is_unique_email(&mut tx, &email, Some(id)).await? {
            return Err(CoreError::EmailAlreadyTaken(email).into());
        }
        if !is_unique_username(&mut tx, &input.username, Some(id)).await? {
            return Err(CoreError::UsernameAlreadyTaken(input.username.clone()).into());
        }

        let query = format!(
            "UPDATE users SET
                email = ?2,
                username = ?3,
                first_name = ?4,
                last_name = ?5
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id.get())
            .bind(email.as_str())
            .bind(&input.username)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &email, &input.username))?;

        let Some(row) = row else {
            return Err(CoreError::Internal(format!("update of user {id} returned no row")).into());
        };
        let user = UserRow::decode(&row)?;

        tx.commit().await?;
        Ok(user)
    }

    /// Find a user by exact email match.
    ///
    /// Fails with [`CoreError::UserNotFound`] if no user has this email.
    pub async fn get_by_email(pool: &DbPool, email: &Email) -> Result<User, RepoError> {
        retry_transient(|| Self::get_by_email_once(pool, email)).await
    }

    async fn get_by_email_once(pool: &DbPool, email: &Email) -> Result<User, RepoError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = ?1");
        let row = sqlx::query(&query)
            .bind(email.as_str())
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => Ok(UserRow::decode(&row)?),
            None => Err(CoreError::UserNotFound(UserKey::Email(email.clone())).into()),
        }
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &DbPool, id: UserId) -> Result<Option<User>, RepoError> {
        retry_transient(|| Self::find_by_id_once(pool, id)).await
    }

    async fn find_by_id_once(pool: &DbPool, id: UserId) -> Result<Option<User>, RepoError> {
        let mut conn = pool.acquire().await?;
        find_by_id_in(&mut conn, id).await
    }

    /// Total number of stored users.
    pub async fn count(pool: &DbPool) -> Result<i64, RepoError> {
        retry_transient(|| Self::count_once(pool)).await
    }

    async fn count_once(pool: &DbPool) -> Result<i64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_by_id_in(conn: &mut SqliteConnection, id: UserId) -> Result<Option<User>, RepoError> {
    let query = format!("SELECT {COLUMNS} FROM users WHERE id = ?1");
    let row = sqlx::query(&query)
        .bind(id.get())
        .fetch_optional(conn)
        .await?;

    Ok(row.as_ref().map(UserRow::decode).transpose()?)
}

/// `true` iff no user other than `exclude` has this email.
async fn is_unique_email(
    conn: &mut SqliteConnection,
    email: &Email,
    exclude: Option<UserId>,
) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE email = ?1 AND (?2 IS NULL OR id IS NOT ?2)",
    )
    .bind(email.as_str())
    .bind(exclude.map(UserId::get))
    .fetch_one(conn)
    .await?;

    Ok(count == 0)
}

/// `true` iff no user other than `exclude` has this username.
async fn is_unique_username(
    conn: &mut SqliteConnection,
    username: &str,
    exclude: Option<UserId>,
) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE username = ?1 AND (?2 IS NULL OR id IS NOT ?2)",
    )
    .bind(username)
    .bind(exclude.map(UserId::get))
    .fetch_one(conn)
    .await?;

    Ok(count == 0)
}

/// Translate a UNIQUE violation on `users.email` / `users.username` into the
/// matching domain error. Everything else stays a database error.
pub(crate) fn map_write_error(err: sqlx::Error, email: &Email, username: &str) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.email") {
                return CoreError::EmailAlreadyTaken(email.clone()).into();
            }
            if message.contains("users.username") {
                return CoreError::UsernameAlreadyTaken(username.to_string()).into();
            }
        }
    }
    RepoError::Database(err)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    async fn fresh_pool() -> DbPool {
        let pool = crate::connect_in_memory().await.unwrap();
        crate::initialize_schema(&pool).await.unwrap();
        pool
    }

    async fn raw_insert(pool: &DbPool, email: &str, username: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (email, username, first_name, last_name, password)
             VALUES (?1, ?2, 'F', 'L', 'pw')",
        )
        .bind(email)
        .bind(username)
        .execute(pool)
        .await
        .map(|_| ())
    }

    #[tokio::test]
    async fn unique_email_violation_maps_to_email_taken() {
        let pool = fresh_pool().await;
        raw_insert(&pool, "a@x.com", "a").await.unwrap();

        let err = raw_insert(&pool, "a@x.com", "b").await.unwrap_err();
        let email = Email::parse("a@x.com").unwrap();
        assert_matches!(
            map_write_error(err, &email, "b"),
            RepoError::Core(CoreError::EmailAlreadyTaken(ref e)) if *e == email
        );
    }

    #[tokio::test]
    async fn unique_username_violation_maps_to_username_taken() {
        let pool = fresh_pool().await;
        raw_insert(&pool, "a@x.com", "a").await.unwrap();

        let err = raw_insert(&pool, "b@x.com", "a").await.unwrap_err();
        let email = Email::parse("b@x.com").unwrap();
        assert_matches!(
            map_write_error(err, &email, "a"),
            RepoError::Core(CoreError::UsernameAlreadyTaken(ref u)) if u == "a"
        );
    }

    #[tokio::test]
    async fn other_errors_stay_database_errors() {
        let email = Email::parse("a@x.com").unwrap();
        assert_matches!(
            map_write_error(sqlx::Error::RowNotFound, &email, "a"),
            RepoError::Database(sqlx::Error::RowNotFound)
        );
    }

    #[tokio::test]
    async fn uniqueness_checks_exclude_given_id() {
        let pool = fresh_pool().await;
        raw_insert(&pool, "a@x.com", "a").await.unwrap();
        let email = Email::parse("a@x.com").unwrap();
        let mut conn = pool.acquire().await.unwrap();

        assert!(!is_unique_email(&mut conn, &email, None).await.unwrap());
        assert!(is_unique_email(&mut conn, &email, Some(UserId::new(1))).await.unwrap());
        assert!(!is_unique_email(&mut conn, &email, Some(UserId::new(2))).await.unwrap());

        assert!(!is_unique_username(&mut conn, "a", None).await.unwrap());
        assert!(is_unique_username(&mut conn, "a", Some(UserId::new(1))).await.unwrap());
        assert!(is_unique_username(&mut conn, "z", None).await.unwrap());
    }
}
