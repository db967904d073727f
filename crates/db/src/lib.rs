//! SQLite storage for the Agora backend.
//!
//! Owns the connection setup, the static schema bootstrap, the row codec
//! ([`models::user::UserRow`]) and the [`repositories::UserRepo`].

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod error;
pub mod models;
pub mod repositories;
pub mod retry;

pub use error::RepoError;

/// The storage handle. Holds exactly one SQLite connection.
pub type DbPool = sqlx::SqlitePool;

/// Static schema script, applied on every startup.
const INIT_SCRIPT: &str = include_str!("../schema/init.sql");

/// How long SQLite itself waits on a locked database before reporting `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if missing) the SQLite database file at `path`.
///
/// Foreign-key enforcement is switched on for the connection.
pub async fn connect(path: impl AsRef<Path>) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    pool_options().connect_with(options).await
}

/// Open a private in-memory database. Every call returns an independent store.
pub async fn connect_in_memory() -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    pool_options().connect_with(options).await
}

/// Single connection, kept open for the life of the pool. An in-memory
/// database disappears with its connection, so it must never be recycled.
fn pool_options() -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

/// Apply the schema script. Safe to call on an already-initialized database.
pub async fn initialize_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(INIT_SCRIPT).execute(pool).await?;
    Ok(())
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
