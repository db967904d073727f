use agora_core::error::CoreError;

use crate::retry;

/// Error returned by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A domain failure (not found, already taken, corrupt row).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An unexpected storage failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    /// Whether the failure is lock contention that may clear on its own.
    /// Domain failures are never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            RepoError::Database(err) => retry::is_transient(err),
            RepoError::Core(_) => false,
        }
    }
}
