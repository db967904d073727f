//! Bounded retry for transient SQLite lock contention.
//!
//! Only `SQLITE_BUSY` / `SQLITE_LOCKED` (and their extended codes) qualify.
//! Validation and uniqueness failures are deterministic and are returned
//! on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::RepoError;

/// Primary SQLite result code for "database is locked by another connection".
const SQLITE_BUSY: i32 = 5;
/// Primary SQLite result code for "table is locked within this connection".
const SQLITE_LOCKED: i32 = 6;

/// Backoff settings for [`retry_when`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
        }
    }
}

/// Whether `code` (as reported by sqlx, possibly an extended result code)
/// is a busy/locked condition.
pub fn is_transient_code(code: &str) -> bool {
    match code.parse::<i32>() {
        Ok(code) => matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED),
        Err(_) => false,
    }
}

pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|c| is_transient_code(&c)),
        _ => false,
    }
}

/// Run `operation`, re-running it with exponential backoff while it fails
/// with an error `should_retry` accepts, up to `policy.max_retries` times.
pub async fn retry_when<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        match operation().await {
            Err(err) if attempt < policy.max_retries && should_retry(&err) => {
                attempt += 1;
                tracing::debug!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Storage busy, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
            }
            result => return result,
        }
    }
}

/// [`retry_when`] specialised to repository calls: retries only
/// [`RepoError::is_transient`] failures, with the default policy.
pub async fn retry_transient<F, Fut, T>(operation: F) -> Result<T, RepoError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RepoError>>,
{
    retry_when(&RetryPolicy::default(), RepoError::is_transient, operation).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use agora_core::error::CoreError;

    use super::*;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn busy_and_locked_codes_are_transient() {
        assert!(is_transient_code("5"));
        assert!(is_transient_code("6"));
        // SQLITE_BUSY_SNAPSHOT (5 | 2 << 8)
        assert!(is_transient_code("517"));
        // SQLITE_LOCKED_SHAREDCACHE (6 | 1 << 8)
        assert!(is_transient_code("262"));
    }

    #[test]
    fn constraint_and_garbage_codes_are_not_transient() {
        // SQLITE_CONSTRAINT_UNIQUE
        assert!(!is_transient_code("2067"));
        assert!(!is_transient_code("19"));
        assert!(!is_transient_code("busy"));
        assert!(!is_transient_code(""));
    }

    #[test]
    fn non_database_errors_are_not_transient() {
        assert!(!is_transient(&sqlx::Error::RowNotFound));
        assert!(!is_transient(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn domain_errors_are_never_transient() {
        let err = RepoError::Core(CoreError::UsernameAlreadyTaken("ana".into()));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result: Result<&str, String> = retry_when(
            &fast_policy(),
            |e: &String| e == "busy",
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("busy".to_string())
                    } else {
                        Ok("done")
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry_when(
            &fast_policy(),
            |_: &String| true,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("busy".to_string()) }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_failures() {
        let calls = AtomicU32::new(0);

        let result: Result<(), RepoError> = retry_transient(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(CoreError::InvalidField("username").into()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
