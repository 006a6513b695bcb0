//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `programs.rs` - Program aggregate writes, the joined read and exercise appends
//! - `accounts.rs` - Users and login sessions

mod accounts;
mod programs;

use crate::db::RepoError;
use std::future::Future;
use std::time::Duration;
use sqlx::sqlite::SqlitePool;

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
    store_timeout: Duration,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository {
            pool,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Override the per-call store timeout.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Cheap liveness probe for readiness checks.
    pub async fn ping(&self) -> Result<(), RepoError> {
        self.bounded(sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map(|_| ())
    }

    /// Run one store call under the configured timeout.
    ///
    /// A timed-out future is dropped; an open transaction it borrowed rolls
    /// back when the transaction itself is dropped by the caller.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, RepoError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result.map_err(RepoError::from),
            Err(_) => Err(RepoError::Timeout(self.store_timeout)),
        }
    }
}
