//! User and session operations for the repository.

use crate::db::error::is_unique_violation;
use crate::db::RepoError;
use crate::domain::{Email, User, UserCredentials, UserId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

use super::Repository;

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    let email: String = row.try_get("email")?;
    let email = Email::from_str(&email).map_err(|e| sqlx::Error::ColumnDecode {
        index: "email".to_string(),
        source: Box::new(e),
    })?;
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        email,
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

impl Repository {
    /// Insert a new user.
    ///
    /// # Errors
    /// Returns `RepoError::Conflict` if the email is already registered.
    pub async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
        created_at_ms: i64,
    ) -> Result<User, RepoError> {
        let result = self
            .bounded(
                sqlx::query(
                    r#"
                    INSERT INTO users (email, password_hash, created_at_ms)
                    VALUES (?, ?, ?)
                    RETURNING id, email, created_at_ms
                    "#,
                )
                .bind(email.as_str())
                .bind(password_hash)
                .bind(created_at_ms)
                .fetch_one(&self.pool),
            )
            .await;

        let row = match result {
            Ok(row) => row,
            Err(RepoError::Store(err)) if is_unique_violation(&err) => {
                return Err(RepoError::Conflict(format!("email {} already registered", email)));
            }
            Err(e) => return Err(e),
        };

        Ok(user_from_row(&row)?)
    }

    /// Look up a user and their stored password hash by email.
    pub async fn find_user_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, RepoError> {
        let row = self
            .bounded(
                sqlx::query(
                    "SELECT id, email, created_at_ms, password_hash FROM users WHERE email = ?",
                )
                .bind(email.as_str())
                .fetch_optional(&self.pool),
            )
            .await?;

        match row {
            Some(row) => Ok(Some(UserCredentials {
                user: user_from_row(&row)?,
                password_hash: row.try_get("password_hash")?,
            })),
            None => Ok(None),
        }
    }

    /// Persist a session under the hash of its bearer token.
    pub async fn create_session(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at_ms: i64,
    ) -> Result<(), RepoError> {
        self.bounded(
            sqlx::query(
                "INSERT INTO sessions (token_hash, user_id, expires_at_ms) VALUES (?, ?, ?)",
            )
            .bind(token_hash)
            .bind(user_id.as_i64())
            .bind(expires_at_ms)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// Resolve a token hash to its user, if the session exists and has not expired.
    pub async fn find_session_user(
        &self,
        token_hash: &str,
        now_ms: i64,
    ) -> Result<Option<User>, RepoError> {
        let row = self
            .bounded(
                sqlx::query(
                    r#"
                    SELECT u.id, u.email, u.created_at_ms
                    FROM sessions s
                    JOIN users u ON u.id = s.user_id
                    WHERE s.token_hash = ? AND s.expires_at_ms > ?
                    "#,
                )
                .bind(token_hash)
                .bind(now_ms)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    /// Delete a single session. Returns `false` if it did not exist.
    pub async fn delete_session(&self, token_hash: &str) -> Result<bool, RepoError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
                    .bind(token_hash)
                    .execute(&self.pool),
            )
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove sessions that expired at or before `now_ms`.
    pub async fn purge_expired_sessions(&self, now_ms: i64) -> Result<u64, RepoError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM sessions WHERE expires_at_ms <= ?")
                    .bind(now_ms)
                    .execute(&self.pool),
            )
            .await?;
        Ok(result.rows_affected())
    }
}
