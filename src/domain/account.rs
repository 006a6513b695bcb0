//! User accounts.

use crate::domain::{Email, UserId};
use serde::Serialize;

/// A registered user. The password hash stays in the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at_ms: i64,
}

/// A user row with its stored password hash, for login checks only.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}
