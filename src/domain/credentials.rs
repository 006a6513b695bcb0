//! Password and session-token hashing.
//!
//! Both hashes are keyed with the server's token secret, so a copied
//! database alone is not enough to check guesses offline.

use crate::domain::ValidationError;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Check that a password is present and long enough. Whitespace is kept.
pub fn validate_password(password: Option<String>) -> Result<String, ValidationError> {
    match password {
        None => Err(ValidationError::MissingField("password")),
        Some(p) if p.is_empty() => Err(ValidationError::MissingField("password")),
        Some(p) if p.chars().count() < MIN_PASSWORD_LEN => Err(ValidationError::InvalidField {
            field: "password",
            reason: "must be at least 8 characters",
        }),
        Some(p) => Ok(p),
    }
}

fn hash_var(hasher: &mut Sha256, data: &str) {
    hasher.update((data.len() as u32).to_le_bytes());
    hasher.update(data.as_bytes());
}

fn keyed_digest(secret: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hash_var(&mut hasher, secret);
    for part in parts {
        hash_var(&mut hasher, part);
    }
    hex::encode(hasher.finalize())
}

/// Hash a password with a fresh random salt. Output format: `salt$digest`.
pub fn hash_password(secret: &str, password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = keyed_digest(secret, &[&salt, password]);
    format!("{}${}", salt, digest)
}

/// Check a password against a stored `salt$digest` string.
pub fn verify_password(secret: &str, password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    let actual = keyed_digest(secret, &[salt, password]);
    constant_time_eq(actual.as_bytes(), expected.as_bytes())
}

/// Generate an opaque bearer token. Only its hash is persisted.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Hash a bearer token for storage and lookup.
pub fn hash_token(secret: &str, token: &str) -> String {
    keyed_digest(secret, &["session", token])
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
