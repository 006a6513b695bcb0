//! Domain primitives: ProgramId, ExerciseId, UserId, Email, Reps.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::ValidationError;

/// Store-assigned identifier of a workout program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub i64);

impl ProgramId {
    /// Create a ProgramId from a raw row id.
    pub fn new(id: i64) -> Self {
        ProgramId(id)
    }

    /// Get the underlying row id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ProgramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub i64);

impl ExerciseId {
    pub fn new(id: i64) -> Self {
        ExerciseId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// Store-assigned identifier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        UserId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized (trimmed, lowercased) email address. Built only through `FromStr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Get the email as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Email(normalized))
            }
            _ => Err(ValidationError::InvalidField {
                field: "email",
                reason: "must be a valid email address",
            }),
        }
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Repetition prescription: either a plain count (`10`) or free text (`"8-12"`, `"AMRAP"`).
///
/// Serialized untagged so the JSON kind a client sent is the kind it reads back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reps {
    Count(i64),
    Text(String),
}

impl Reps {
    /// Empty text is not a prescription.
    pub fn is_blank(&self) -> bool {
        matches!(self, Reps::Text(s) if s.trim().is_empty())
    }
}
