//! Input validation errors raised before any store access.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
    #[error("exercises[{index}]: {source}")]
    Exercise {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// Require a text field, rejecting absent or whitespace-only values.
///
/// Accepted values are returned exactly as sent.
pub(crate) fn required_text(
    field: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}
