//! Domain model for roster records.
//!
//! # Responsibility
//! - Define canonical student/batch records used by core business logic.
//! - Normalize and validate operator input before it reaches storage.
//!
//! # Invariants
//! - Required text fields are trimmed and never blank once validated.
//! - Batch associations are a set: order follows selection, duplicates
//!   collapse.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod batch;
pub mod student;

/// Input validation failure for roster records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty after trim. Carries the field name.
    BlankField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(trimmed.to_string())
}

/// Returns the trimmed value, or `None` when it is absent or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
