//! Batch domain model.
//!
//! # Responsibility
//! - Define the batch record and the student-form batch selector options.
//!
//! # Invariants
//! - `id` and `name` are trimmed and non-blank.
//! - `BatchChoice::None` is the "no batch" sentinel and never maps to a
//!   stored association.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Batch identifier as entered by the operator.
pub type BatchId = String;

/// Named grouping that students may be associated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    /// Unique across all batches.
    pub name: String,
}

impl Batch {
    /// Builds a batch from raw input, trimming both fields.
    pub fn try_new(id: &str, name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: require_text("id", id)?,
            name: require_text("name", name)?,
        })
    }
}

/// One option of the batch selector offered by the student forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BatchChoice {
    /// Explicit "no batch" selection.
    None,
    /// Association with an existing batch id.
    Batch(BatchId),
}

impl BatchChoice {
    /// Returns the referenced batch id, if any.
    pub fn batch_id(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Batch(id) => Some(id.as_str()),
        }
    }
}

impl Display for BatchChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(id) => write!(f, "{id}"),
        }
    }
}

/// Lookup key for batch existence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKey<'a> {
    Id(&'a str),
    Name(&'a str),
}

/// Reduces a selector result to the batch ids it references.
///
/// `BatchChoice::None` and blank ids are dropped; ids are trimmed and
/// deduplicated keeping first-selection order.
pub fn selected_batch_ids(choices: &[BatchChoice]) -> Vec<BatchId> {
    let mut ids: Vec<BatchId> = Vec::new();
    for choice in choices {
        let Some(id) = choice.batch_id().map(str::trim) else {
            continue;
        };
        if id.is_empty() || ids.iter().any(|existing| existing == id) {
            continue;
        }
        ids.push(id.to_string());
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::{selected_batch_ids, Batch, BatchChoice};
    use crate::model::ValidationError;

    #[test]
    fn try_new_rejects_blank_fields() {
        assert_eq!(
            Batch::try_new(" ", "Morning").unwrap_err(),
            ValidationError::BlankField("id")
        );
        assert_eq!(
            Batch::try_new("B1", "").unwrap_err(),
            ValidationError::BlankField("name")
        );
        let batch = Batch::try_new(" B1 ", " Morning ").unwrap();
        assert_eq!(batch.id, "B1");
        assert_eq!(batch.name, "Morning");
    }

    #[test]
    fn selected_batch_ids_drops_sentinel_and_duplicates() {
        let choices = vec![
            BatchChoice::Batch("B2".to_string()),
            BatchChoice::None,
            BatchChoice::Batch("B1".to_string()),
            BatchChoice::Batch(" B2 ".to_string()),
            BatchChoice::Batch("  ".to_string()),
        ];
        assert_eq!(selected_batch_ids(&choices), vec!["B2", "B1"]);
    }

    #[test]
    fn choice_serializes_with_kind_tag() {
        let json = serde_json::to_string(&BatchChoice::Batch("B1".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"batch","id":"B1"}"#);
        let json = serde_json::to_string(&BatchChoice::None).unwrap();
        assert_eq!(json, r#"{"kind":"none"}"#);
    }
}
