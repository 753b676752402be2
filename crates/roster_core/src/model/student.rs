//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical student record and its display projection.
//! - Define write-side inputs (`NewStudent`, `StudentPatch`) and their
//!   normalization rules.
//!
//! # Invariants
//! - `id`, `name`, `branch`, `college` are trimmed and non-blank.
//! - `batches` holds each batch id at most once, in selection order.
//! - A patch never blanks a stored field: blank input keeps the old value.

use super::batch::{selected_batch_ids, BatchChoice, BatchId};
use super::{non_blank, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Student identifier as entered by the operator.
pub type StudentId = String;

/// Canonical student record with its batch associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub branch: String,
    pub college: String,
    /// Associated batch ids. Empty means "no batch".
    pub batches: Vec<BatchId>,
}

/// Flat display row: one per (student, batch) pair.
///
/// A student without batches yields a single row with `batch = None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRow {
    pub id: StudentId,
    pub name: String,
    pub branch: String,
    pub college: String,
    pub batch: Option<BatchId>,
}

impl Student {
    /// Expands this record into its display rows.
    pub fn rows(&self) -> Vec<StudentRow> {
        let row = |batch: Option<BatchId>| StudentRow {
            id: self.id.clone(),
            name: self.name.clone(),
            branch: self.branch.clone(),
            college: self.college.clone(),
            batch,
        };

        if self.batches.is_empty() {
            return vec![row(None)];
        }
        self.batches.iter().cloned().map(Some).map(row).collect()
    }
}

/// Raw add-student form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStudent {
    pub id: String,
    pub name: String,
    pub branch: String,
    pub college: String,
    /// Selector result; may mix real batches with `BatchChoice::None`.
    pub batches: Vec<BatchChoice>,
}

impl NewStudent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        branch: impl Into<String>,
        college: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            branch: branch.into(),
            college: college.into(),
            batches: Vec::new(),
        }
    }

    /// Replaces the batch selection.
    pub fn with_batches(mut self, batches: Vec<BatchChoice>) -> Self {
        self.batches = batches;
        self
    }

    /// Validates required fields and builds the record to persist.
    ///
    /// Fields are checked in form order: id, name, branch, college.
    pub fn normalize(&self) -> Result<Student, ValidationError> {
        Ok(Student {
            id: require_text("id", &self.id)?,
            name: require_text("name", &self.name)?,
            branch: require_text("branch", &self.branch)?,
            college: require_text("college", &self.college)?,
            batches: selected_batch_ids(&self.batches),
        })
    }
}

/// Partial update input for an existing student.
///
/// `None` or blank text keeps the stored value. `batches: Some(..)` replaces
/// the whole association set; a selection with only `BatchChoice::None`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub branch: Option<String>,
    pub college: Option<String>,
    pub batches: Option<Vec<BatchChoice>>,
}

impl StudentPatch {
    /// Returns whether the patch carries nothing to write.
    pub fn is_empty(&self) -> bool {
        non_blank(self.name.as_deref()).is_none()
            && non_blank(self.branch.as_deref()).is_none()
            && non_blank(self.college.as_deref()).is_none()
            && self.batches.is_none()
    }

    /// Applies the patch on top of the stored record.
    pub fn apply_to(&self, existing: &Student) -> Student {
        Student {
            id: existing.id.clone(),
            name: non_blank(self.name.as_deref()).unwrap_or_else(|| existing.name.clone()),
            branch: non_blank(self.branch.as_deref()).unwrap_or_else(|| existing.branch.clone()),
            college: non_blank(self.college.as_deref())
                .unwrap_or_else(|| existing.college.clone()),
            batches: match &self.batches {
                Some(choices) => selected_batch_ids(choices),
                None => existing.batches.clone(),
            },
        }
    }
}
