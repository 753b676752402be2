//! Record Store: student/batch use-case service.
//!
//! # Responsibility
//! - Validate operator input and uniqueness rules before any write.
//! - Delegate persistence to student/batch repositories.
//! - Scope one database connection per logical action (`with_store`).
//!
//! # Invariants
//! - A rejected operation performs no write.
//! - Student ids and batch ids/names are unique; checked before insert.
//! - Selected batches must exist at write time.
//! - Deleting unknown ids/names is a no-op, not an error.

use crate::db::open_db;
use crate::model::batch::{Batch, BatchChoice, BatchId, BatchKey};
use crate::model::student::{NewStudent, Student, StudentPatch, StudentRow};
use crate::model::ValidationError;
use crate::repo::batch_repo::{BatchRepository, SqliteBatchRepository};
use crate::repo::student_repo::{SqliteStudentRepository, StudentRepository};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from Record Store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Required field blank.
    Validation(ValidationError),
    /// A student with this id already exists.
    DuplicateStudentId(String),
    /// A batch with this id already exists.
    DuplicateBatchId(String),
    /// A batch with this name already exists.
    DuplicateBatchName(String),
    /// Selected batch id does not exist.
    UnknownBatch(BatchId),
    /// Update target does not exist.
    StudentNotFound(String),
    /// Update carried no field to write.
    NothingToUpdate,
    /// Write succeeded but read-back did not find the record.
    InconsistentState(&'static str),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl StoreError {
    /// Returns whether this is an operator-facing rejection rather than a
    /// storage failure. Rejections never leave partial writes behind.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Repo(_) | Self::InconsistentState(_))
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "blank_field",
            Self::DuplicateStudentId(_) => "duplicate_student_id",
            Self::DuplicateBatchId(_) => "duplicate_batch_id",
            Self::DuplicateBatchName(_) => "duplicate_batch_name",
            Self::UnknownBatch(_) => "unknown_batch",
            Self::StudentNotFound(_) => "student_not_found",
            Self::NothingToUpdate => "nothing_to_update",
            Self::InconsistentState(_) => "inconsistent_state",
            Self::Repo(_) => "storage_error",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateStudentId(id) => write!(f, "student id already exists: {id}"),
            Self::DuplicateBatchId(id) => write!(f, "batch id already exists: {id}"),
            Self::DuplicateBatchName(name) => write!(f, "batch name already exists: {name}"),
            Self::UnknownBatch(id) => write!(f, "batch not found: {id}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::NothingToUpdate => write!(f, "input at least one field to update"),
            Self::InconsistentState(details) => write!(f, "inconsistent roster state: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::StudentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Record Store over SQLite repositories borrowing one connection.
pub type SqliteRecordStore<'conn> =
    RecordStore<SqliteStudentRepository<'conn>, SqliteBatchRepository<'conn>>;

/// Opens the database at `path`, runs one action, and releases the
/// connection on every exit path.
///
/// # Errors
/// - Open/migration failures surface as `StoreError::Repo`.
/// - Whatever `action` returns is passed through unchanged.
pub fn with_store<T>(
    path: impl AsRef<Path>,
    action: impl FnOnce(&SqliteRecordStore<'_>) -> StoreResult<T>,
) -> StoreResult<T> {
    let conn = open_db(path).map_err(RepoError::from)?;
    let store = SqliteRecordStore::try_new(&conn)?;
    action(&store)
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Builds a store over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteStudentRepository::try_new(conn)?,
            SqliteBatchRepository::try_new(conn)?,
        ))
    }
}

/// Use-case service for student and batch records.
pub struct RecordStore<S: StudentRepository, B: BatchRepository> {
    students: S,
    batches: B,
}

impl<S: StudentRepository, B: BatchRepository> RecordStore<S, B> {
    /// Creates a store using the provided repository implementations.
    pub fn new(students: S, batches: B) -> Self {
        Self { students, batches }
    }

    /// Returns batch ids in insertion order; empty when none exist.
    pub fn list_batch_ids(&self) -> StoreResult<Vec<BatchId>> {
        Ok(self.batches.list_batch_ids()?)
    }

    /// Returns the options offered by the student batch selector.
    ///
    /// The "no batch" sentinel always comes first.
    pub fn batch_options(&self) -> StoreResult<Vec<BatchChoice>> {
        let mut options = vec![BatchChoice::None];
        options.extend(self.list_batch_ids()?.into_iter().map(BatchChoice::Batch));
        Ok(options)
    }

    pub fn student_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.students.student_exists(id.trim())?)
    }

    /// Adds one student with the selected batch associations.
    ///
    /// # Errors
    /// - `Validation` when id/name/branch/college is blank.
    /// - `DuplicateStudentId` when the id is taken.
    /// - `UnknownBatch` when a selected batch does not exist.
    pub fn add_student(&self, input: &NewStudent) -> StoreResult<Student> {
        let result = self.try_add_student(input);
        log_outcome("student_add", input.id.trim(), &result);
        result
    }

    fn try_add_student(&self, input: &NewStudent) -> StoreResult<Student> {
        let student = input.normalize()?;
        if self.students.student_exists(&student.id)? {
            return Err(StoreError::DuplicateStudentId(student.id));
        }
        self.ensure_batches_exist(&student.batches)?;

        self.students.insert_student(&student)?;
        self.students
            .get_student(&student.id)?
            .ok_or(StoreError::InconsistentState(
                "created student not found in read-back",
            ))
    }

    /// Lists every student in insertion order.
    pub fn list_students(&self) -> StoreResult<Vec<Student>> {
        Ok(self.students.list_students()?)
    }

    /// Lists the flat display projection: one row per student/batch pair.
    pub fn list_student_rows(&self) -> StoreResult<Vec<StudentRow>> {
        Ok(self
            .list_students()?
            .iter()
            .flat_map(Student::rows)
            .collect())
    }

    /// Deletes the listed students; unknown ids are ignored.
    ///
    /// Returns the number of students removed.
    pub fn delete_students(&self, ids: &[String]) -> StoreResult<usize> {
        let ids: Vec<String> = ids.iter().map(|id| id.trim().to_string()).collect();
        let removed = self.students.delete_students(&ids)?;
        info!(
            "event=student_delete module=service status=ok requested={} removed={}",
            ids.len(),
            removed
        );
        Ok(removed)
    }

    pub fn get_student(&self, id: &str) -> StoreResult<Option<Student>> {
        Ok(self.students.get_student(id.trim())?)
    }

    /// Applies a partial update to one student.
    ///
    /// # Errors
    /// - `NothingToUpdate` when the patch carries no field.
    /// - `StudentNotFound` when `id` does not exist.
    /// - `UnknownBatch` when a selected batch does not exist.
    pub fn update_student(&self, id: &str, patch: &StudentPatch) -> StoreResult<Student> {
        let result = self.try_update_student(id.trim(), patch);
        log_outcome("student_update", id.trim(), &result);
        result
    }

    fn try_update_student(&self, id: &str, patch: &StudentPatch) -> StoreResult<Student> {
        if patch.is_empty() {
            return Err(StoreError::NothingToUpdate);
        }
        let existing = self
            .students
            .get_student(id)?
            .ok_or_else(|| StoreError::StudentNotFound(id.to_string()))?;

        let updated = patch.apply_to(&existing);
        self.ensure_batches_exist(&updated.batches)?;
        self.students.update_student(&updated)?;
        self.students
            .get_student(id)?
            .ok_or(StoreError::InconsistentState(
                "updated student not found in read-back",
            ))
    }

    /// Point lookup by batch id or name.
    pub fn batch_exists(&self, key: BatchKey<'_>) -> StoreResult<bool> {
        let key = match key {
            BatchKey::Id(id) => BatchKey::Id(id.trim()),
            BatchKey::Name(name) => BatchKey::Name(name.trim()),
        };
        Ok(self.batches.batch_exists(key)?)
    }

    /// Adds one batch.
    ///
    /// # Errors
    /// - `Validation` when id or name is blank.
    /// - `DuplicateBatchId`, then `DuplicateBatchName`, when taken.
    pub fn add_batch(&self, id: &str, name: &str) -> StoreResult<Batch> {
        let result = self.try_add_batch(id, name);
        log_outcome("batch_add", id.trim(), &result);
        result
    }

    fn try_add_batch(&self, id: &str, name: &str) -> StoreResult<Batch> {
        let batch = Batch::try_new(id, name)?;
        if self.batches.batch_exists(BatchKey::Id(&batch.id))? {
            return Err(StoreError::DuplicateBatchId(batch.id));
        }
        if self.batches.batch_exists(BatchKey::Name(&batch.name))? {
            return Err(StoreError::DuplicateBatchName(batch.name));
        }
        self.batches.insert_batch(&batch)?;
        Ok(batch)
    }

    /// Lists every batch in insertion order.
    pub fn list_batches(&self) -> StoreResult<Vec<Batch>> {
        Ok(self.batches.list_batches()?)
    }

    /// Deletes the batches with the listed names; unknown names are ignored.
    ///
    /// Student associations with a deleted batch are dropped; the students
    /// stay.
    pub fn delete_batches(&self, names: &[String]) -> StoreResult<usize> {
        let names: Vec<String> = names.iter().map(|name| name.trim().to_string()).collect();
        let removed = self.batches.delete_batches_by_name(&names)?;
        info!(
            "event=batch_delete module=service status=ok requested={} removed={}",
            names.len(),
            removed
        );
        Ok(removed)
    }

    fn ensure_batches_exist(&self, ids: &[BatchId]) -> StoreResult<()> {
        for id in ids {
            if !self.batches.batch_exists(BatchKey::Id(id))? {
                return Err(StoreError::UnknownBatch(id.clone()));
            }
        }
        Ok(())
    }
}

fn log_outcome<T>(event: &str, id: &str, result: &StoreResult<T>) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok id={id}"),
        Err(err) if err.is_validation() => warn!(
            "event={event} module=service status=rejected id={id} error_code={}",
            err.code()
        ),
        Err(err) => warn!(
            "event={event} module=service status=error id={id} error_code={} error={err}",
            err.code()
        ),
    }
}
