//! Core data-access and validation layer for the student roster.
//! This crate is the single source of truth for roster invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::batch::{Batch, BatchChoice, BatchId, BatchKey};
pub use model::student::{NewStudent, Student, StudentId, StudentPatch, StudentRow};
pub use model::ValidationError;
pub use repo::batch_repo::{BatchRepository, SqliteBatchRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::record_store::{
    with_store, RecordStore, SqliteRecordStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
