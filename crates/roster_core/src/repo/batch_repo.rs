//! Batch repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/list/delete APIs over `batches`.
//!
//! # Invariants
//! - Batches are listed in insertion order (`rowid`).
//! - Deleting a batch removes its student associations but never the
//!   students themselves.

use super::{ensure_connection_ready, RepoResult};
use crate::model::batch::{Batch, BatchId, BatchKey};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for batch operations.
pub trait BatchRepository {
    /// Point lookup by id or by name.
    fn batch_exists(&self, key: BatchKey<'_>) -> RepoResult<bool>;
    /// Inserts one batch row.
    fn insert_batch(&self, batch: &Batch) -> RepoResult<()>;
    /// Full scan in insertion order.
    fn list_batches(&self) -> RepoResult<Vec<Batch>>;
    /// Batch ids in insertion order.
    fn list_batch_ids(&self) -> RepoResult<Vec<BatchId>>;
    /// Deletes every batch whose name is listed; unknown names are skipped.
    /// Returns the number of batches removed.
    fn delete_batches_by_name(&self, names: &[String]) -> RepoResult<usize>;
}

/// SQLite-backed batch repository.
pub struct SqliteBatchRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBatchRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("batches", &["id", "name"]),
                ("student_batches", &["student_id", "batch_id"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl BatchRepository for SqliteBatchRepository<'_> {
    fn batch_exists(&self, key: BatchKey<'_>) -> RepoResult<bool> {
        let (sql, value) = match key {
            BatchKey::Id(id) => ("SELECT EXISTS(SELECT 1 FROM batches WHERE id = ?1);", id),
            BatchKey::Name(name) => (
                "SELECT EXISTS(SELECT 1 FROM batches WHERE name = ?1);",
                name,
            ),
        };
        let exists: i64 = self.conn.query_row(sql, [value], |row| row.get(0))?;
        Ok(exists == 1)
    }

    fn insert_batch(&self, batch: &Batch) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO batches (id, name) VALUES (?1, ?2);",
            params![batch.id.as_str(), batch.name.as_str()],
        )?;
        Ok(())
    }

    fn list_batches(&self) -> RepoResult<Vec<Batch>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM batches ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut batches = Vec::new();
        while let Some(row) = rows.next()? {
            batches.push(Batch {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(batches)
    }

    fn list_batch_ids(&self) -> RepoResult<Vec<BatchId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM batches ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn delete_batches_by_name(&self, names: &[String]) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut removed = 0;
        for name in names {
            tx.execute(
                "DELETE FROM student_batches
                 WHERE batch_id IN (SELECT id FROM batches WHERE name = ?1);",
                [name.as_str()],
            )?;
            removed += tx.execute("DELETE FROM batches WHERE name = ?1;", [name.as_str()])?;
        }
        tx.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchRepository, SqliteBatchRepository};
    use crate::db::open_db_in_memory;
    use crate::model::batch::{Batch, BatchKey};

    #[test]
    fn exists_checks_id_and_name_independently() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteBatchRepository::try_new(&conn).unwrap();
        repo.insert_batch(&Batch::try_new("B1", "Morning").unwrap())
            .unwrap();

        assert!(repo.batch_exists(BatchKey::Id("B1")).unwrap());
        assert!(repo.batch_exists(BatchKey::Name("Morning")).unwrap());
        assert!(!repo.batch_exists(BatchKey::Id("Morning")).unwrap());
        assert!(!repo.batch_exists(BatchKey::Name("B1")).unwrap());
    }

    #[test]
    fn duplicate_name_is_rejected_by_storage() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteBatchRepository::try_new(&conn).unwrap();
        repo.insert_batch(&Batch::try_new("B1", "Morning").unwrap())
            .unwrap();

        assert!(repo
            .insert_batch(&Batch::try_new("B2", "Morning").unwrap())
            .is_err());
        assert_eq!(repo.list_batch_ids().unwrap(), vec!["B1"]);
    }

    #[test]
    fn delete_by_name_skips_unknown_names() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteBatchRepository::try_new(&conn).unwrap();
        repo.insert_batch(&Batch::try_new("B1", "Morning").unwrap())
            .unwrap();
        repo.insert_batch(&Batch::try_new("B2", "Evening").unwrap())
            .unwrap();

        let removed = repo
            .delete_batches_by_name(&["Morning".to_string(), "Night".to_string()])
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            repo.list_batches().unwrap(),
            vec![Batch::try_new("B2", "Evening").unwrap()]
        );
    }
}
