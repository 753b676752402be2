//! Student repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `students` and the `student_batches` join table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Students and batch associations are listed in insertion order (`rowid`).
//! - Insert and update write the student row and its full association set in
//!   one transaction.
//! - Deleting a student removes its associations.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::batch::BatchId;
use crate::model::student::{Student, StudentId};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::HashMap;

/// Repository interface for student operations.
pub trait StudentRepository {
    /// Point lookup by primary key.
    fn student_exists(&self, id: &str) -> RepoResult<bool>;
    /// Inserts one student row plus its batch associations.
    fn insert_student(&self, student: &Student) -> RepoResult<()>;
    /// Loads one student with its associations.
    fn get_student(&self, id: &str) -> RepoResult<Option<Student>>;
    /// Full scan in insertion order.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// Overwrites text fields and replaces the association set.
    fn update_student(&self, student: &Student) -> RepoResult<()>;
    /// Deletes every listed student; unknown ids are skipped.
    /// Returns the number of students removed.
    fn delete_students(&self, ids: &[StudentId]) -> RepoResult<usize>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("students", &["id", "name", "branch", "college"]),
                ("student_batches", &["student_id", "batch_id"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn student_exists(&self, id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM students WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn insert_student(&self, student: &Student) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO students (id, name, branch, college) VALUES (?1, ?2, ?3, ?4);",
            params![
                student.id.as_str(),
                student.name.as_str(),
                student.branch.as_str(),
                student.college.as_str(),
            ],
        )?;
        insert_links(&tx, student.id.as_str(), &student.batches)?;
        tx.commit()?;
        Ok(())
    }

    fn get_student(&self, id: &str) -> RepoResult<Option<Student>> {
        let found = self
            .conn
            .query_row(
                "SELECT id, name, branch, college FROM students WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Student {
                        id: row.get("id")?,
                        name: row.get("name")?,
                        branch: row.get("branch")?,
                        college: row.get("college")?,
                        batches: Vec::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut student) = found else {
            return Ok(None);
        };
        student.batches = load_batches_for_student(self.conn, student.id.as_str())?;
        Ok(Some(student))
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut links = load_all_links(self.conn)?;
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, branch, college FROM students ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get("id")?;
            let batches = links.remove(&id).unwrap_or_default();
            students.push(Student {
                id,
                name: row.get("name")?,
                branch: row.get("branch")?,
                college: row.get("college")?,
                batches,
            });
        }
        Ok(students)
    }

    fn update_student(&self, student: &Student) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE students
             SET name = ?2, branch = ?3, college = ?4
             WHERE id = ?1;",
            params![
                student.id.as_str(),
                student.name.as_str(),
                student.branch.as_str(),
                student.college.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(student.id.clone()));
        }

        tx.execute(
            "DELETE FROM student_batches WHERE student_id = ?1;",
            [student.id.as_str()],
        )?;
        insert_links(&tx, student.id.as_str(), &student.batches)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_students(&self, ids: &[StudentId]) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut removed = 0;
        for id in ids {
            tx.execute(
                "DELETE FROM student_batches WHERE student_id = ?1;",
                [id.as_str()],
            )?;
            removed += tx.execute("DELETE FROM students WHERE id = ?1;", [id.as_str()])?;
        }
        tx.commit()?;
        Ok(removed)
    }
}

fn insert_links(tx: &Transaction<'_>, student_id: &str, batches: &[BatchId]) -> RepoResult<()> {
    for batch_id in batches {
        tx.execute(
            "INSERT OR IGNORE INTO student_batches (student_id, batch_id) VALUES (?1, ?2);",
            params![student_id, batch_id.as_str()],
        )?;
    }
    Ok(())
}

fn load_batches_for_student(conn: &Connection, student_id: &str) -> RepoResult<Vec<BatchId>> {
    let mut stmt = conn.prepare(
        "SELECT batch_id
         FROM student_batches
         WHERE student_id = ?1
         ORDER BY rowid ASC;",
    )?;
    let mut rows = stmt.query([student_id])?;
    let mut batches = Vec::new();
    while let Some(row) = rows.next()? {
        batches.push(row.get(0)?);
    }
    Ok(batches)
}

fn load_all_links(conn: &Connection) -> RepoResult<HashMap<StudentId, Vec<BatchId>>> {
    let mut stmt =
        conn.prepare("SELECT student_id, batch_id FROM student_batches ORDER BY rowid ASC;")?;
    let mut rows = stmt.query([])?;
    let mut links: HashMap<StudentId, Vec<BatchId>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let student_id: String = row.get(0)?;
        links.entry(student_id).or_default().push(row.get(1)?);
    }
    Ok(links)
}
