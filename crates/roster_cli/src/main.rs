//! Roster CLI entry point.
//!
//! # Responsibility
//! - Map the seven menu actions onto subcommands over `roster_core`.
//! - Open one store connection per invocation and release it on exit.
//! - Report rejections as warnings (exit 1) and storage failures as errors
//!   (exit 2).

mod render;

use clap::{Parser, Subcommand};
use log::info;
use render::Report;
use roster_core::{
    default_log_level, init_logging, with_store, BatchChoice, NewStudent, SqliteRecordStore,
    StoreResult, StudentPatch,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Student and batch record management")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "ROSTER_DB", default_value = "roster.sqlite3")]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "ROSTER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, env = "ROSTER_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Print records as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a student, optionally tagged with batches
    AddStudent {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        branch: String,
        #[arg(long)]
        college: String,
        /// Batch id to associate; repeatable
        #[arg(long = "batch", value_name = "BATCH_ID")]
        batches: Vec<String>,
        /// Select the "no batch" option
        #[arg(long)]
        no_batch: bool,
    },
    /// Delete students by id
    DeleteStudents {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Update a student; blank or omitted fields keep their stored value
    UpdateStudent {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        college: Option<String>,
        /// Replacement batch id; repeatable
        #[arg(long = "batch", value_name = "BATCH_ID", conflicts_with = "clear_batches")]
        batches: Vec<String>,
        /// Remove every batch association
        #[arg(long)]
        clear_batches: bool,
    },
    /// Display students
    Students {
        /// One row per student/batch pair
        #[arg(long)]
        rows: bool,
    },
    /// Add a batch
    AddBatch {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Display batches
    Batches,
    /// Delete batches by name
    DeleteBatches {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// List the options offered by the student batch selector
    BatchOptions,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, &absolute(log_dir)) {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    }

    info!(
        "event=cli_command module=cli status=start db={}",
        cli.db.display()
    );
    let outcome = with_store(&cli.db, |store| run(store, &cli.command));

    match outcome {
        Ok(report) => match report.render(cli.json) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::from(2)
            }
        },
        Err(err) if err.is_validation() => {
            eprintln!("warning: {err}");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(store: &SqliteRecordStore<'_>, command: &Command) -> StoreResult<Report> {
    match command {
        Command::AddStudent {
            id,
            name,
            branch,
            college,
            batches,
            no_batch,
        } => {
            let mut choices = batch_choices(batches);
            if *no_batch {
                choices.insert(0, BatchChoice::None);
            }
            let input = NewStudent::new(id, name, branch, college).with_batches(choices);
            store.add_student(&input)?;
            Ok(Report::Message("Student added successfully.".to_string()))
        }
        Command::DeleteStudents { ids } => {
            let removed = store.delete_students(ids)?;
            Ok(Report::Message(format!("Deleted {removed} student(s).")))
        }
        Command::UpdateStudent {
            id,
            name,
            branch,
            college,
            batches,
            clear_batches,
        } => {
            let batches = if *clear_batches {
                Some(Vec::new())
            } else if batches.is_empty() {
                None
            } else {
                Some(batch_choices(batches))
            };
            let patch = StudentPatch {
                name: name.clone(),
                branch: branch.clone(),
                college: college.clone(),
                batches,
            };
            store.update_student(id, &patch)?;
            Ok(Report::Message("Student updated successfully.".to_string()))
        }
        Command::Students { rows: true } => Ok(Report::StudentRows(store.list_student_rows()?)),
        Command::Students { rows: false } => Ok(Report::Students(store.list_students()?)),
        Command::AddBatch { id, name } => {
            store.add_batch(id, name)?;
            Ok(Report::Message("Batch added successfully.".to_string()))
        }
        Command::Batches => Ok(Report::Batches(store.list_batches()?)),
        Command::DeleteBatches { names } => {
            let removed = store.delete_batches(names)?;
            Ok(Report::Message(format!("Deleted {removed} batch(es).")))
        }
        Command::BatchOptions => Ok(Report::Options(store.batch_options()?)),
    }
}

fn batch_choices(ids: &[String]) -> Vec<BatchChoice> {
    ids.iter().cloned().map(BatchChoice::Batch).collect()
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use crate::render::Report;
    use clap::Parser;
    use roster_core::db::open_db_in_memory;
    use roster_core::SqliteRecordStore;

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["roster"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn update_rejects_batch_with_clear_batches() {
        let parsed = Cli::try_parse_from([
            "roster",
            "update-student",
            "1",
            "--batch",
            "B1",
            "--clear-batches",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn menu_actions_drive_the_store() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteRecordStore::try_new(&conn).unwrap();

        run(&store, &command(&["add-batch", "--id", "B1", "--name", "Morning"])).unwrap();
        run(
            &store,
            &command(&[
                "add-student",
                "--id",
                "1",
                "--name",
                "Ann",
                "--branch",
                "CS",
                "--college",
                "X",
                "--batch",
                "B1",
                "--no-batch",
            ]),
        )
        .unwrap();
        run(&store, &command(&["update-student", "1", "--clear-batches"])).unwrap();

        match run(&store, &command(&["students", "--rows"])).unwrap() {
            Report::StudentRows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].batch, None);
            }
            other => panic!("unexpected report: {other:?}"),
        }

        let err = run(&store, &command(&["add-batch", "--id", "B2", "--name", "Morning"]))
            .unwrap_err();
        assert!(err.is_validation());
    }
}
