//! Table/JSON rendering for CLI reports.
//!
//! Tables carry a 1-based `No.` column; empty listings print an info line
//! instead of an empty table.

use roster_core::{Batch, BatchChoice, Student, StudentRow};

/// Result of one CLI action, rendered after the store is released.
#[derive(Debug)]
pub enum Report {
    Message(String),
    Students(Vec<Student>),
    StudentRows(Vec<StudentRow>),
    Batches(Vec<Batch>),
    Options(Vec<BatchChoice>),
}

impl Report {
    pub fn render(&self, json: bool) -> Result<String, serde_json::Error> {
        if json {
            return match self {
                Self::Message(message) => serde_json::to_string_pretty(&serde_json::json!({
                    "message": message,
                })),
                Self::Students(students) => serde_json::to_string_pretty(students),
                Self::StudentRows(rows) => serde_json::to_string_pretty(rows),
                Self::Batches(batches) => serde_json::to_string_pretty(batches),
                Self::Options(options) => serde_json::to_string_pretty(options),
            };
        }

        Ok(match self {
            Self::Message(message) => message.clone(),
            Self::Students(students) if students.is_empty() => "No students to display.".to_string(),
            Self::Students(students) => table(
                &["ID", "Name", "Branch", "College", "Batches"],
                students
                    .iter()
                    .map(|student| {
                        vec![
                            student.id.clone(),
                            student.name.clone(),
                            student.branch.clone(),
                            student.college.clone(),
                            student.batches.join(", "),
                        ]
                    })
                    .collect(),
            ),
            Self::StudentRows(rows) if rows.is_empty() => "No students to display.".to_string(),
            Self::StudentRows(rows) => table(
                &["ID", "Name", "Branch", "College", "Batch"],
                rows.iter()
                    .map(|row| {
                        vec![
                            row.id.clone(),
                            row.name.clone(),
                            row.branch.clone(),
                            row.college.clone(),
                            row.batch.clone().unwrap_or_else(|| "None".to_string()),
                        ]
                    })
                    .collect(),
            ),
            Self::Batches(batches) if batches.is_empty() => "No batches to display.".to_string(),
            Self::Batches(batches) => table(
                &["Batch ID", "Batch Name"],
                batches
                    .iter()
                    .map(|batch| vec![batch.id.clone(), batch.name.clone()])
                    .collect(),
            ),
            Self::Options(options) => options
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }
}

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut lines: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    let mut header = vec!["No.".to_string()];
    header.extend(headers.iter().map(|title| title.to_string()));
    lines.push(header);
    for (index, row) in rows.into_iter().enumerate() {
        let mut line = vec![(index + 1).to_string()];
        line.extend(row);
        lines.push(line);
    }

    let mut widths = vec![0; headers.len() + 1];
    for line in &lines {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    lines
        .iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::Report;
    use roster_core::{Batch, BatchChoice};

    #[test]
    fn batches_table_is_numbered_from_one() {
        let report = Report::Batches(vec![
            Batch {
                id: "B1".to_string(),
                name: "Morning".to_string(),
            },
            Batch {
                id: "B22".to_string(),
                name: "Evening".to_string(),
            },
        ]);
        let text = report.render(false).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "No.  Batch ID  Batch Name");
        assert_eq!(lines[1], "1    B1        Morning");
        assert_eq!(lines[2], "2    B22       Evening");
    }

    #[test]
    fn empty_listing_prints_info_line() {
        assert_eq!(
            Report::Students(Vec::new()).render(false).unwrap(),
            "No students to display."
        );
    }

    #[test]
    fn options_list_sentinel_first() {
        let report = Report::Options(vec![BatchChoice::None, BatchChoice::Batch("B1".to_string())]);
        assert_eq!(report.render(false).unwrap(), "None\nB1");
        let json = report.render(true).unwrap();
        assert!(json.contains(r#""kind": "none""#));
    }
}
