use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// One line of the run journal
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalLine {
    RunStart {
        timestamp: DateTime<Utc>,
        task_id: String,
        mode: String,
        prefix: String,
        working_dir: PathBuf,
    },
    Decision {
        id: String,
        status: String,
        statement: String,
        timestamp: DateTime<Utc>,
    },
    RunEnd {
        outcome: String,
        appended: usize,
        conflicts: usize,
        warnings: usize,
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    },
}

const MAX_NAME_ATTEMPTS: u32 = 100;

/// Writes a JSONL record of one run.
///
/// The file is named `<UTC timestamp>_<first 6 hex of sha256(project spec)>.jsonl`
/// so runs over the same project sort together by time.
pub struct RunJournal {
    file: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl RunJournal {
    pub fn create(dir: &Path, project_spec: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;

        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
        let hash = short_hash(project_spec);

        // Runs within the same second get a `-2`, `-3`, ... suffix
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let stem = if attempt == 1 {
                timestamp.clone()
            } else {
                format!("{}-{}", timestamp, attempt)
            };
            let path = dir.join(format!("{}_{}.jsonl", stem, hash));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    return Ok(Self {
                        file: Mutex::new(BufWriter::new(file)),
                        path,
                    })
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Too many run journals for {} in {}", timestamp, dir.display()),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_start(&self, task_id: &str, mode: &str, prefix: &str, working_dir: &Path) {
        self.write_line(&JournalLine::RunStart {
            timestamp: Utc::now(),
            task_id: task_id.to_string(),
            mode: mode.to_string(),
            prefix: prefix.to_string(),
            working_dir: working_dir.to_path_buf(),
        });
    }

    pub fn write_decision(&self, id: &str, status: &str, statement: &str) {
        self.write_line(&JournalLine::Decision {
            id: id.to_string(),
            status: status.to_string(),
            statement: statement.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn write_end(
        &self,
        outcome: &str,
        appended: usize,
        conflicts: usize,
        warnings: usize,
        duration_secs: f64,
    ) {
        self.write_line(&JournalLine::RunEnd {
            outcome: outcome.to_string(),
            appended,
            conflicts,
            warnings,
            duration_secs,
            timestamp: Utc::now(),
        });
    }

    fn write_line(&self, line: &JournalLine) {
        if let Ok(json) = serde_json::to_string(line) {
            if let Ok(mut writer) = self.file.lock() {
                let _ = writeln!(writer, "{}", json);
                let _ = writer.flush();
            }
        }
    }
}

/// Default journal directory under the platform data dir
pub fn default_journal_dir() -> io::Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine data directory",
        )
    })?;
    Ok(data_dir.join("designledger").join("runs"))
}

fn short_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = hex::encode(hasher.finalize());
    hash[..6].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let journal = RunJournal::create(dir.path(), "e-commerce app, blue brand").unwrap();

        let name = journal.path().file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(&format!("_{}.jsonl", short_hash("e-commerce app, blue brand"))));
        assert!(name.contains('T'));
        assert_eq!(short_hash("x").len(), 6);
    }

    #[test]
    fn test_same_second_runs_get_separate_journals() {
        let dir = tempfile::tempdir().unwrap();
        let first = RunJournal::create(dir.path(), "spec").unwrap();
        first.write_start("task-1", "full", "STYLE", dir.path());
        let second = RunJournal::create(dir.path(), "spec").unwrap();
        second.write_start("task-2", "full", "STYLE", dir.path());

        assert_ne!(first.path(), second.path());
        let first_contents = std::fs::read_to_string(first.path()).unwrap();
        assert!(first_contents.contains("task-1"));
        assert!(!first_contents.contains("task-2"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_journal_lines() {
        let dir = tempfile::tempdir().unwrap();
        let journal = RunJournal::create(dir.path(), "spec").unwrap();

        journal.write_start("task-1", "full", "STYLE", dir.path());
        journal.write_decision("STYLE-01", "active", "Primary color = #2563EB");
        journal.write_end("success", 1, 0, 0, 0.2);

        let contents = std::fs::read_to_string(journal.path()).unwrap();
        let types: Vec<String> = contents
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["type"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(types, vec!["run_start", "decision", "run_end"]);
    }
}
