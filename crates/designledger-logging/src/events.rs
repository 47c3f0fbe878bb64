use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for an appender run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RunStarted {
        task_id: String,
        mode: String,
        prefix: String,
        working_dir: PathBuf,
    },
    /// An input document could not be read
    InputMissing {
        name: String,
        path: PathBuf,
        required: bool,
    },
    PrerequisiteMissing {
        prefix: String,
        strict: bool,
    },
    TopicProcessed {
        area: String,
        proposed: usize,
        appended: usize,
    },
    TopicDeferred {
        area: String,
        reason: String,
    },
    ConflictRecorded {
        existing: String,
        key: String,
        existing_value: String,
        proposed_value: String,
    },
    RecordsAppended {
        prefix: String,
        ids: Vec<String>,
    },
    StyleGuideWritten {
        path: PathBuf,
        bytes: usize,
    },
    RecorderFailed {
        recorder: String,
        call: String,
        error: String,
    },
    RunCompleted {
        appended: usize,
        conflicts: usize,
        deferred: usize,
        duration_secs: f64,
    },
}

impl LogEvent {
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for run events. Writes to stderr, plus an optional JSONL file.
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger that also appends every event to `log_path` as JSON
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let _ = writeln!(file, "{}", event.with_timestamp());
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::RunStarted {
                mode,
                prefix,
                working_dir,
                ..
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {} {}",
                    "designledger".bold().bright_white(),
                    format!("[{} mode, {}]", mode, prefix).bright_blue(),
                    working_dir.display().to_string().dimmed()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::InputMissing {
                name,
                path,
                required,
            } => {
                if *required {
                    let _ = writeln!(
                        stderr,
                        "  {} Missing required input {} ({})",
                        "✗".bright_red(),
                        name.bold(),
                        path.display()
                    );
                } else {
                    let _ = writeln!(
                        stderr,
                        "  {} {} not found, continuing without it",
                        "⚠".bright_yellow(),
                        name
                    );
                }
            }
            LogEvent::PrerequisiteMissing { prefix, strict } => {
                let marker = if *strict {
                    "✗".bright_red()
                } else {
                    "⚠".bright_yellow()
                };
                let _ = writeln!(
                    stderr,
                    "  {} No {} decisions in the ledger",
                    marker, prefix
                );
            }
            LogEvent::TopicProcessed {
                area,
                proposed,
                appended,
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} {:<20} {}",
                    "▶".bright_cyan(),
                    area,
                    format!("{} new of {} proposed", appended, proposed).dimmed()
                );
            }
            LogEvent::TopicDeferred { area, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {:<20} {}",
                    "…".dimmed(),
                    area,
                    "deferred".dimmed()
                );
            }
            LogEvent::ConflictRecorded {
                existing,
                key,
                existing_value,
                proposed_value,
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} = {} conflicts with {} ({})",
                    "⚠".bright_yellow(),
                    key,
                    proposed_value,
                    existing.bold(),
                    existing_value
                );
            }
            LogEvent::RecordsAppended { ids, .. } => {
                let _ = writeln!(stderr);
                if let (Some(first), Some(last)) = (ids.first(), ids.last()) {
                    let range = if first == last {
                        first.clone()
                    } else {
                        format!("{}..{}", first, last)
                    };
                    let _ = writeln!(
                        stderr,
                        "  {} Appended {} {} ({})",
                        "✓".bright_green(),
                        ids.len(),
                        if ids.len() == 1 { "record" } else { "records" },
                        range
                    );
                } else {
                    let _ = writeln!(
                        stderr,
                        "  {} {}",
                        "✓".bright_green(),
                        "Ledger already up to date".dimmed()
                    );
                }
            }
            LogEvent::StyleGuideWritten { path, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} Wrote {}",
                    "✓".bright_green(),
                    path.display()
                );
            }
            LogEvent::RecorderFailed {
                recorder,
                call,
                error,
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} Recorder {} ({}) failed: {}",
                    "⚠".bright_yellow(),
                    recorder,
                    call,
                    error.dimmed()
                );
            }
            LogEvent::RunCompleted { .. } => {
                // The binary prints the outcome summary
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::RunStarted { mode, prefix, .. } => {
                format!("[{}] run:start {} {}", timestamp, mode, prefix)
            }
            LogEvent::InputMissing { name, required, .. } => format!(
                "[{}] input:missing {}{}",
                timestamp,
                name,
                if *required { " (required)" } else { "" }
            ),
            LogEvent::PrerequisiteMissing { prefix, .. } => {
                format!("[{}] prereq:missing {}", timestamp, prefix)
            }
            LogEvent::TopicProcessed {
                area,
                proposed,
                appended,
            } => format!(
                "[{}] topic:{} {}/{}",
                timestamp, area, appended, proposed
            ),
            LogEvent::TopicDeferred { area, .. } => {
                format!("[{}] topic:{} deferred", timestamp, area)
            }
            LogEvent::ConflictRecorded { existing, key, .. } => {
                format!("[{}] conflict:{} {}", timestamp, existing, key)
            }
            LogEvent::RecordsAppended { ids, .. } => {
                format!("[{}] append:{}", timestamp, ids.join(","))
            }
            LogEvent::StyleGuideWritten { path, bytes } => {
                format!("[{}] guide:{} {}b", timestamp, path.display(), bytes)
            }
            LogEvent::RecorderFailed { recorder, call, .. } => {
                format!("[{}] recorder:fail {} {}", timestamp, recorder, call)
            }
            LogEvent::RunCompleted {
                appended,
                conflicts,
                duration_secs,
                ..
            } => format!(
                "[{}] run:done +{} !{} {:.1}s",
                timestamp, appended, conflicts, duration_secs
            ),
        };
        let _ = writeln!(std::io::stderr(), "{}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagging() {
        let event = LogEvent::TopicDeferred {
            area: "Icons".to_string(),
            reason: "not covered in quick mode".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "topic_deferred");
        assert_eq!(json["area"], "Icons");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("compact".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_file_output_is_timestamped_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.jsonl");
        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap();

        logger.log(&LogEvent::RecordsAppended {
            prefix: "STYLE".to_string(),
            ids: vec!["STYLE-01".to_string()],
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(value["event"], "records_appended");
        assert!(value["timestamp"].is_string());
    }
}
