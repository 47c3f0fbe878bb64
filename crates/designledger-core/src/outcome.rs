use serde::Serialize;
use std::path::PathBuf;

use designledger_ledger::{Conflict, DecisionId};
use designledger_style::{Mode, TopicArea};

/// A recorder call that failed. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecorderFailure {
    pub recorder: String,
    pub call: String,
    pub error: String,
}

/// What a run did
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub task_id: String,
    pub mode: Mode,
    pub prefix: String,
    /// Ids appended, in order. Predicted ids on a dry run.
    pub appended: Vec<DecisionId>,
    /// Areas given a DEFERRED record by this run
    pub deferred: Vec<TopicArea>,
    /// Conflicts recorded by this run
    pub conflicts: Vec<Conflict>,
    /// Conflicts recorded by an earlier run that still stand
    pub open_conflicts: Vec<Conflict>,
    /// Proposals already in force, not appended again
    pub unchanged: usize,
    pub warnings: Vec<String>,
    pub recorder_failures: Vec<RecorderFailure>,
    pub style_guide_path: PathBuf,
    #[serde(skip)]
    pub style_guide: String,
    pub dry_run: bool,
    pub total_duration_secs: f64,
}

impl RunOutcome {
    /// True when nothing needs the operator's attention
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
            && self.open_conflicts.is_empty()
            && self.warnings.is_empty()
            && self.recorder_failures.is_empty()
    }

    /// One-line summary passed to the phase tracker
    pub fn summary(&self) -> String {
        let appended = match (self.appended.first(), self.appended.last()) {
            (Some(first), Some(last)) if first != last => {
                format!("{} decisions appended ({}..{})", self.appended.len(), first, last)
            }
            (Some(only), _) => format!("1 decision appended ({})", only),
            _ => "no new decisions".to_string(),
        };
        let mut summary = format!(
            "{}; {} deferred; {} conflicts",
            appended,
            self.deferred.len(),
            self.conflicts.len()
        );
        if !self.open_conflicts.is_empty() {
            summary.push_str(&format!(" ({} still open)", self.open_conflicts.len()));
        }
        summary
    }
}
