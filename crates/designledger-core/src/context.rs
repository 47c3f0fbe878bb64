use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use designledger_style::{Mode, OperatorAnswers};

pub const DEFAULT_PREFIX: &str = "STYLE";
pub const DEFAULT_REQUIRED_PREFIX: &str = "FRONT";

/// Where the run reads and writes its documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub project_spec: PathBuf,
    pub ledger: PathBuf,
    pub constraints: PathBuf,
    pub domain_knowledge: PathBuf,
    pub style_guide: PathBuf,
}

impl InputPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            project_spec: dir.join("project-spec.md"),
            ledger: dir.join("decisions.md"),
            constraints: dir.join("constraints.md"),
            domain_knowledge: dir.join("domain-knowledge.md"),
            style_guide: dir.join("style-guide.md"),
        }
    }
}

/// Everything one run needs to know
#[derive(Debug, Clone)]
pub struct RunContext {
    /// uuid v4, shared by snapshots, the chain entry and the journal
    pub task_id: String,
    pub working_dir: PathBuf,
    pub paths: InputPaths,
    pub mode: Mode,
    /// Prefix of the records this run appends
    pub prefix: String,
    /// Upstream prefixes that must already have records
    pub required_prefixes: Vec<String>,
    pub strict_prerequisites: bool,
    pub answers: OperatorAnswers,
    /// Phase name passed to the tracker
    pub phase: String,
    pub pipeline: String,
    pub stage: String,
    pub agent: String,
    /// Before/after ledger snapshots for the chain recorder
    pub snapshot_dir: PathBuf,
    /// None = no journal
    pub journal_dir: Option<PathBuf>,
    /// Compute everything, write nothing
    pub dry_run: bool,
    started_at: Instant,
}

impl RunContext {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            paths: InputPaths::in_dir(&working_dir),
            snapshot_dir: working_dir.join(".designledger").join("snapshots"),
            working_dir,
            mode: Mode::Full,
            prefix: DEFAULT_PREFIX.to_string(),
            required_prefixes: vec![DEFAULT_REQUIRED_PREFIX.to_string()],
            strict_prerequisites: false,
            answers: OperatorAnswers::new(),
            phase: "design-style".to_string(),
            pipeline: "design".to_string(),
            stage: "style".to_string(),
            agent: "designledger".to_string(),
            journal_dir: None,
            dry_run: false,
            started_at: Instant::now(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_required_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.required_prefixes = prefixes;
        self
    }

    pub fn with_strict_prerequisites(mut self, strict: bool) -> Self {
        self.strict_prerequisites = strict;
        self
    }

    pub fn with_answers(mut self, answers: OperatorAnswers) -> Self {
        self.answers = answers;
        self
    }

    pub fn with_paths(mut self, paths: InputPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    pub fn with_journal_dir(mut self, dir: PathBuf) -> Self {
        self.journal_dir = Some(dir);
        self
    }

    pub fn with_snapshot_dir(mut self, dir: PathBuf) -> Self {
        self.snapshot_dir = dir;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn before_snapshot(&self) -> PathBuf {
        self.snapshot_dir.join(format!("{}-before.md", self.task_id))
    }

    pub fn after_snapshot(&self) -> PathBuf {
        self.snapshot_dir.join(format!("{}-after.md", self.task_id))
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = RunContext::new(PathBuf::from("/work"));
        assert_eq!(ctx.paths.ledger, PathBuf::from("/work/decisions.md"));
        assert_eq!(ctx.prefix, "STYLE");
        assert_eq!(ctx.required_prefixes, vec!["FRONT".to_string()]);
        assert_eq!(ctx.mode, Mode::Full);
        assert!(!ctx.strict_prerequisites);
        assert!(uuid::Uuid::parse_str(&ctx.task_id).is_ok());
    }

    #[test]
    fn test_snapshot_paths_share_task_id() {
        let ctx = RunContext::new(PathBuf::from("/work"));
        let before = ctx.before_snapshot();
        let after = ctx.after_snapshot();
        assert_eq!(before.parent(), after.parent());
        assert!(before.to_string_lossy().contains(&ctx.task_id));
        assert!(after.to_string_lossy().ends_with("-after.md"));
    }
}
