use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from an audit-trail call. Callers treat all of them as advisory.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to spawn recorder process: {0}")]
    SpawnFailed(#[from] std::io::Error),

    #[error("Recorder timed out after {0:?}")]
    Timeout(Duration),

    #[error("Recorder `{command}` exited with code {code}: {stderr}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Recorder execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Failed to encode recorder metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Configuration for recorder subprocesses
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub working_dir: PathBuf,
    /// None = no limit
    pub timeout: Option<Duration>,
    pub env_vars: HashMap<String, String>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            timeout: Some(DEFAULT_TIMEOUT),
            env_vars: HashMap::new(),
        }
    }
}

impl RecorderConfig {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_env(mut self, key: String, value: String) -> Self {
        self.env_vars.insert(key, value);
        self
    }
}

/// Metadata attached to a chain entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMetadata {
    /// Ids appended by the run
    pub decisions: Vec<String>,
    pub style_guide_created: bool,
    /// Optional inputs that informed the run
    pub advisory_sources: Vec<String>,
}

/// One before/after audit pair for the chain recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEntry {
    pub task_id: String,
    pub pipeline: String,
    pub stage: String,
    pub agent: String,
    pub before: PathBuf,
    pub after: PathBuf,
    pub description: String,
    pub metadata: ChainMetadata,
}

/// The audit-trail capability the appender calls.
///
/// Implementations report failures through `AuditError`; the appender logs
/// them and carries on.
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// Called once preconditions pass
    async fn phase_started(&self, phase: &str) -> Result<(), AuditError>;

    /// Called after the ledger and guide are written
    async fn phase_completed(&self, phase: &str, summary: &str) -> Result<(), AuditError>;

    /// Record the before/after snapshot pair
    async fn record_chain(&self, entry: &ChainEntry) -> Result<(), AuditError>;
}

/// Recorder that does nothing, for `--no-recorders` and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

#[async_trait]
impl AuditRecorder for NoopRecorder {
    fn name(&self) -> &str {
        "noop"
    }

    async fn phase_started(&self, _phase: &str) -> Result<(), AuditError> {
        Ok(())
    }

    async fn phase_completed(&self, _phase: &str, _summary: &str) -> Result<(), AuditError> {
        Ok(())
    }

    async fn record_chain(&self, _entry: &ChainEntry) -> Result<(), AuditError> {
        Ok(())
    }
}
