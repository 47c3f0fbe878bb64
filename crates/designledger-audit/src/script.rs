use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{AuditError, AuditRecorder, ChainEntry, ProcessSpawner, RecorderConfig};

/// Recorder backed by interpreter-run scripts.
///
/// Either script may be absent, in which case the matching calls succeed
/// without doing anything.
pub struct ScriptRecorder {
    interpreter: PathBuf,
    tracker: Option<PathBuf>,
    chain: Option<PathBuf>,
    config: RecorderConfig,
}

impl ScriptRecorder {
    pub fn new(interpreter: PathBuf, config: RecorderConfig) -> Self {
        Self {
            interpreter,
            tracker: None,
            chain: None,
            config,
        }
    }

    pub fn with_tracker(mut self, script: PathBuf) -> Self {
        self.tracker = Some(script);
        self
    }

    pub fn with_chain(mut self, script: PathBuf) -> Self {
        self.chain = Some(script);
        self
    }

    /// Arguments passed to the chain script after its path
    pub fn chain_args(entry: &ChainEntry) -> Result<Vec<String>, AuditError> {
        Ok(vec![
            "add".to_string(),
            "--task-id".to_string(),
            entry.task_id.clone(),
            "--pipeline".to_string(),
            entry.pipeline.clone(),
            "--stage".to_string(),
            entry.stage.clone(),
            "--agent".to_string(),
            entry.agent.clone(),
            "--before".to_string(),
            entry.before.display().to_string(),
            "--after".to_string(),
            entry.after.display().to_string(),
            "--description".to_string(),
            entry.description.clone(),
            "--metadata".to_string(),
            serde_json::to_string(&entry.metadata)?,
        ])
    }

    async fn invoke(&self, script: &Path, args: Vec<String>) -> Result<(), AuditError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(script.display().to_string());
        full.extend(args);

        let output = ProcessSpawner::spawn(&self.interpreter, &full, &self.config).await?;
        if output.success() {
            debug!(script = %script.display(), "Recorder call succeeded");
            return Ok(());
        }

        warn!(
            script = %script.display(),
            exit_code = output.exit_code,
            "Recorder call failed"
        );
        Err(AuditError::NonZeroExit {
            command: format!("{} {}", self.interpreter.display(), full.join(" ")),
            code: output.exit_code,
            stderr: output.stderr,
        })
    }
}

#[async_trait]
impl AuditRecorder for ScriptRecorder {
    fn name(&self) -> &str {
        "script"
    }

    async fn phase_started(&self, phase: &str) -> Result<(), AuditError> {
        match &self.tracker {
            Some(script) => {
                self.invoke(script, vec!["start".to_string(), phase.to_string()])
                    .await
            }
            None => Ok(()),
        }
    }

    async fn phase_completed(&self, phase: &str, summary: &str) -> Result<(), AuditError> {
        match &self.tracker {
            Some(script) => {
                self.invoke(
                    script,
                    vec![
                        "complete".to_string(),
                        phase.to_string(),
                        summary.to_string(),
                    ],
                )
                .await
            }
            None => Ok(()),
        }
    }

    async fn record_chain(&self, entry: &ChainEntry) -> Result<(), AuditError> {
        match &self.chain {
            Some(script) => self.invoke(script, Self::chain_args(entry)?).await,
            None => Ok(()),
        }
    }
}
