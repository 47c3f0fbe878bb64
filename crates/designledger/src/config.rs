//! Project configuration file support for designledger.
//!
//! Loads configuration from `designledger.toml` in the working directory.
//! Every field is optional; command-line flags override what is set here.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use designledger_core::InputPaths;
use designledger_style::{Mode, OperatorAnswers, TopicArea};

/// The config file name
pub const CONFIG_FILE_NAME: &str = "designledger.toml";

/// Project-level configuration loaded from `designledger.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Prefix of the records this stage appends
    pub prefix: Option<String>,
    /// full or quick
    pub mode: Option<String>,
    /// Phase name reported to the tracker
    pub phase: Option<String>,
    /// Upstream prefixes that must already have records
    pub requires: Option<Vec<String>>,
    #[serde(default)]
    pub strict_prerequisites: bool,
    /// Run journal directory (default: platform data dir)
    pub journal_dir: Option<PathBuf>,
    /// Also append run events to this file as JSONL
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub paths: PathsConfig,
    pub recorder: Option<RecorderSection>,
    /// `[answers.<area>]` tables of key = value
    #[serde(default)]
    pub answers: BTreeMap<String, BTreeMap<String, String>>,
}

/// Document locations, relative to the working directory
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    pub project_spec: Option<PathBuf>,
    pub ledger: Option<PathBuf>,
    pub constraints: Option<PathBuf>,
    pub domain_knowledge: Option<PathBuf>,
    pub style_guide: Option<PathBuf>,
    pub snapshots: Option<PathBuf>,
}

/// External tracker and chain scripts
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecorderSection {
    #[serde(default = "default_interpreter")]
    pub interpreter: PathBuf,
    pub tracker: Option<PathBuf>,
    pub chain: Option<PathBuf>,
    /// Per-call timeout in seconds (0 = no limit)
    pub timeout_secs: Option<u64>,
}

fn default_interpreter() -> PathBuf {
    PathBuf::from("python3")
}

impl RecorderSection {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(Duration::from_secs(30)),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    pub fn mode(&self) -> Result<Option<Mode>> {
        self.mode
            .as_deref()
            .map(|m| m.parse::<Mode>())
            .transpose()
            .with_context(|| format!("Invalid mode in {}", CONFIG_FILE_NAME))
    }

    /// Operator answers keyed by topic area
    pub fn answers(&self) -> Result<OperatorAnswers> {
        let mut answers = OperatorAnswers::new();
        for (area, entries) in &self.answers {
            let area: TopicArea = area
                .parse()
                .with_context(|| format!("Invalid [answers.{}] table", area))?;
            for (key, value) in entries {
                answers.insert(area, key.as_str(), value.as_str());
            }
        }
        Ok(answers)
    }

    /// Resolve configured paths against the working directory
    pub fn input_paths(&self, working_dir: &Path) -> InputPaths {
        let defaults = InputPaths::in_dir(working_dir);
        let resolve = |path: &Option<PathBuf>, default: PathBuf| match path {
            Some(p) => working_dir.join(p),
            None => default,
        };
        InputPaths {
            project_spec: resolve(&self.paths.project_spec, defaults.project_spec),
            ledger: resolve(&self.paths.ledger, defaults.ledger),
            constraints: resolve(&self.paths.constraints, defaults.constraints),
            domain_knowledge: resolve(&self.paths.domain_knowledge, defaults.domain_knowledge),
            style_guide: resolve(&self.paths.style_guide, defaults.style_guide),
        }
    }

    pub fn snapshot_dir(&self, working_dir: &Path) -> Option<PathBuf> {
        self.paths.snapshots.as_ref().map(|p| working_dir.join(p))
    }

    pub fn log_file(&self, working_dir: &Path) -> Option<PathBuf> {
        self.log_file.as_ref().map(|p| working_dir.join(p))
    }
}
