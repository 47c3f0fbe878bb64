use std::fs;
use std::io;
use std::path::Path;

use designledger_ledger::{Ledger, LedgerError};

use crate::{InputPaths, RunError};

/// The documents a run reads, loaded before anything is written
#[derive(Debug, Clone)]
pub struct InputDocuments {
    pub project_spec: String,
    pub constraints: Option<String>,
    pub domain_knowledge: Option<String>,
    pub ledger: Ledger,
}

impl InputDocuments {
    /// Load all inputs. The project spec and ledger are required; the other
    /// two are read when present.
    pub fn load(paths: &InputPaths) -> Result<Self, RunError> {
        let project_spec = read_optional(&paths.project_spec)?.ok_or_else(|| {
            RunError::MissingRequiredInput {
                name: "project specification".to_string(),
                path: paths.project_spec.clone(),
            }
        })?;

        let ledger = Ledger::load(&paths.ledger).map_err(|e| match e {
            LedgerError::NotFound(path) => RunError::MissingRequiredInput {
                name: "decision ledger".to_string(),
                path,
            },
            other => RunError::Ledger(other),
        })?;

        Ok(Self {
            project_spec,
            constraints: read_optional(&paths.constraints)?,
            domain_knowledge: read_optional(&paths.domain_knowledge)?,
            ledger,
        })
    }

    /// Names of the optional inputs that were found
    pub fn advisory_sources(&self) -> Vec<String> {
        let mut sources = Vec::new();
        if self.constraints.is_some() {
            sources.push("constraints".to_string());
        }
        if self.domain_knowledge.is_some() {
            sources.push("domain knowledge".to_string());
        }
        sources
    }

    /// Names of the optional inputs that were not found
    pub fn missing_optional(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.constraints.is_none() {
            missing.push("constraints");
        }
        if self.domain_knowledge.is_none() {
            missing.push("domain knowledge");
        }
        missing
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, RunError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RunError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_optional_inputs_may_be_absent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("project-spec.md"), "Shop").unwrap();
        fs::write(dir.path().join("decisions.md"), "FRONT-01: React\n").unwrap();
        fs::write(dir.path().join("constraints.md"), "WCAG AA").unwrap();

        let inputs = InputDocuments::load(&InputPaths::in_dir(dir.path())).unwrap();
        assert_eq!(inputs.constraints.as_deref(), Some("WCAG AA"));
        assert!(inputs.domain_knowledge.is_none());
        assert_eq!(inputs.advisory_sources(), vec!["constraints".to_string()]);
        assert_eq!(inputs.missing_optional(), vec!["domain knowledge"]);
        assert_eq!(inputs.ledger.records().len(), 1);
    }

    #[test]
    fn test_missing_ledger_is_required_input() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("project-spec.md"), "Shop").unwrap();

        let err = InputDocuments::load(&InputPaths::in_dir(dir.path())).unwrap_err();
        match err {
            RunError::MissingRequiredInput { name, .. } => assert_eq!(name, "decision ledger"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
