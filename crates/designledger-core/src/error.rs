use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Missing required input {name}: {path} not found")]
    MissingRequiredInput { name: String, path: PathBuf },

    #[error("No {prefix} decisions in the ledger; run that stage first")]
    MissingPrerequisiteDecision { prefix: String },

    #[error("Invalid operator answer: {0}")]
    InvalidAnswer(#[from] designledger_style::StyleError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] designledger_ledger::LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
