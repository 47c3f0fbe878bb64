use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid decision prefix: {0:?} (expected a short uppercase tag)")]
    InvalidPrefix(String),

    #[error("Invalid decision id: {0:?}")]
    InvalidId(String),

    #[error(
        "Ledger changed under prefix {prefix}: expected last sequence {expected}, found {found}"
    )]
    SequenceConflict {
        prefix: String,
        expected: u32,
        found: u32,
    },

    #[error("No sequence numbers left under prefix {prefix}")]
    SequenceExhausted { prefix: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
