use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("Invalid hex colour: {0:?}")]
    InvalidHex(String),

    #[error("Value for {key:?} is not concrete ({value:?}): {reason}")]
    NotConcrete {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown topic area: {0:?}")]
    UnknownArea(String),

    #[error("Unknown mode: {0:?} (expected full or quick)")]
    UnknownMode(String),
}
