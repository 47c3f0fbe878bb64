//! # designledger-core
//!
//! Orchestrates one style pass over the shared decision ledger:
//! check inputs, propose, append, regenerate the guide, report to the
//! audit recorders.

mod appender;
mod context;
mod error;
mod inputs;
mod outcome;

pub use appender::{regenerate, render_current, Appender};
pub use context::{InputPaths, RunContext};
pub use error::RunError;
pub use inputs::InputDocuments;
pub use outcome::{RecorderFailure, RunOutcome};
