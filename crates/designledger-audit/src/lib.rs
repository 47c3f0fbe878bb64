//! Audit-trail recorders.
//!
//! A run reports itself to two external programs: a phase tracker
//! (`start` / `complete`) and a chain recorder that stores before/after
//! snapshots of the ledger. Both are invoked as `<interpreter> <script> ...`
//! and both are advisory.

mod script;
mod spawner;
mod traits;

pub use script::ScriptRecorder;
pub use spawner::{ProcessOutput, ProcessSpawner};
pub use traits::{AuditError, AuditRecorder, ChainEntry, ChainMetadata, NoopRecorder, RecorderConfig};
