//! # designledger-ledger
//!
//! The shared, append-only decision ledger.
//!
//! Every workflow stage writes records shaped `<PREFIX>-<NN>: <statement>`
//! into one markdown file. This crate parses that file, numbers new records
//! per prefix and appends them without touching existing lines.
//!
//! ## Key Types
//!
//! - [`Ledger`] - Load and append with an optimistic sequence check
//! - [`DecisionRecord`] / [`DecisionId`] - One immutable ledger entry
//! - [`RecordDraft`] - A record waiting for its id
//! - [`Assertion`] - `key = value` statements, used to detect [`Conflict`]s
//!
//! ## Record Format
//!
//! ```text
//! FRONT-01: React + Tailwind
//! STYLE-01: Primary color = #2563EB — 5.17:1 on white
//!   Rationale: brand colour named in the project spec
//! STYLE-05: DEFERRED — Components: not covered in quick mode
//! STYLE-06: CONFLICT — Component library = MUI contradicts FRONT-02 (...)
//! ```

mod assertion;
mod error;
mod ledger;
mod parser;
mod record;

pub use assertion::{find_conflict, normalize, Assertion, Conflict};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use parser::{last_seq, parse_ledger, ParsedLedger};
pub use record::{
    validate_prefix, DecisionId, DecisionRecord, RecordDraft, RecordStatus, NOTE_SEPARATOR,
};
