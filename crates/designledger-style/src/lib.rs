//! # designledger-style
//!
//! Visual design decisions and the style guide derived from them.
//!
//! ## Key Types
//!
//! - [`TopicArea`] / [`Mode`] - The fixed checklist and how much of it a run covers
//! - [`StyleProposer`] - Turns the run inputs into concrete [`Proposal`]s
//! - [`OperatorAnswers`] - Operator-supplied values, validated by [`check_concrete`]
//! - [`Rgb`] - Hex parsing and WCAG contrast math
//! - [`render_style_guide`] - Ledger snapshot to markdown, no I/O

mod answers;
mod color;
mod error;
pub mod guide;
mod profile;
mod proposer;
mod topic;

pub use answers::{check_concrete, OperatorAnswers};
pub use color::{format_ratio, Rgb};
pub use error::StyleError;
pub use guide::{project_title, render_style_guide, GuideSnapshot};
pub use profile::{Framework, FrontendStack, ProductProfile, UpstreamLibrary};
pub use proposer::{Proposal, ProposalInputs, ProposalSource, StyleProposer};
pub use topic::{Mode, Section, TopicArea};
