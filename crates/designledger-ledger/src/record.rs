use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Assertion, LedgerError};

/// Separator between a statement and its trailing note or reason.
pub const NOTE_SEPARATOR: &str = " — ";

const DEFERRED_MARKER: &str = "DEFERRED";
const CONFLICT_MARKER: &str = "CONFLICT";
const RATIONALE_MARKER: &str = "Rationale:";
const MAX_PREFIX_LEN: usize = 12;

/// Identifier of a decision record, rendered as `<PREFIX>-<NN>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecisionId {
    prefix: String,
    seq: u32,
}

impl DecisionId {
    pub fn new(prefix: &str, seq: u32) -> Result<Self, LedgerError> {
        validate_prefix(prefix)?;
        Ok(Self {
            prefix: prefix.to_string(),
            seq,
        })
    }

    /// Parse an id such as `STYLE-03`. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let (prefix, digits) = s.trim().split_once('-')?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        validate_prefix(prefix).ok()?;
        let seq = digits.parse().ok()?;
        Some(Self {
            prefix: prefix.to_string(),
            seq,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.prefix, self.seq)
    }
}

impl From<DecisionId> for String {
    fn from(id: DecisionId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for DecisionId {
    type Error = LedgerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or(LedgerError::InvalidId(s))
    }
}

/// Check that a prefix is a short uppercase tag (`STYLE`, `FRONT`, `UX2`).
pub fn validate_prefix(prefix: &str) -> Result<(), LedgerError> {
    let mut chars = prefix.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_uppercase()
                && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
                && prefix.len() <= MAX_PREFIX_LEN
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(LedgerError::InvalidPrefix(prefix.to_string()))
    }
}

/// Whether a record states a decision, defers one, or records a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Active,
    Deferred,
    Conflict,
}

/// A single immutable entry of the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: DecisionId,
    pub status: RecordStatus,
    /// Statement for active records, reason or detail otherwise
    pub statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl DecisionRecord {
    /// Parse a record line. Accepts an optional leading markdown bullet.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let trimmed = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
            .unwrap_or(trimmed);

        let (head, body) = trimmed.split_once(':')?;
        let id = DecisionId::parse(head)?;
        let body = body.trim();

        let (status, statement) = if let Some(rest) = body.strip_prefix(DEFERRED_MARKER) {
            (RecordStatus::Deferred, strip_separator(rest))
        } else if let Some(rest) = body.strip_prefix(CONFLICT_MARKER) {
            (RecordStatus::Conflict, strip_separator(rest))
        } else {
            (RecordStatus::Active, body)
        };

        Some(Self {
            id,
            status,
            statement: statement.to_string(),
            rationale: None,
        })
    }

    /// Parse a rationale continuation line (indented `Rationale: ...`).
    pub fn parse_rationale(line: &str) -> Option<&str> {
        if !line.starts_with(char::is_whitespace) {
            return None;
        }
        line.trim()
            .strip_prefix(RATIONALE_MARKER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    /// The `key = value` assertion carried by an active statement
    pub fn assertion(&self) -> Option<Assertion> {
        if self.is_active() {
            Assertion::parse(&self.statement)
        } else {
            None
        }
    }

    /// Text after the id and colon
    pub fn body(&self) -> String {
        match self.status {
            RecordStatus::Active => self.statement.clone(),
            RecordStatus::Deferred => {
                format!("{}{}{}", DEFERRED_MARKER, NOTE_SEPARATOR, self.statement)
            }
            RecordStatus::Conflict => {
                format!("{}{}{}", CONFLICT_MARKER, NOTE_SEPARATOR, self.statement)
            }
        }
    }

    /// Render the record as ledger text, without a trailing newline
    pub fn render(&self) -> String {
        let mut out = format!("{}: {}", self.id, single_line(&self.body()));
        if let Some(ref rationale) = self.rationale {
            out.push_str(&format!("\n  {} {}", RATIONALE_MARKER, single_line(rationale)));
        }
        out
    }
}

/// A record waiting for an id
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub status: RecordStatus,
    pub statement: String,
    pub rationale: Option<String>,
}

impl RecordDraft {
    pub fn active(statement: impl Into<String>) -> Self {
        Self {
            status: RecordStatus::Active,
            statement: statement.into(),
            rationale: None,
        }
    }

    pub fn deferred(reason: impl Into<String>) -> Self {
        Self {
            status: RecordStatus::Deferred,
            statement: reason.into(),
            rationale: None,
        }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self {
            status: RecordStatus::Conflict,
            statement: detail.into(),
            rationale: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn into_record(self, id: DecisionId) -> DecisionRecord {
        DecisionRecord {
            id,
            status: self.status,
            statement: single_line(&self.statement),
            rationale: self.rationale.map(|r| single_line(&r)),
        }
    }
}

fn strip_separator(rest: &str) -> &str {
    let rest = rest.trim_start();
    rest.strip_prefix('—')
        .or_else(|| rest.strip_prefix(':'))
        .or_else(|| rest.strip_prefix('-'))
        .unwrap_or(rest)
        .trim()
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
