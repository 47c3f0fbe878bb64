use serde::Serialize;

use crate::{DecisionId, DecisionRecord, NOTE_SEPARATOR};

/// A `key = value` statement, optionally followed by ` — note`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    /// Key as written
    pub key: String,
    pub value: String,
    pub note: Option<String>,
}

impl Assertion {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into().trim().to_string(),
            value: value.into().trim().to_string(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn parse(statement: &str) -> Option<Self> {
        let (key, rest) = statement.split_once('=')?;
        let key = key.trim().trim_end_matches(':').trim();
        if key.is_empty() {
            return None;
        }

        let (value, note) = match rest.split_once(NOTE_SEPARATOR) {
            Some((value, note)) => (value, Some(note.trim().to_string())),
            None => (rest, None),
        };
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        Some(Self {
            key: key.to_string(),
            value: value.to_string(),
            note: note.filter(|n| !n.is_empty()),
        })
    }

    /// Key used for comparisons: lowercase, whitespace collapsed
    pub fn normalized_key(&self) -> String {
        normalize(&self.key)
    }

    pub fn same_value(&self, other: &Assertion) -> bool {
        normalize(&self.value) == normalize(&other.value)
    }

    pub fn statement(&self) -> String {
        match self.note {
            Some(ref note) => format!("{} = {}{}{}", self.key, self.value, NOTE_SEPARATOR, note),
            None => format!("{} = {}", self.key, self.value),
        }
    }
}

pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A proposed assertion that contradicts a decision from another prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub existing: DecisionId,
    pub key: String,
    pub existing_value: String,
    pub proposed_value: String,
}

impl Conflict {
    /// Text stored in the CONFLICT record
    pub fn detail(&self) -> String {
        format!(
            "{} = {} contradicts {} ({} = {})",
            self.key, self.proposed_value, self.existing, self.key, self.existing_value
        )
    }
}

/// Compare a proposal against the latest assertion for the same key made
/// under any prefix other than `own_prefix`.
pub fn find_conflict(
    records: &[DecisionRecord],
    own_prefix: &str,
    proposed: &Assertion,
) -> Option<Conflict> {
    let key = proposed.normalized_key();

    let (record, existing) = records
        .iter()
        .rev()
        .filter(|r| r.id.prefix() != own_prefix)
        .filter_map(|r| r.assertion().map(|a| (r, a)))
        .find(|(_, a)| a.normalized_key() == key)?;

    if existing.same_value(proposed) {
        return None;
    }

    Some(Conflict {
        existing: record.id.clone(),
        key: proposed.key.clone(),
        existing_value: existing.value,
        proposed_value: proposed.value.clone(),
    })
}
