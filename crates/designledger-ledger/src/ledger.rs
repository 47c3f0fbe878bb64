use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::parser::{last_seq, parse_ledger};
use crate::record::validate_prefix;
use crate::{DecisionId, DecisionRecord, LedgerError, RecordDraft};

/// The shared append-only decision log backed by a text file
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    records: Vec<DecisionRecord>,
    duplicates: Vec<DecisionId>,
}

impl Ledger {
    /// Load a ledger from disk. The file must already exist.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                LedgerError::NotFound(path.to_path_buf())
            } else {
                LedgerError::Io(e)
            }
        })?;
        Ok(Self::from_text(path, &text))
    }

    pub fn from_text(path: &Path, text: &str) -> Self {
        let parsed = parse_ledger(text);
        debug!(
            path = %path.display(),
            records = parsed.records.len(),
            "Loaded ledger"
        );
        Self {
            path: path.to_path_buf(),
            records: parsed.records,
            duplicates: parsed.duplicates,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    pub fn duplicates(&self) -> &[DecisionId] {
        &self.duplicates
    }

    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a DecisionRecord> {
        self.records.iter().filter(move |r| r.id.prefix() == prefix)
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.with_prefix(prefix).next().is_some()
    }

    pub fn get(&self, id: &DecisionId) -> Option<&DecisionRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn last_seq(&self, prefix: &str) -> u32 {
        last_seq(&self.records, prefix)
    }

    /// The id the next append under `prefix` would receive
    pub fn next_id(&self, prefix: &str) -> Result<DecisionId, LedgerError> {
        DecisionId::new(prefix, seq_after(prefix, self.last_seq(prefix), 0)?)
    }

    /// Append drafts under `prefix`, numbering them after the last used
    /// sequence number.
    ///
    /// The file is re-read first. If another writer appended under the same
    /// prefix since this ledger was loaded, nothing is written and
    /// [`LedgerError::SequenceConflict`] is returned.
    pub fn append(
        &mut self,
        prefix: &str,
        drafts: Vec<RecordDraft>,
    ) -> Result<Vec<DecisionId>, LedgerError> {
        validate_prefix(prefix)?;
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let on_disk = fs::read_to_string(&self.path)?;
        let current = parse_ledger(&on_disk);
        let expected = self.last_seq(prefix);
        let found = last_seq(&current.records, prefix);
        if found != expected {
            return Err(LedgerError::SequenceConflict {
                prefix: prefix.to_string(),
                expected,
                found,
            });
        }

        let mut appended = Vec::with_capacity(drafts.len());
        let mut text = String::new();
        if !on_disk.is_empty() && !on_disk.ends_with('\n') {
            text.push('\n');
        }
        for (offset, draft) in drafts.into_iter().enumerate() {
            let id = DecisionId::new(prefix, seq_after(prefix, expected, offset)?)?;
            let record = draft.into_record(id);
            text.push_str(&record.render());
            text.push('\n');
            appended.push(record);
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(text.as_bytes())?;
        file.sync_data()?;

        let ids: Vec<DecisionId> = appended.iter().map(|r| r.id.clone()).collect();
        info!(
            prefix,
            count = ids.len(),
            first = %ids[0],
            "Appended decision records"
        );

        self.records = current.records;
        self.duplicates = current.duplicates;
        self.records.extend(appended);
        Ok(ids)
    }
}

/// Sequence number of the `offset`-th record appended after `last`
fn seq_after(prefix: &str, last: u32, offset: usize) -> Result<u32, LedgerError> {
    u32::try_from(offset)
        .ok()
        .and_then(|offset| last.checked_add(offset))
        .and_then(|seq| seq.checked_add(1))
        .ok_or_else(|| LedgerError::SequenceExhausted {
            prefix: prefix.to_string(),
        })
}
