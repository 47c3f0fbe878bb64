use std::collections::HashSet;

use tracing::warn;

use crate::{DecisionId, DecisionRecord};

/// Records found in ledger text, in file order
#[derive(Debug, Default, Clone)]
pub struct ParsedLedger {
    pub records: Vec<DecisionRecord>,
    /// Ids that appear more than once
    pub duplicates: Vec<DecisionId>,
}

/// Parse ledger text. Lines that are not records or rationale continuations
/// are ignored.
pub fn parse_ledger(text: &str) -> ParsedLedger {
    let mut parsed = ParsedLedger::default();
    let mut seen: HashSet<DecisionId> = HashSet::new();

    for line in text.lines() {
        if let Some(record) = DecisionRecord::parse_line(line) {
            if !seen.insert(record.id.clone()) {
                warn!(id = %record.id, "Duplicate decision id in ledger");
                parsed.duplicates.push(record.id.clone());
            }
            parsed.records.push(record);
            continue;
        }

        if let Some(rationale) = DecisionRecord::parse_rationale(line) {
            if let Some(last) = parsed.records.last_mut() {
                if last.rationale.is_none() {
                    last.rationale = Some(rationale.to_string());
                }
            }
        }
    }

    parsed
}

/// Highest sequence number used under `prefix`, 0 when none
pub fn last_seq(records: &[DecisionRecord], prefix: &str) -> u32 {
    records
        .iter()
        .filter(|r| r.id.prefix() == prefix)
        .map(|r| r.id.seq())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordStatus;

    const LEDGER: &str = "# Decisions

## Frontend
- FRONT-01: React + Tailwind
  Rationale: team already knows both
- FRONT-02: component library = shadcn/ui

## Style
STYLE-01: Primary color = #2563EB — 5.17:1 on white
STYLE-02: DEFERRED — Icons: not covered in quick mode
";

    #[test]
    fn test_parse_ledger_keeps_order() {
        let parsed = parse_ledger(LEDGER);
        let ids: Vec<String> = parsed.records.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["FRONT-01", "FRONT-02", "STYLE-01", "STYLE-02"]);
        assert!(parsed.duplicates.is_empty());
    }

    #[test]
    fn test_rationale_attaches_to_previous_record() {
        let parsed = parse_ledger(LEDGER);
        assert_eq!(
            parsed.records[0].rationale.as_deref(),
            Some("team already knows both")
        );
        assert!(parsed.records[1].rationale.is_none());
    }

    #[test]
    fn test_status_detection() {
        let parsed = parse_ledger(LEDGER);
        assert_eq!(parsed.records[2].status, RecordStatus::Active);
        assert_eq!(parsed.records[3].status, RecordStatus::Deferred);
    }

    #[test]
    fn test_duplicates_reported() {
        let parsed = parse_ledger("STYLE-01: a = 1\nSTYLE-01: b = 2\n");
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.duplicates.len(), 1);
    }

    #[test]
    fn test_last_seq_per_prefix() {
        let parsed = parse_ledger("FRONT-07: x\nSTYLE-02: y\nSTYLE-11: z\n");
        assert_eq!(last_seq(&parsed.records, "STYLE"), 11);
        assert_eq!(last_seq(&parsed.records, "FRONT"), 7);
        assert_eq!(last_seq(&parsed.records, "API"), 0);
    }
}
