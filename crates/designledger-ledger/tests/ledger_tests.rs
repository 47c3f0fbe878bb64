use std::fs;
use std::io::Write;

use designledger_ledger::{Ledger, LedgerError, RecordDraft, RecordStatus};
use tempfile::TempDir;

fn ledger_file(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("decisions.md");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_missing_ledger() {
    let dir = TempDir::new().unwrap();
    let result = Ledger::load(&dir.path().join("decisions.md"));
    assert!(matches!(result, Err(LedgerError::NotFound(_))));
}

#[test]
fn test_append_starts_at_one_for_new_prefix() {
    let dir = TempDir::new().unwrap();
    let path = ledger_file(&dir, "# Decisions\n\nFRONT-01: React + Tailwind\n");

    let mut ledger = Ledger::load(&path).unwrap();
    assert_eq!(ledger.next_id("STYLE").unwrap().to_string(), "STYLE-01");

    let ids = ledger
        .append(
            "STYLE",
            vec![
                RecordDraft::active("Primary color = #2563EB"),
                RecordDraft::active("Spacing unit = 4px"),
            ],
        )
        .unwrap();

    let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    assert_eq!(ids, vec!["STYLE-01", "STYLE-02"]);

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "# Decisions\n\nFRONT-01: React + Tailwind\nSTYLE-01: Primary color = #2563EB\nSTYLE-02: Spacing unit = 4px\n"
    );
}

#[test]
fn test_append_continues_after_highest_sequence() {
    let dir = TempDir::new().unwrap();
    let path = ledger_file(
        &dir,
        "STYLE-01: a = 1\nFRONT-01: x\nSTYLE-04: b = 2\nSTYLE-02: c = 3",
    );

    let mut ledger = Ledger::load(&path).unwrap();
    let ids = ledger
        .append("STYLE", vec![RecordDraft::deferred("Icons: not covered in quick mode")])
        .unwrap();
    assert_eq!(ids[0].to_string(), "STYLE-05");

    // Missing trailing newline is repaired before appending
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("STYLE-02: c = 3\nSTYLE-05: DEFERRED — Icons: not covered in quick mode\n"));

    let reloaded = Ledger::load(&path).unwrap();
    let last = reloaded.records().last().unwrap();
    assert_eq!(last.status, RecordStatus::Deferred);
    assert_eq!(reloaded.records().len(), ledger.records().len());
}

#[test]
fn test_append_nothing_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = ledger_file(&dir, "FRONT-01: x");

    let mut ledger = Ledger::load(&path).unwrap();
    let ids = ledger.append("STYLE", Vec::new()).unwrap();
    assert!(ids.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "FRONT-01: x");
}

#[test]
fn test_concurrent_append_is_detected() {
    let dir = TempDir::new().unwrap();
    let path = ledger_file(&dir, "STYLE-01: a = 1\n");

    let mut ledger = Ledger::load(&path).unwrap();

    // Another writer appends under the same prefix
    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "STYLE-02: b = 2").unwrap();

    let result = ledger.append("STYLE", vec![RecordDraft::active("c = 3")]);
    match result {
        Err(LedgerError::SequenceConflict {
            prefix,
            expected,
            found,
        }) => {
            assert_eq!(prefix, "STYLE");
            assert_eq!(expected, 1);
            assert_eq!(found, 2);
        }
        other => panic!("expected sequence conflict, got {:?}", other),
    }
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "STYLE-01: a = 1\nSTYLE-02: b = 2\n"
    );
}

#[test]
fn test_other_prefix_writes_do_not_block_append() {
    let dir = TempDir::new().unwrap();
    let path = ledger_file(&dir, "STYLE-01: a = 1\n");

    let mut ledger = Ledger::load(&path).unwrap();
    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "FRONT-01: Vue").unwrap();

    let ids = ledger
        .append("STYLE", vec![RecordDraft::active("b = 2")])
        .unwrap();
    assert_eq!(ids[0].to_string(), "STYLE-02");
    assert!(ledger.contains_prefix("FRONT"));
}

#[test]
fn test_append_rejects_bad_prefix() {
    let dir = TempDir::new().unwrap();
    let path = ledger_file(&dir, "");

    let mut ledger = Ledger::load(&path).unwrap();
    let result = ledger.append("style", vec![RecordDraft::active("a = 1")]);
    assert!(matches!(result, Err(LedgerError::InvalidPrefix(_))));
}

#[test]
fn test_exhausted_sequence_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = ledger_file(&dir, "STYLE-4294967294: a = 1\n");

    let mut ledger = Ledger::load(&path).unwrap();
    assert_eq!(
        ledger.next_id("STYLE").unwrap().to_string(),
        "STYLE-4294967295"
    );

    let result = ledger.append(
        "STYLE",
        vec![RecordDraft::active("b = 2"), RecordDraft::active("c = 3")],
    );
    assert!(matches!(
        result,
        Err(LedgerError::SequenceExhausted { ref prefix }) if prefix == "STYLE"
    ));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "STYLE-4294967294: a = 1\n"
    );

    ledger
        .append("STYLE", vec![RecordDraft::active("b = 2")])
        .unwrap();
    assert!(matches!(
        ledger.next_id("STYLE"),
        Err(LedgerError::SequenceExhausted { .. })
    ));
}
