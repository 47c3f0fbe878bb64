//! Style guide rendering.
//!
//! The guide is a pure function of a ledger snapshot: no clock, no file
//! system. Rendering the same records twice yields the same bytes.

use std::collections::HashMap;
use std::fmt::Write;

use designledger_ledger::{Assertion, DecisionId, DecisionRecord, RecordStatus};

use crate::{Section, TopicArea};

const BASELINE_RULES: &[&str] = &[
    "Use only the tokens in this guide; components never introduce their own colours, sizes or durations.",
    "Pair every colour with its listed contrast note; text below the minimum contrast is a bug.",
    "Superseded decisions stay in the ledger; the latest record for a key is the one in force.",
];

/// What the guide is rendered from
#[derive(Debug, Clone, Copy)]
pub struct GuideSnapshot<'a> {
    pub title: &'a str,
    /// Ledger file name shown in the header
    pub ledger_name: &'a str,
    /// Prefix whose assertions fill the sections
    pub prefix: &'a str,
    /// Upstream prefixes listed under "Built on"
    pub upstream_prefixes: &'a [String],
    pub records: &'a [DecisionRecord],
}

struct Entry {
    id: DecisionId,
    assertion: Assertion,
    section: Section,
}

struct Deferral {
    id: DecisionId,
    reason: String,
    position: usize,
}

/// Title for the guide: the first markdown heading of the project spec,
/// else its first non-empty line.
pub fn project_title(project_spec: &str) -> String {
    const MAX_CHARS: usize = 80;

    let heading = project_spec
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("# "))
        .map(str::trim);
    let first_line = || project_spec.lines().map(str::trim).find(|l| !l.is_empty());

    match heading.or_else(first_line) {
        Some(title) if title.chars().count() > MAX_CHARS => {
            let cut: String = title.chars().take(MAX_CHARS - 3).collect();
            format!("{}...", cut.trim_end())
        }
        Some(title) => title.to_string(),
        None => "Untitled project".to_string(),
    }
}

pub fn render_style_guide(snapshot: &GuideSnapshot<'_>) -> String {
    let own: Vec<(usize, &DecisionRecord)> = snapshot
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.id.prefix() == snapshot.prefix)
        .collect();

    // Latest record per key, kept at the position of the key's first use
    let mut entries: Vec<Entry> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut last_active_in: HashMap<Section, usize> = HashMap::new();
    let mut deferrals: HashMap<TopicArea, Deferral> = HashMap::new();
    let mut conflicts: Vec<&DecisionRecord> = Vec::new();

    for (position, record) in &own {
        match record.status {
            RecordStatus::Active => {
                let Some(assertion) = record.assertion() else {
                    continue;
                };
                let section = Section::route(&assertion.key);
                last_active_in.insert(section, *position);

                let entry = Entry {
                    id: record.id.clone(),
                    assertion,
                    section,
                };
                match by_key.get(&entry.assertion.normalized_key()) {
                    Some(&index) => entries[index] = entry,
                    None => {
                        by_key.insert(entry.assertion.normalized_key(), entries.len());
                        entries.push(entry);
                    }
                }
            }
            RecordStatus::Deferred => {
                if let Some(area) = TopicArea::from_deferral(&record.statement) {
                    let reason = record
                        .statement
                        .split_once(':')
                        .map(|(_, r)| r.trim().to_string())
                        .unwrap_or_default();
                    deferrals.insert(
                        area,
                        Deferral {
                            id: record.id.clone(),
                            reason,
                            position: *position,
                        },
                    );
                }
            }
            RecordStatus::Conflict => conflicts.push(*record),
        }
    }

    // A deferral stops applying once its section gets a later decision
    let in_force: Vec<(TopicArea, &Deferral)> = TopicArea::ALL
        .into_iter()
        .filter_map(|area| deferrals.get(&area).map(|d| (area, d)))
        .filter(|(area, d)| {
            last_active_in
                .get(&area.section())
                .map_or(true, |&pos| pos < d.position)
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "# Style Guide: {}", snapshot.title);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "> Generated from `{}` ({} decisions). Edit the ledger, not this file; it is rewritten on every run.",
        snapshot.ledger_name, snapshot.prefix
    );

    let upstream: Vec<&DecisionRecord> = snapshot
        .records
        .iter()
        .filter(|r| r.is_active())
        .filter(|r| snapshot.upstream_prefixes.iter().any(|p| p == r.id.prefix()))
        .collect();
    if !upstream.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Built on:");
        let _ = writeln!(out);
        for record in upstream {
            let _ = writeln!(out, "- {}: {}", record.id, record.statement);
        }
    }

    for section in Section::ALL {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {}", section.heading());
        let _ = writeln!(out);

        let rows: Vec<&Entry> = entries.iter().filter(|e| e.section == section).collect();
        if !rows.is_empty() {
            write_table(&mut out, &rows);
        }

        if section == Section::Rules {
            write_rules(&mut out, !rows.is_empty(), &in_force, &conflicts);
            continue;
        }

        let deferral = section
            .area()
            .and_then(|area| in_force.iter().find(|(a, _)| *a == area));
        match (rows.is_empty(), deferral) {
            (_, Some((area, d))) => {
                if !rows.is_empty() {
                    let _ = writeln!(out);
                }
                let _ = writeln!(out, "_Deferred ({}): {} {}._", d.id, area.title(), d.reason);
            }
            (true, None) => {
                let _ = writeln!(out, "_No decisions recorded yet._");
            }
            (false, None) => {}
        }
    }

    out
}

fn write_table(out: &mut String, rows: &[&Entry]) {
    let _ = writeln!(out, "| Token | Value | Notes | Decision |");
    let _ = writeln!(out, "| --- | --- | --- | --- |");
    for entry in rows {
        let _ = writeln!(
            out,
            "| {} | `{}` | {} | {} |",
            escape_cell(&entry.assertion.key),
            entry.assertion.value.replace('`', "'"),
            escape_cell(entry.assertion.note.as_deref().unwrap_or("")),
            entry.id
        );
    }
}

fn write_rules(
    out: &mut String,
    after_table: bool,
    deferrals: &[(TopicArea, &Deferral)],
    conflicts: &[&DecisionRecord],
) {
    if after_table {
        let _ = writeln!(out);
    }
    for (i, rule) in BASELINE_RULES.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, rule);
    }

    if !deferrals.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Deferred areas:");
        let _ = writeln!(out);
        for (area, d) in deferrals {
            let _ = writeln!(out, "- {} ({}): {}", area.title(), d.id, d.reason);
        }
    }

    if !conflicts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recorded conflicts (upstream decision stands until resolved):");
        let _ = writeln!(out);
        for record in conflicts {
            let _ = writeln!(out, "- {}: {}", record.id, record.statement);
        }
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use designledger_ledger::parse_ledger;

    fn render(ledger: &str) -> String {
        let records = parse_ledger(ledger).records;
        let upstream = vec!["FRONT".to_string()];
        render_style_guide(&GuideSnapshot {
            title: "Shop",
            ledger_name: "decisions.md",
            prefix: "STYLE",
            upstream_prefixes: &upstream,
            records: &records,
        })
    }

    #[test]
    fn test_project_title() {
        assert_eq!(project_title("intro\n# Acme Store\nbody"), "Acme Store");
        assert_eq!(
            project_title("\n\ne-commerce app, blue brand\n"),
            "e-commerce app, blue brand"
        );
        assert_eq!(project_title(""), "Untitled project");
        let long = "x".repeat(120);
        assert_eq!(project_title(&long).chars().count(), 80);
    }

    #[test]
    fn test_all_sections_in_order() {
        let guide = render("FRONT-01: React + Tailwind\n");
        let positions: Vec<usize> = Section::ALL
            .iter()
            .map(|s| guide.find(&format!("\n## {}\n", s.heading())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(guide.contains("- FRONT-01: React + Tailwind"));
        assert!(guide.contains("_No decisions recorded yet._"));
    }

    #[test]
    fn test_latest_record_per_key_wins() {
        let guide = render(
            "STYLE-01: Primary color = #2563EB — 5.17:1 on white\n\
             STYLE-02: Spacing unit = 4px\n\
             STYLE-03: Primary color = #1D4ED8 — 6.70:1 on white\n",
        );
        assert!(guide.contains("| Primary color | `#1D4ED8` | 6.70:1 on white | STYLE-03 |"));
        assert!(!guide.contains("#2563EB"));
    }

    #[test]
    fn test_deferral_shown_until_superseded() {
        let ledger = "STYLE-01: DEFERRED — Icons: not covered in quick mode\n";
        let guide = render(ledger);
        assert!(guide.contains("_Deferred (STYLE-01): Icons not covered in quick mode._"));
        assert!(guide.contains("- Icons (STYLE-01): not covered in quick mode"));

        let ledger = format!("{}STYLE-02: Icon library = lucide-react\n", ledger);
        let guide = render(&ledger);
        assert!(!guide.contains("Deferred"));
        assert!(guide.contains("| Icon library | `lucide-react` |  | STYLE-02 |"));
    }

    #[test]
    fn test_conflicts_listed_in_rules() {
        let guide = render(
            "FRONT-02: component library = shadcn/ui\n\
             STYLE-01: CONFLICT — Component library = MUI contradicts FRONT-02 (Component library = shadcn/ui)\n",
        );
        let rules = &guide[guide.find("## Rules").unwrap()..];
        assert!(rules.contains("Recorded conflicts"));
        assert!(rules.contains("- STYLE-01: Component library = MUI contradicts FRONT-02"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let ledger = "FRONT-01: React\nSTYLE-01: Text color = #111827\nSTYLE-02: Shadow (sm) = 0 1px 2px rgba(0, 0, 0, 0.05)\n";
        assert_eq!(render(ledger), render(ledger));
    }

    #[test]
    fn test_pipes_escaped_in_cells() {
        let guide = render("STYLE-01: Card padding = 24px — mobile | desktop\n");
        assert!(guide.contains("mobile \\| desktop"));
    }
}
