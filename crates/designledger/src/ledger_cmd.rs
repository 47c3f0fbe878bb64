use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use designledger_core::InputPaths;
use designledger_ledger::{DecisionRecord, Ledger, RecordStatus};

#[derive(Subcommand, Debug)]
pub enum LedgerAction {
    /// List decision records in ledger order
    List {
        /// Only records with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the id the next record under a prefix would get
    Next {
        #[arg(long)]
        prefix: String,
    },
}

pub fn handle_ledger_command(action: LedgerAction, paths: &InputPaths) -> Result<()> {
    let ledger = Ledger::load(&paths.ledger)
        .with_context(|| format!("Failed to load {}", paths.ledger.display()))?;

    match action {
        LedgerAction::List { prefix, json } => {
            let records: Vec<&DecisionRecord> = match prefix {
                Some(ref p) => ledger.with_prefix(p).collect(),
                None => ledger.records().iter().collect(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("{}", "No decision records found.".dimmed());
            } else {
                print_records(&records);
                for id in ledger.duplicates() {
                    eprintln!("{} Duplicate id {}", "⚠".bright_yellow(), id);
                }
            }
        }
        LedgerAction::Next { prefix } => {
            let id = ledger.next_id(&prefix)?;
            println!("{}", id);
        }
    }

    Ok(())
}

fn print_records(records: &[&DecisionRecord]) {
    let width = records
        .iter()
        .map(|r| r.id.to_string().len())
        .max()
        .unwrap_or(8);

    for record in records {
        let id = format!("{:<width$}", record.id.to_string(), width = width);
        let line = match record.status {
            RecordStatus::Active => record.statement.normal(),
            RecordStatus::Deferred => format!("deferred: {}", record.statement).dimmed(),
            RecordStatus::Conflict => format!("conflict: {}", record.statement).bright_yellow(),
        };
        println!("{}  {}", id.bold(), line);
        if let Some(ref rationale) = record.rationale {
            println!("{}  {}", " ".repeat(width), rationale.dimmed());
        }
    }
}
