mod config;
mod init;
mod ledger_cmd;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use designledger_audit::{AuditRecorder, NoopRecorder, RecorderConfig, ScriptRecorder};
use designledger_core::{regenerate, render_current, Appender, RunContext, RunOutcome};
use designledger_logging::{default_journal_dir, init_tracing, LogFormat, Logger};
use designledger_style::Mode;

use config::ProjectConfig;
use ledger_cmd::LedgerAction;

#[derive(Parser, Debug)]
#[command(
    name = "designledger",
    about = "Append visual design decisions to a shared ledger and regenerate the style guide",
    version,
    author,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,

    /// Working directory (default: current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the style pass (default)
    Run(RunArgs),

    /// Regenerate the style guide from the ledger without appending
    Render {
        /// Print the guide instead of writing it
        #[arg(long)]
        stdout: bool,

        /// Prefix whose decisions fill the guide
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Inspect the decision ledger
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },

    /// Write a designledger.toml interactively
    Init,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// How much of the checklist to cover
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Prefix for appended records (default: STYLE)
    #[arg(long)]
    prefix: Option<String>,

    /// Fail when an upstream prerequisite has no decisions
    #[arg(long)]
    strict: bool,

    /// Skip the phase tracker and chain recorder
    #[arg(long)]
    no_recorders: bool,

    /// Output final result as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show what would be appended without writing
    #[arg(long)]
    dry_run: bool,

    /// Also append run events to this file as JSONL
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeChoice {
    Full,
    Quick,
}

impl From<ModeChoice> for Mode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Full => Mode::Full,
            ModeChoice::Quick => Mode::Quick,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing("warn", log_format);

    let working_dir = match cli.working_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = ProjectConfig::load(&working_dir)?.unwrap_or_default();

    match cli.command {
        Some(Commands::Run(args)) => run(args, &working_dir, &config, log_format).await,
        Some(Commands::Render { stdout, prefix }) => {
            let paths = config.input_paths(&working_dir);
            let prefix = prefix
                .or_else(|| config.prefix.clone())
                .unwrap_or_else(|| "STYLE".to_string());
            let upstream = config
                .requires
                .clone()
                .unwrap_or_else(|| vec!["FRONT".to_string()]);

            if stdout {
                print!("{}", render_current(&paths, &prefix, &upstream)?);
            } else {
                regenerate(&paths, &prefix, &upstream)?;
                eprintln!(
                    "{} Wrote {}",
                    "✓".bright_green(),
                    paths.style_guide.display()
                );
            }
            Ok(())
        }
        Some(Commands::Ledger { action }) => {
            ledger_cmd::handle_ledger_command(action, &config.input_paths(&working_dir))
        }
        Some(Commands::Init) => init::handle_init(&working_dir),
        None => run(cli.run, &working_dir, &config, log_format).await,
    }
}

async fn run(
    args: RunArgs,
    working_dir: &Path,
    config: &ProjectConfig,
    log_format: LogFormat,
) -> Result<()> {
    let mut ctx = RunContext::new(working_dir.to_path_buf())
        .with_paths(config.input_paths(working_dir))
        .with_answers(config.answers()?)
        .with_strict_prerequisites(args.strict || config.strict_prerequisites)
        .with_dry_run(args.dry_run);

    if let Some(mode) = args.mode.map(Mode::from).or(config.mode()?) {
        ctx = ctx.with_mode(mode);
    }
    if let Some(prefix) = args.prefix.clone().or_else(|| config.prefix.clone()) {
        ctx = ctx.with_prefix(prefix);
    }
    if let Some(ref requires) = config.requires {
        ctx = ctx.with_required_prefixes(requires.clone());
    }
    if let Some(ref phase) = config.phase {
        ctx = ctx.with_phase(phase.clone());
    }
    if let Some(dir) = config.snapshot_dir(working_dir) {
        ctx = ctx.with_snapshot_dir(dir);
    }
    match config.journal_dir.as_ref() {
        Some(dir) => ctx = ctx.with_journal_dir(working_dir.join(dir)),
        None => match default_journal_dir() {
            Ok(dir) => ctx = ctx.with_journal_dir(dir),
            Err(e) => tracing::warn!(error = %e, "Run journal disabled"),
        },
    }

    let recorder = create_recorder(&args, working_dir, config);
    let logger = Arc::new(create_logger(&args, working_dir, config, log_format)?);
    let appender = Appender::new(recorder.as_ref(), logger);

    let outcome = appender.run(ctx).await?;

    if args.json_output {
        let json = serde_json::to_string_pretty(&outcome)?;
        println!("{}", json);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn create_recorder(
    args: &RunArgs,
    working_dir: &Path,
    config: &ProjectConfig,
) -> Box<dyn AuditRecorder> {
    let section = match config.recorder {
        Some(ref section) if !args.no_recorders && !args.dry_run => section,
        _ => return Box::new(NoopRecorder),
    };

    let recorder_config =
        RecorderConfig::new(working_dir.to_path_buf()).with_timeout(section.timeout());
    let mut recorder = ScriptRecorder::new(section.interpreter.clone(), recorder_config);
    if let Some(ref tracker) = section.tracker {
        recorder = recorder.with_tracker(working_dir.join(tracker));
    }
    if let Some(ref chain) = section.chain {
        recorder = recorder.with_chain(working_dir.join(chain));
    }
    Box::new(recorder)
}

fn create_logger(
    args: &RunArgs,
    working_dir: &Path,
    config: &ProjectConfig,
    log_format: LogFormat,
) -> Result<Logger> {
    let log_file = args
        .log_file
        .clone()
        .or_else(|| config.log_file(working_dir));
    match log_file {
        Some(path) => Logger::with_file(log_format, &path)
            .with_context(|| format!("Failed to open log file {}", path.display())),
        None => Ok(Logger::new(log_format)),
    }
}

fn print_outcome(outcome: &RunOutcome) {
    eprintln!();
    if outcome.dry_run {
        eprintln!("=== DRY RUN ===");
        eprintln!("Would append: {}", join_ids(outcome));
    } else if outcome.is_clean() {
        eprintln!("=== SUCCESS ===");
        eprintln!("Appended: {}", join_ids(outcome));
    } else {
        eprintln!("=== DONE WITH WARNINGS ===");
        eprintln!("Appended: {}", join_ids(outcome));
    }
    eprintln!("Mode: {}", outcome.mode);
    if outcome.unchanged > 0 {
        eprintln!("Already in force: {}", outcome.unchanged);
    }
    if !outcome.deferred.is_empty() {
        let areas: Vec<&str> = outcome.deferred.iter().map(|a| a.title()).collect();
        eprintln!("Deferred: {}", areas.join(", "));
    }
    for conflict in &outcome.conflicts {
        eprintln!("Conflict: {}", conflict.detail());
    }
    for conflict in &outcome.open_conflicts {
        eprintln!("Still open: {}", conflict.detail());
    }
    for warning in &outcome.warnings {
        eprintln!("Warning: {}", warning);
    }
    for failure in &outcome.recorder_failures {
        eprintln!("Recorder {} failed: {}", failure.call, failure.error);
    }
    if !outcome.dry_run {
        eprintln!("Style guide: {}", outcome.style_guide_path.display());
    }
    eprintln!("Duration: {:.1}s", outcome.total_duration_secs);
}

fn join_ids(outcome: &RunOutcome) -> String {
    if outcome.appended.is_empty() {
        return "nothing new".to_string();
    }
    outcome
        .appended
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
