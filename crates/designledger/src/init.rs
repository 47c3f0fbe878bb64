//! Interactive initialization for designledger.
//!
//! Writes a `designledger.toml` in the working directory.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Select};
use std::fs;
use std::path::{Path, PathBuf};

use designledger_ledger::validate_prefix;

use crate::config::CONFIG_FILE_NAME;

/// Script names the recorders look for
const TRACKER_SCRIPT: &str = "pipeline_tracker.py";
const CHAIN_SCRIPT: &str = "chain_manager.py";

const INPUT_FILES: &[(&str, &str, bool)] = &[
    ("project-spec.md", "project specification", true),
    ("decisions.md", "decision ledger", true),
    ("constraints.md", "constraints", false),
    ("domain-knowledge.md", "domain knowledge", false),
];

pub fn handle_init(working_dir: &Path) -> Result<()> {
    eprintln!("{}", "Setting up designledger...".bold());
    eprintln!();

    // Step 1: Report which inputs exist
    eprintln!("{}", "Checking inputs...".dimmed());
    for (file, label, required) in INPUT_FILES {
        if working_dir.join(file).exists() {
            eprintln!("  {} {} ({})", "✓".bright_green(), label, file);
        } else if *required {
            eprintln!("  {} {} ({} missing, required)", "✗".bright_red(), label, file);
        } else {
            eprintln!("  {} {} ({} not found)", "✗".dimmed(), label, file);
        }
    }
    eprintln!();

    // Step 2: Prefix and mode
    let prefix: String = Input::new()
        .with_prompt("Decision prefix")
        .default("STYLE".to_string())
        .validate_with(|input: &String| validate_prefix(input).map_err(|e| e.to_string()))
        .interact_text()?;

    let modes = ["full", "quick"];
    let mode = Select::new()
        .with_prompt("Default mode")
        .items(&modes)
        .default(0)
        .interact()?;

    // Step 3: Recorder scripts
    let tracker = find_script(working_dir, TRACKER_SCRIPT);
    let chain = find_script(working_dir, CHAIN_SCRIPT);
    for (name, found) in [(TRACKER_SCRIPT, &tracker), (CHAIN_SCRIPT, &chain)] {
        match found {
            Some(path) => eprintln!("  {} {}", "✓".bright_green(), path.display()),
            None => eprintln!("  {} {} (not found)", "✗".dimmed(), name),
        }
    }

    let config_content = render_config(&prefix, modes[mode], tracker.as_deref(), chain.as_deref());
    let config_path = working_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        eprintln!(
            "{} Config already exists at {}",
            "⚠".bright_yellow(),
            config_path.display()
        );

        let overwrite = Select::new()
            .with_prompt("Overwrite existing config?")
            .items(&["No, keep existing", "Yes, replace it"])
            .default(0)
            .interact()?;

        if overwrite == 0 {
            eprintln!();
            eprintln!("Keeping existing config. Edit it manually if needed:");
            eprintln!("  {}", config_path.display().to_string().dimmed());
            return Ok(());
        }
    }

    fs::write(&config_path, &config_content)?;

    eprintln!();
    eprintln!(
        "{} Config saved to {}",
        "✓".bright_green(),
        config_path.display()
    );

    print_getting_started();
    Ok(())
}

fn find_script(working_dir: &Path, name: &str) -> Option<PathBuf> {
    [PathBuf::from(name), Path::new("scripts").join(name)]
        .into_iter()
        .find(|relative| working_dir.join(relative).exists())
}

fn render_config(prefix: &str, mode: &str, tracker: Option<&Path>, chain: Option<&Path>) -> String {
    let script_line = |key: &str, path: Option<&Path>, fallback: &str| match path {
        Some(p) => format!("{} = \"{}\"", key, p.display()),
        None => format!("# {} = \"{}\"", key, fallback),
    };
    let recorder_header = if tracker.is_some() || chain.is_some() {
        "[recorder]"
    } else {
        "# [recorder]"
    };

    format!(
        r##"prefix = "{prefix}"
mode = "{mode}"
requires = ["FRONT"]
# strict_prerequisites = true
# log_file = "logs/designledger.jsonl"

# [paths]
# project_spec = "project-spec.md"
# ledger = "decisions.md"
# style_guide = "style-guide.md"

{recorder_header}
# interpreter = "python3"
{tracker}
{chain}

# Operator answers override proposals with the same key:
# [answers.color]
# "Primary color" = "#2563EB"
"##,
        tracker = script_line("tracker", tracker, TRACKER_SCRIPT),
        chain = script_line("chain", chain, CHAIN_SCRIPT),
    )
}

/// Print the getting started guide
pub fn print_getting_started() {
    eprintln!();
    eprintln!("{}", "Getting started:".bold());
    eprintln!(
        "  {} Write project-spec.md and make sure decisions.md exists",
        "1.".dimmed()
    );
    eprintln!("  {} Run: {}", "2.".dimmed(), "designledger".bright_cyan());
    eprintln!(
        "  {} Review: {}",
        "3.".dimmed(),
        "designledger ledger list --prefix STYLE".bright_cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;

    #[test]
    fn test_rendered_config_parses() {
        let content = render_config(
            "UI",
            "quick",
            Some(Path::new("scripts/pipeline_tracker.py")),
            None,
        );
        let config: ProjectConfig = toml::from_str(&content).unwrap();
        assert_eq!(config.prefix.as_deref(), Some("UI"));
        let recorder = config.recorder.unwrap();
        assert_eq!(
            recorder.tracker,
            Some(PathBuf::from("scripts/pipeline_tracker.py"))
        );
        assert!(recorder.chain.is_none());
    }

    #[test]
    fn test_rendered_config_without_scripts_parses() {
        let content = render_config("STYLE", "full", None, None);
        let config: ProjectConfig = toml::from_str(&content).unwrap();
        assert!(config.recorder.is_none());
    }

    #[test]
    fn test_find_script_checks_scripts_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("scripts")).unwrap();
        fs::write(dir.path().join("scripts").join(CHAIN_SCRIPT), "").unwrap();
        assert_eq!(
            find_script(dir.path(), CHAIN_SCRIPT),
            Some(Path::new("scripts").join(CHAIN_SCRIPT))
        );
        assert!(find_script(dir.path(), TRACKER_SCRIPT).is_none());
    }
}
