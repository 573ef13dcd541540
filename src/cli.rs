//! Command-line interface module for tidy.
//!
//! This module handles all CLI-related functionality including:
//! - Command parsing (`cup`, `undo`, `ls`, `help`)
//! - Cleanup orchestration, with progress and summary output
//! - Undo reporting
//! - Launching the interactive listing

use crate::config::{ConfigError, TidyConfig};
use crate::explorer;
use crate::file_category::ExtensionFilter;
use crate::file_organizer::{CleanupOptions, CleanupReport, FileOrganizer, OrganizeError};
use crate::output::{OutputFormatter, plural};
use crate::undo::{UndoManager, UndoOutcome};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sort the files of the current directory into folders by extension.
#[derive(Debug, Parser)]
#[command(
    name = "tidy",
    version,
    arg_required_else_help = true,
    after_help = "Example:\n    tidy cup --ext \"pdf docx\""
)]
pub struct Cli {
    /// Use this configuration file instead of the default lookup
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Clean up: organize files into folders by type
    Cup {
        /// Move ONLY these extensions, e.g. "png jpg"
        #[arg(long, value_name = "EXTS")]
        ext: Option<String>,
        /// Move everything EXCEPT these extensions, e.g. "mp4 exe"
        #[arg(long, value_name = "EXTS")]
        skip: Option<String>,
        /// Show what would be moved without changing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Revert the last cleanup operation
    Undo,
    /// Pretty-print directory contents with an interactive UI
    Ls,
}

impl Commands {
    /// Builds the extension filter for a `cup` command.
    pub fn extension_filter(&self) -> Option<ExtensionFilter> {
        match self {
            Self::Cup { ext, skip, .. } => Some(ExtensionFilter::parse(
                ext.as_deref().unwrap_or_default(),
                skip.as_deref().unwrap_or_default(),
            )),
            _ => None,
        }
    }
}

/// Top-level error for a CLI invocation.
#[derive(Debug, Error)]
pub enum TidyError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Organize(#[from] OrganizeError),
    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// Runs `command` against `dir_path` with the default configuration lookup.
pub fn run_cli(command: &Commands, dir_path: &Path) -> Result<(), TidyError> {
    run_cli_with_config(command, dir_path, None, &OutputFormatter::default())
}

/// Runs `command` against `dir_path`.
///
/// # Arguments
///
/// * `command` - The command to execute
/// * `dir_path` - The directory to operate on
/// * `config_path` - Optional path to a configuration file
/// * `output` - Formatter used for everything printed to the user
///
/// # Examples
///
/// ```no_run
/// use tidy::cli::{Commands, run_cli_with_config};
/// use tidy::output::OutputFormatter;
/// use std::path::Path;
///
/// let command = Commands::Cup { ext: Some("pdf".into()), skip: None, dry_run: true };
/// if let Err(e) = run_cli_with_config(&command, Path::new("."), None, &OutputFormatter::default()) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli_with_config(
    command: &Commands,
    dir_path: &Path,
    config_path: Option<&Path>,
    output: &OutputFormatter,
) -> Result<(), TidyError> {
    match command {
        Commands::Cup { dry_run, .. } => {
            let config = TidyConfig::load(config_path, dir_path)?;
            let filter = command.extension_filter().unwrap_or_default();
            let options = CleanupOptions::from_config(&config, filter, dir_path)?;
            if *dry_run {
                preview_cleanup(dir_path, &options, output)
            } else {
                cleanup_directory(dir_path, &options, output).map(|_| ())
            }
        }
        Commands::Undo => {
            let config = TidyConfig::load(config_path, dir_path)?;
            undo_cleanup(dir_path, &config.history.file_name, output).map(|_| ())
        }
        Commands::Ls => Ok(explorer::run(dir_path, output.theme())?),
    }
}

/// Moves the files of `base_path` into their buckets and prints the result.
pub fn cleanup_directory(
    base_path: &Path,
    options: &CleanupOptions,
    output: &OutputFormatter,
) -> Result<CleanupReport, TidyError> {
    let plan = FileOrganizer::plan(base_path, options)?;

    let pb = output.create_progress_bar(plan.len() as u64);
    let result = FileOrganizer::execute(base_path, options, &plan, |planned| {
        pb.set_message(planned.file_name.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();
    let report = result?;

    output.success(
        "✔",
        &format!(
            "Tidied up {} {}.",
            report.moved_count(),
            plural(report.moved_count())
        ),
    );
    if !report.failed.is_empty() {
        output.warning(&format!(
            "{} {} could not be moved.",
            report.failed.len(),
            plural(report.failed.len())
        ));
    }
    if report.moved_count() > 0 {
        output.summary_table(&report.by_bucket, report.moved_count());
        output.info("Run `tidy undo` to put everything back.");
    }

    Ok(report)
}

/// Prints what a cleanup would do without moving anything.
pub fn preview_cleanup(
    base_path: &Path,
    options: &CleanupOptions,
    output: &OutputFormatter,
) -> Result<(), TidyError> {
    let plan = FileOrganizer::plan(base_path, options)?;
    if plan.is_empty() {
        output.dry_run_notice("No files to tidy.");
        return Ok(());
    }

    output.dry_run_notice("Files would be organized as follows:");
    let mut bucket_counts: BTreeMap<String, usize> = BTreeMap::new();
    for planned in &plan {
        output.plain(&format!(
            " - {} → {}",
            planned.file_name,
            planned.destination().display()
        ));
        *bucket_counts.entry(planned.bucket.clone()).or_insert(0) += 1;
    }

    output.summary_table(&bucket_counts, plan.len());
    output.dry_run_notice("No files were moved.");
    Ok(())
}

/// Reverts the last cleanup of `base_path` and prints the result.
pub fn undo_cleanup(
    base_path: &Path,
    history_file: &str,
    output: &OutputFormatter,
) -> Result<UndoOutcome, TidyError> {
    let outcome = UndoManager::undo(base_path, history_file)?;

    match &outcome {
        UndoOutcome::NothingToUndo => output.warning("No history found! Nothing to undo."),
        UndoOutcome::Completed(report) => output.success(
            "↺",
            &format!(
                "Undo complete! Restored {} {}.",
                report.restored_files,
                plural(report.restored_files)
            ),
        ),
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tidy").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cup_with_filters() {
        let cli = parse(&["cup", "--ext", "png jpg", "--skip", "mp4"]).expect("parse failed");
        assert_eq!(
            cli.command,
            Commands::Cup {
                ext: Some("png jpg".to_string()),
                skip: Some("mp4".to_string()),
                dry_run: false,
            }
        );

        let filter = cli.command.extension_filter().expect("cup has a filter");
        assert!(filter.allows("png"));
        assert!(filter.allows("jpg"));
        assert!(!filter.allows("mp4"));
        assert!(!filter.allows("txt"));
    }

    #[test]
    fn test_parse_plain_commands() {
        assert_eq!(parse(&["undo"]).expect("parse failed").command, Commands::Undo);
        assert_eq!(parse(&["ls"]).expect("parse failed").command, Commands::Ls);
        assert_eq!(Commands::Undo.extension_filter(), None);
    }

    #[test]
    fn test_parse_global_config() {
        let cli = parse(&["undo", "--config", "my.toml"]).expect("parse failed");
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
    }

    #[test]
    fn test_help_variants() {
        let cases: [&[&str]; 4] = [&["help"], &["--help"], &["-h"], &[]];
        for args in cases {
            let err = parse(args).expect_err("help should not parse into a command");
            assert!(matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ));
        }
    }

    #[test]
    fn test_undo_without_history_is_ok() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        assert!(run_cli(&Commands::Undo, temp_dir.path()).is_ok());
    }

    #[test]
    fn test_undo_cleanup_reports_restored_files() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        std::fs::write(base_path.join("a.txt"), "a").expect("Failed to write");
        let output = OutputFormatter::default();

        let report = cleanup_directory(base_path, &CleanupOptions::default(), &output)
            .expect("cleanup failed");
        assert_eq!(report.moved_count(), 1);

        let outcome = undo_cleanup(base_path, ".tidy_history", &output).expect("undo failed");
        assert_eq!(outcome.restored_files(), 1);
    }

    #[test]
    fn test_unknown_command_is_error() {
        assert!(parse(&["sweep"]).is_err());
        assert!(parse(&["undo", "--ext", "png"]).is_err());
    }
}
