//! Command-line interface module for gniphyl.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing (clap)
//! - Registry maintenance (`add`, `rm`, `list`)
//! - Organization orchestration (`run`, `run --dry-run`)
//!
//! Each command loads what it needs, does its work in memory, and writes the
//! registry back at most once.

use crate::config::{ConfigError, ConfigLocation, Settings};
use crate::file_organizer::{FileOrganizer, FileOutcome, OrganizePlan, OrganizeReport};
use crate::output::OutputFormatter;
use crate::registry::PathRegistry;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

const EXAMPLES: &str = "\
Examples:
  gniphyl add /path/to/folder
  gniphyl list
  gniphyl run
  gniphyl run --dry-run";

/// Gniphyl CLI - File organization tool
#[derive(Parser, Debug)]
#[command(name = "gniphyl", version)]
#[command(about = "Gniphyl CLI - File organization tool")]
#[command(
    long_about = "Gniphyl CLI - File organization tool\n\n\
    Register folders once, then sort every file in them into subfolders\n\
    named after the file's category (images, documents, archives, ...)."
)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Directory holding paths.json and settings.toml
    #[arg(long, global = true, value_name = "PATH", env = "GNIPHYL_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The configuration directory from `--config-dir`, or the OS default.
    pub fn config_location(&self) -> Result<ConfigLocation, ConfigError> {
        match &self.config_dir {
            Some(dir) => Ok(ConfigLocation::new(dir)),
            None => ConfigLocation::from_env(),
        }
    }
}

/// Represents a CLI command to execute.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a new path to the configuration
    Add {
        /// Directory to organize on every run
        path: Option<String>,
    },
    /// Remove a path from the configuration
    #[command(alias = "remove")]
    Rm {
        /// Previously added directory, exactly as it was added
        path: Option<String>,
    },
    /// List all configured paths
    List,
    /// Run the organization process on the configured paths
    Run {
        /// Show where files would go without moving anything
        #[arg(long)]
        dry_run: bool,
    },
}

/// Process exit status for an argument parsing error.
///
/// Help and version output are successful exits; anything else, such as an
/// unknown command, exits with 1.
pub fn parse_error_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

/// Outcome of a `run` over all registered paths.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One report per directory that was organized.
    pub reports: Vec<OrganizeReport>,
    /// One plan per directory that was analyzed in dry-run mode.
    pub plans: Vec<OrganizePlan>,
    /// Paths that could not be organized, with the reason.
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    pub fn files_moved(&self) -> usize {
        self.reports.iter().map(OrganizeReport::moved_count).sum()
    }
}

/// Runs a parsed command against the configuration in `location`.
///
/// # Examples
///
/// ```no_run
/// use gniphyl::cli::{run_command, Command};
/// use gniphyl::config::ConfigLocation;
///
/// let location = ConfigLocation::new("/tmp/gniphyl-config");
/// let result = run_command(&Command::Run { dry_run: true }, &location);
/// if let Err(e) = result {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_command(command: &Command, location: &ConfigLocation) -> Result<(), String> {
    match command {
        Command::Add { path } => add_path(location, path.as_deref()).map(|_| ()),
        Command::Rm { path } => remove_path(location, path.as_deref()).map(|_| ()),
        Command::List => list_paths(location).map(|_| ()),
        Command::Run { dry_run } => run_registered(location, *dry_run).map(|_| ()),
    }
}

fn load_registry(location: &ConfigLocation) -> Result<PathRegistry, String> {
    PathRegistry::load(&location.registry_file())
        .map_err(|e| format!("Failed to load config: {}", e))
}

fn save_registry(location: &ConfigLocation, registry: &PathRegistry) -> Result<(), String> {
    registry
        .save(&location.registry_file())
        .map_err(|e| format!("Failed to save config: {}", e))
}

/// Registers a directory. Returns `Ok(false)` if it was already registered.
pub fn add_path(location: &ConfigLocation, path: Option<&str>) -> Result<bool, String> {
    let path = path.ok_or("Please provide a path to add. Usage: gniphyl add <path>")?;

    let mut registry = load_registry(location)?;
    if !registry.add(path) {
        OutputFormatter::warning(&format!("Path {} is already in the configuration.", path));
        return Ok(false);
    }

    save_registry(location, &registry)?;

    if !Path::new(path).is_dir() {
        OutputFormatter::warning(&format!("{} is not an existing directory yet.", path));
    }
    OutputFormatter::success(&format!("Added {}", path));
    Ok(true)
}

/// Deregisters a directory. Returns `Ok(false)` if it was not registered.
pub fn remove_path(location: &ConfigLocation, path: Option<&str>) -> Result<bool, String> {
    let path = path.ok_or("Please provide a path to remove. Usage: gniphyl rm <path>")?;

    let mut registry = load_registry(location)?;
    if registry.remove(path) == 0 {
        OutputFormatter::warning(&format!("Path {} not found in the configuration.", path));
        return Ok(false);
    }

    save_registry(location, &registry)?;
    OutputFormatter::success(&format!("Removed {}", path));
    Ok(true)
}

/// Prints the registered directories and returns them.
pub fn list_paths(location: &ConfigLocation) -> Result<Vec<String>, String> {
    let registry = load_registry(location)?;

    if registry.is_empty() {
        OutputFormatter::info("No paths configured.");
        return Ok(Vec::new());
    }

    let entries: Vec<(String, bool)> = registry
        .list()
        .iter()
        .map(|path| (path.clone(), Path::new(path).is_dir()))
        .collect();
    OutputFormatter::path_list(&entries);

    Ok(registry.list().to_vec())
}

/// Organizes every registered directory, one after another.
///
/// A directory that cannot be organized is reported in
/// [`RunSummary::failures`] and does not stop the others.
///
/// # Errors
///
/// Fails before touching any directory if the registry or settings cannot be
/// loaded, or if nothing is registered.
pub fn run_registered(location: &ConfigLocation, dry_run: bool) -> Result<RunSummary, String> {
    let registry = load_registry(location)?;
    if registry.is_empty() {
        return Err("No paths configured. Please add paths first.".to_string());
    }

    let settings = Settings::load(location).map_err(|e| e.to_string())?;
    let organizer = FileOrganizer::from_settings(&settings).map_err(|e| e.to_string())?;

    if dry_run {
        OutputFormatter::dry_run_notice("Analyzing the following paths:");
    } else {
        OutputFormatter::success("Organizing the following paths:");
    }

    let mut summary = RunSummary::default();
    for path in registry.list() {
        OutputFormatter::plain(&format!(" - {}", path.cyan()));
        let directory = Path::new(path);

        let result = if dry_run {
            organizer.plan(directory).map(|plan| {
                print_plan(&plan);
                summary.plans.push(plan);
            })
        } else {
            organize_with_progress(&organizer, directory).map(|report| {
                summary.reports.push(report);
            })
        };

        if let Err(e) = result {
            OutputFormatter::error(&format!("Failed to organize {}: {}", path, e));
            summary.failures.push((path.clone(), e.to_string()));
        }
    }

    if dry_run {
        OutputFormatter::plain("");
        OutputFormatter::success("Dry run complete. No files were modified.");
    }

    Ok(summary)
}

fn organize_with_progress(
    organizer: &FileOrganizer,
    directory: &Path,
) -> Result<OrganizeReport, crate::file_organizer::OrganizeError> {
    let plan = organizer.plan(directory)?;
    OutputFormatter::success(&format!(
        "Organizing files in directory: {}",
        directory.display().to_string().cyan()
    ));

    let pb = OutputFormatter::create_progress_bar((plan.moves.len() + plan.rejected.len()) as u64);
    let report = organizer.apply(plan, |outcome| {
        match outcome {
            FileOutcome::Moved(moved) => pb.set_message(moved.category.clone()),
            FileOutcome::Skipped(error) => {
                pb.suspend(|| OutputFormatter::warning(&error.to_string()))
            }
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    OutputFormatter::summary_table(&report.category_counts(), report.moved_count());
    OutputFormatter::success(&format!(
        "Gniphyl run completed ({} files organized)",
        report.moved_count()
    ));
    Ok(report)
}

/// One line of dry-run output for a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PlanLine {
    Warning(String),
    Move { file_name: String, category: String },
    NothingToOrganize,
}

/// Unreadable entries come first, in the order `apply` would report them.
fn plan_lines(plan: &OrganizePlan) -> Vec<PlanLine> {
    let mut lines: Vec<PlanLine> = plan
        .rejected
        .iter()
        .map(|error| PlanLine::Warning(error.to_string()))
        .collect();

    if plan.moves.is_empty() {
        lines.push(PlanLine::NothingToOrganize);
    }
    lines.extend(plan.moves.iter().map(|planned| PlanLine::Move {
        file_name: planned.file_name.to_string_lossy().into_owned(),
        category: planned.category.clone(),
    }));
    lines
}

fn print_plan(plan: &OrganizePlan) {
    for line in plan_lines(plan) {
        match line {
            PlanLine::Warning(message) => OutputFormatter::warning(&message),
            PlanLine::Move {
                file_name,
                category,
            } => OutputFormatter::plain(&format!("   {} → {}/", file_name, category)),
            PlanLine::NothingToOrganize => OutputFormatter::info("No files found to organize."),
        }
    }

    if !plan.moves.is_empty() {
        OutputFormatter::summary_table(&plan.category_counts(), plan.moves.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_organizer::FileOperationError;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["gniphyl", "add", "/tmp/dl"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Add {
                path: Some("/tmp/dl".to_string())
            })
        );

        let cli = Cli::try_parse_from(["gniphyl", "remove", "/tmp/dl"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Rm {
                path: Some("/tmp/dl".to_string())
            })
        );

        let cli = Cli::try_parse_from(["gniphyl", "run", "--dry-run"]).unwrap();
        assert_eq!(cli.command, Some(Command::Run { dry_run: true }));

        let cli = Cli::try_parse_from(["gniphyl", "add"]).unwrap();
        assert_eq!(cli.command, Some(Command::Add { path: None }));
    }

    #[test]
    fn test_no_arguments_parses_to_no_command() {
        let cli = Cli::try_parse_from(["gniphyl"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_config_dir_flag() {
        let cli = Cli::try_parse_from(["gniphyl", "list", "--config-dir", "/cfg"]).unwrap();
        assert_eq!(
            cli.config_location().unwrap(),
            ConfigLocation::new("/cfg")
        );
    }

    #[test]
    fn test_unknown_command_exits_with_failure() {
        let err = Cli::try_parse_from(["gniphyl", "frobnicate"]).unwrap_err();
        assert_eq!(parse_error_status(err.kind()), 1);
    }

    #[test]
    fn test_help_exits_with_success() {
        for flag in ["--help", "-h", "help"] {
            let err = Cli::try_parse_from(["gniphyl", flag]).unwrap_err();
            assert_eq!(parse_error_status(err.kind()), 0, "{flag}");
        }
    }

    #[test]
    fn test_missing_path_is_handled_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let location = ConfigLocation::new(temp_dir.path());

        assert!(add_path(&location, None).is_err());
        assert!(remove_path(&location, None).is_err());
        assert!(!location.registry_file().exists());
    }

    #[test]
    fn test_plan_warnings_shown_when_nothing_to_move() {
        let plan = OrganizePlan {
            directory: PathBuf::from("/data/inbox"),
            moves: Vec::new(),
            rejected: vec![FileOperationError::ReadEntryFailed {
                directory: PathBuf::from("/data/inbox"),
                source: std::io::Error::other("stale handle"),
            }],
        };

        assert_eq!(
            plan_lines(&plan),
            [
                PlanLine::Warning("Skipping an entry of /data/inbox: stale handle".to_string()),
                PlanLine::NothingToOrganize,
            ]
        );
    }
}
