//! Output formatting and styling module.
//!
//! Every message the CLI prints goes through [`OutputFormatter`], so the
//! color scheme and symbols live in one place.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

const RULE_WIDTH: usize = 50;

/// Manages all CLI output with consistent styling and formatting.
///
/// - Success messages (green with ✓)
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use gniphyl::output::OutputFormatter;
    /// OutputFormatter::success("Added /home/user/Downloads");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗ Error:".red().bold(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠ Warning:".yellow().bold(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.magenta().bold());
    }

    /// Creates a progress bar for moving `total` files.
    ///
    /// The bar draws to stderr and stays hidden when stderr is not a terminal.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        let pb = ProgressBar::new(total);
        pb.set_style(style);
        pb
    }

    /// Prints registered directories as a numbered list, starting at 1.
    ///
    /// Entries flagged as missing are marked so stale registrations stand out.
    pub fn path_list(paths: &[(String, bool)]) {
        Self::header("Configured Paths:");
        println!("{}", "-".repeat(RULE_WIDTH));
        for (index, (path, exists)) in paths.iter().enumerate() {
            let number = format!("{}.", index + 1);
            if *exists {
                println!("{} {}", number.cyan(), path);
            } else {
                println!("{} {} {}", number.cyan(), path, "(missing)".yellow());
            }
        }
        println!("{}", "-".repeat(RULE_WIDTH));
    }

    /// Prints a summary table with file counts by category.
    ///
    /// ```no_run
    /// use gniphyl::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("documents".to_string(), 15);
    /// counts.insert("images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        if category_counts.is_empty() {
            return;
        }

        let width = category_counts
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max("Category".len());

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
