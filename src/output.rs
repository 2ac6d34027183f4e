//! Console output.
//!
//! Every line a user sees comes through [`OutputFormatter`], so the wording
//! of move announcements stays identical across one-shot and watch mode.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::file_organizer::MoveOutcome;
use crate::pipeline::FileReport;

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Formats the announcement line for a finished pipeline run.
    ///
    /// ```
    /// use foldersort::file_category::Category;
    /// use foldersort::file_organizer::MoveOutcome;
    /// use foldersort::output::OutputFormatter;
    /// use std::path::PathBuf;
    ///
    /// let outcome = MoveOutcome {
    ///     source: PathBuf::from("in/a.txt"),
    ///     destination: PathBuf::from("out/docs/a.txt"),
    ///     category: Category::Docs,
    ///     dry_run: true,
    /// };
    /// assert_eq!(OutputFormatter::move_line(&outcome), "[dry-run] in/a.txt → out/docs/a.txt");
    /// ```
    pub fn move_line(outcome: &MoveOutcome) -> String {
        let prefix = if outcome.dry_run { "[dry-run]" } else { "Moved:" };
        format!(
            "{} {} → {}",
            prefix,
            outcome.source.display(),
            outcome.destination.display()
        )
    }

    /// Prints a completed (or simulated) move.
    pub fn moved(outcome: &MoveOutcome) {
        let line = Self::move_line(outcome);
        if outcome.dry_run {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }

    /// Prints the result of one pipeline run. Failures are already logged
    /// by the engines, so only successes produce a console line.
    pub fn report(report: &FileReport) {
        if let Ok(outcome) = report {
            Self::moved(outcome);
        }
    }

    /// Announces that a watch session is running.
    pub fn watching(dir: &Path) {
        println!("Watching: {}", dir.display());
    }

    /// Creates a spinner for a one-shot run. Hidden when stderr is not a terminal.
    pub fn create_spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {pos} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    /// Prints a summary table with file counts by category.
    pub fn summary_table(category_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let max_category_len = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &categories {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(**count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = max_category_len
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
