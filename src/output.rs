//! Output formatting and styling module.
//!
//! Everything the user sees on the terminal goes through here: status lines,
//! the relocation progress bar and the end-of-run summary.

use crate::file_category::Category;
use crate::pipeline::{PlannedMove, RunReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

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

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for the relocation phase.
    ///
    /// The length is set once the scan knows how many files there are.
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints the per-category table and the archive, pruning and failure totals.
    pub fn summary_table(report: &RunReport) {
        Self::header("SUMMARY");

        let width = Category::ALL
            .iter()
            .map(|c| c.dir_name().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in &report.moved {
            println!(
                "{:<width$} | {} {}",
                category.dir_name(),
                count.to_string().green(),
                plural(*count, "file"),
                width = width
            );
        }
        if !report.archives.is_empty() {
            println!(
                "{:<width$} | {} extracted, {} kept",
                Category::Archive.dir_name(),
                report.extracted_archives().to_string().green(),
                report.corrupt_archives().to_string().yellow(),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            report.total_moved().to_string().green().bold(),
            plural(report.total_moved(), "file"),
            width = width
        );

        if report.pruned_dirs > 0 {
            Self::info(&format!(
                "Removed {} empty {}",
                report.pruned_dirs,
                plural(report.pruned_dirs, "folder")
            ));
        }
        if report.excluded_files > 0 {
            Self::info(&format!(
                "Left {} excluded {} in place",
                report.excluded_files,
                plural(report.excluded_files, "file")
            ));
        }
        if !report.unknown_extensions.is_empty() {
            let unknown: Vec<&str> = report.unknown_extensions.iter().map(String::as_str).collect();
            Self::warning(&format!("Unknown extensions: {}", unknown.join(", ")));
        }
        for failure in &report.failures {
            Self::error(&format!("{}: {}", failure.path.display(), failure.reason));
        }
    }

    /// Prints the moves a dry run found.
    pub fn dry_run_plan(moves: &[PlannedMove]) {
        for planned in moves {
            println!(
                "{} {} → {}",
                "[DRY RUN]".yellow(),
                planned.from.display(),
                planned.to.display()
            );
        }
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
