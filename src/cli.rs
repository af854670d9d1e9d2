//! Command-line interface module for clean-folder.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Loading the filter configuration
//! - Running the clean-up or the dry run
//! - Reporting the result

use crate::config::FilterConfig;
use crate::output::OutputFormatter;
use crate::pipeline::{self, CleanError};
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sort a directory into category folders.
#[derive(Debug, Clone, Parser)]
#[command(name = "clean-folder", version, about)]
pub struct CliArgs {
    /// The directory to clean up.
    pub root: PathBuf,

    /// Show what would be moved without touching anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a TOML file with exclusion rules.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    /// Maximum tracing level selected by the `-v` flags.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Runs the CLI application with parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use clean_folder::cli::{run_cli, CliArgs};
///
/// let args = CliArgs::parse_from(["clean-folder", "/path/to/directory"]);
/// if let Err(e) = run_cli(&args) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(args: &CliArgs) -> anyhow::Result<()> {
    write_startup_line(args, &mut io::stdout(), &mut io::stderr())?;

    if args.dry_run {
        clean_directory_dry_run(&args.root, args.config.as_deref())
    } else {
        clean_directory(&args.root, args.config.as_deref(), args.json)
    }
}

/// Announces the root. With `--json` the line goes to `err` so that `out`
/// carries nothing but the report.
fn write_startup_line(args: &CliArgs, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
    let line = format!("Start in \"{}\"", args.root.display());
    if args.json {
        writeln!(err, "{}", line)
    } else {
        writeln!(out, "{}", line)
    }
}

/// Sorts `base_path` and prints the summary.
///
/// Fails when the run could not start, or when at least one file could not
/// be moved.
pub fn clean_directory(base_path: &Path, config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let filters = FilterConfig::load(config_path)
        .and_then(FilterConfig::compile)
        .map_err(CleanError::from)?;

    let progress = (!json).then(OutputFormatter::create_progress_bar);
    let report = pipeline::run(base_path, &filters, progress.as_ref())?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        OutputFormatter::summary_table(&report);
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} of the files could not be organized",
            report.failures.len()
        );
    }
    if !json {
        OutputFormatter::success("Done.");
    }
    Ok(())
}

/// Scans `base_path` and prints what a real run would do.
pub fn clean_directory_dry_run(base_path: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    let filters = FilterConfig::load(config_path)
        .and_then(FilterConfig::compile)
        .map_err(CleanError::from)?;

    let (session, moves) = pipeline::plan(base_path, &filters)?;
    if moves.is_empty() {
        OutputFormatter::info("No files found to organize.");
        return Ok(());
    }

    OutputFormatter::dry_run_plan(&moves);
    OutputFormatter::header("DRY RUN SUMMARY");
    println!("Total files: {}", moves.len());
    println!("Folders scanned: {}", session.folders.len());
    if !session.unknown_extensions.is_empty() {
        let unknown: Vec<&str> = session.unknown_extensions.iter().map(String::as_str).collect();
        OutputFormatter::warning(&format!("Unknown extensions: {}", unknown.join(", ")));
    }
    OutputFormatter::success("Dry run complete. No files were modified.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positional_root_only() {
        let args = CliArgs::parse_from(["clean-folder", "/tmp/mess"]);
        assert_eq!(args.root, PathBuf::from("/tmp/mess"));
        assert!(!args.dry_run);
        assert!(!args.json);
        assert_eq!(args.config, None);
        assert_eq!(args.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "clean-folder",
            "mess",
            "--dry-run",
            "--config",
            "rules.toml",
            "-vv",
        ]);
        assert!(args.dry_run);
        assert_eq!(args.config, Some(PathBuf::from("rules.toml")));
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_startup_line_goes_to_stdout() {
        let args = CliArgs::parse_from(["clean-folder", "mess"]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        write_startup_line(&args, &mut out, &mut err).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Start in \"mess\"\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_startup_line_keeps_json_stdout_clean() {
        let args = CliArgs::parse_from(["clean-folder", "mess", "--json"]);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        write_startup_line(&args, &mut out, &mut err).unwrap();

        assert!(out.is_empty());
        assert_eq!(String::from_utf8(err).unwrap(), "Start in \"mess\"\n");
    }

    #[test]
    fn test_root_is_required() {
        assert!(CliArgs::try_parse_from(["clean-folder"]).is_err());
    }
}
