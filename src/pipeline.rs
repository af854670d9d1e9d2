//! The full clean-up run: scan, relocate, expand archives, prune.
//!
//! Each run builds its own [`ScanSession`] and drains it exactly once, in
//! category order with archives last. A file that fails to move is recorded
//! in the [`RunReport`] and the run carries on with the next one.

use crate::archive::{ArchiveExpander, ArchiveOutcome, Unpacker, target_folder};
use crate::config::{CompiledFilters, ConfigError};
use crate::file_category::Category;
use crate::file_organizer::FileOrganizer;
use crate::pruner::prune_empty_dirs;
use crate::scanner::{ScanError, ScanSession, Scanner};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("{} is not a directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A file that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedItem {
    pub path: PathBuf,
    pub reason: String,
}

/// A move that a dry run would perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub from: PathBuf,
    pub to: PathBuf,
    pub category: Category,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Files moved per category, archives excluded.
    pub moved: BTreeMap<Category, usize>,
    pub archives: Vec<ArchiveOutcome>,
    pub pruned_dirs: usize,
    pub excluded_files: usize,
    pub extensions: BTreeSet<String>,
    pub unknown_extensions: BTreeSet<String>,
    pub failures: Vec<FailedItem>,
}

impl RunReport {
    fn new(root: &Path) -> Self {
        let now = Utc::now();
        Self {
            root: root.to_path_buf(),
            started_at: now,
            finished_at: now,
            moved: BTreeMap::new(),
            archives: Vec::new(),
            pruned_dirs: 0,
            excluded_files: 0,
            extensions: BTreeSet::new(),
            unknown_extensions: BTreeSet::new(),
            failures: Vec::new(),
        }
    }

    /// Number of files moved into category folders, archives excluded.
    pub fn total_moved(&self) -> usize {
        self.moved.values().sum()
    }

    pub fn extracted_archives(&self) -> usize {
        self.archives
            .iter()
            .filter(|a| matches!(a, ArchiveOutcome::Extracted { .. }))
            .count()
    }

    pub fn corrupt_archives(&self) -> usize {
        self.archives
            .iter()
            .filter(|a| matches!(a, ArchiveOutcome::KeptCorrupt { .. }))
            .count()
    }

    /// True when no file failed to move.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, path: &Path, reason: impl ToString) {
        let reason = reason.to_string();
        tracing::error!(path = %path.display(), "{}", reason);
        self.failures.push(FailedItem {
            path: path.to_path_buf(),
            reason,
        });
    }
}

fn check_root(root: &Path) -> Result<(), CleanError> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(CleanError::InvalidRoot(root.to_path_buf()))
    }
}

/// Sorts the tree under `root` using the ZIP unpacker.
///
/// # Errors
///
/// Fails if `root` is not a readable directory. Per-file problems are
/// collected in the returned report instead.
pub fn run(
    root: &Path,
    filters: &CompiledFilters,
    progress: Option<&ProgressBar>,
) -> Result<RunReport, CleanError> {
    run_with(root, filters, &ArchiveExpander::new(), progress)
}

/// Same as [`run`], with a caller-supplied archive expander.
pub fn run_with<U: Unpacker>(
    root: &Path,
    filters: &CompiledFilters,
    expander: &ArchiveExpander<U>,
    progress: Option<&ProgressBar>,
) -> Result<RunReport, CleanError> {
    check_root(root)?;
    let mut report = RunReport::new(root);

    let mut session = Scanner::new(filters).scan(root)?;
    report.excluded_files = session.excluded.len();
    report.extensions = std::mem::take(&mut session.extensions);
    report.unknown_extensions = std::mem::take(&mut session.unknown_extensions);

    if let Some(pb) = progress {
        pb.set_length(session.total_files() as u64);
    }

    for category in Category::ALL {
        let bucket = session.take_bucket(category);
        if category == Category::Archive {
            tracing::info!(count = bucket.len(), "expanding archives");
        } else {
            tracing::info!(count = bucket.len(), category = %category, "relocating");
        }

        for file in bucket {
            if let Some(pb) = progress {
                pb.set_message(
                    file.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
            }

            if category == Category::Archive {
                match expander.expand(root, &file) {
                    Ok(outcome) => report.archives.push(outcome),
                    Err(e) => report.fail(&file, e),
                }
            } else {
                match FileOrganizer::relocate(root, &file, category) {
                    Ok(_) => *report.moved.entry(category).or_insert(0) += 1,
                    Err(e) => report.fail(&file, e),
                }
            }

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
    }

    report.pruned_dirs = prune_empty_dirs(root);
    report.finished_at = Utc::now();

    tracing::info!(
        moved = report.total_moved(),
        archives = report.archives.len(),
        pruned = report.pruned_dirs,
        failures = report.failures.len(),
        "run complete"
    );
    Ok(report)
}

/// Scans `root` and returns every move a real run would make, without
/// touching the filesystem.
///
/// Archives are listed with their target folder as the destination.
pub fn plan(
    root: &Path,
    filters: &CompiledFilters,
) -> Result<(ScanSession, Vec<PlannedMove>), CleanError> {
    check_root(root)?;
    let session = Scanner::new(filters).scan(root)?;

    let mut moves = Vec::with_capacity(session.total_files());
    for category in Category::ALL {
        for file in session.bucket(category) {
            let to = if category == Category::Archive {
                target_folder(root, file)
            } else {
                FileOrganizer::destination(root, file, category)
            };
            match to {
                Ok(to) => moves.push(PlannedMove {
                    from: file.clone(),
                    to,
                    category,
                }),
                Err(e) => tracing::warn!(path = %file.display(), "{}", e),
            }
        }
    }
    Ok((session, moves))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_rejects_missing_root() {
        let result = run(
            Path::new("/non/existent/root"),
            &CompiledFilters::allow_all(),
            None,
        );
        assert!(matches!(result, Err(CleanError::InvalidRoot(_))));
    }

    #[test]
    fn test_run_rejects_file_root() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let result = run(&file, &CompiledFilters::allow_all(), None);
        assert!(matches!(result, Err(CleanError::InvalidRoot(_))));
    }

    #[test]
    fn test_run_counts_moves_per_category() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.png"), "x").unwrap();
        fs::write(root.join("b.jpg"), "x").unwrap();
        fs::write(root.join("c.docx"), "x").unwrap();
        fs::write(root.join("d.xyz"), "x").unwrap();

        let report = run(root, &CompiledFilters::allow_all(), None).unwrap();

        assert_eq!(report.moved.get(&Category::Images), Some(&2));
        assert_eq!(report.moved.get(&Category::Documents), Some(&1));
        assert_eq!(report.moved.get(&Category::Others), Some(&1));
        assert_eq!(report.total_moved(), 4);
        assert!(report.unknown_extensions.contains("XYZ"));
        assert!(report.is_success());
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn test_plan_does_not_touch_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/Лист.txt"), "x").unwrap();
        fs::write(root.join("pack.zip"), "x").unwrap();

        let (session, moves) = plan(root, &CompiledFilters::allow_all()).unwrap();

        assert_eq!(session.total_files(), 2);
        assert_eq!(
            moves,
            vec![
                PlannedMove {
                    from: root.join("sub/Лист.txt"),
                    to: root.join("DOCUMENTS/Lyst.txt"),
                    category: Category::Documents,
                },
                PlannedMove {
                    from: root.join("pack.zip"),
                    to: root.join("ARCHIVE/pack"),
                    category: Category::Archive,
                },
            ]
        );
        assert!(root.join("sub/Лист.txt").exists());
        assert!(!root.join("DOCUMENTS").exists());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("song.mp3"), "x").unwrap();

        let report = run(root, &CompiledFilters::allow_all(), None).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["moved"]["AUDIO"], 1);
        assert_eq!(json["failures"].as_array().map(Vec::len), Some(0));
    }
}
