//! Recursive directory scanning.
//!
//! A scan walks the tree under a root, classifies every file it finds and
//! collects the results in a [`ScanSession`]. Nothing on disk is touched while
//! scanning; relocation only starts once the whole tree has been classified.

use crate::config::CompiledFilters;
use crate::file_category::{Category, ExtensionRegistry};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Error reading directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Everything one traversal discovered.
///
/// A session is built fresh for every scan, so repeated runs never see each
/// other's results.
#[derive(Debug, Default)]
pub struct ScanSession {
    buckets: BTreeMap<Category, Vec<PathBuf>>,
    /// Subdirectories that were descended into, in visiting order.
    pub folders: Vec<PathBuf>,
    /// Extension tokens that are not in the registry.
    pub unknown_extensions: BTreeSet<String>,
    /// Every non-empty extension token encountered, known or not.
    pub extensions: BTreeSet<String>,
    /// Files the filter configuration kept out of the run.
    pub excluded: Vec<PathBuf>,
}

impl ScanSession {
    /// Files discovered for `category`, in discovery order.
    pub fn bucket(&self, category: Category) -> &[PathBuf] {
        self.buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Removes and returns the bucket for `category`.
    pub fn take_bucket(&mut self, category: Category) -> Vec<PathBuf> {
        self.buckets.remove(&category).unwrap_or_default()
    }

    /// Total number of files waiting in all buckets.
    pub fn total_files(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    fn push(&mut self, category: Category, path: PathBuf) {
        self.buckets.entry(category).or_default().push(path);
    }
}

/// Walks a directory tree and buckets its files by category.
pub struct Scanner<'a> {
    registry: ExtensionRegistry,
    filters: &'a CompiledFilters,
}

impl<'a> Scanner<'a> {
    pub fn new(filters: &'a CompiledFilters) -> Self {
        Self {
            registry: ExtensionRegistry::default(),
            filters,
        }
    }

    /// Scans `root` recursively.
    ///
    /// Directories named after a category (or a legacy output folder) are
    /// skipped, which keeps a second run from re-sorting the first run's
    /// output. Symbolic links to directories are never followed.
    ///
    /// # Errors
    ///
    /// Fails only if `root` itself cannot be read. Unreadable subdirectories
    /// are logged and skipped.
    pub fn scan(&self, root: &Path) -> Result<ScanSession, ScanError> {
        let mut session = ScanSession::default();
        self.scan_dir(root, root, &mut session)?;

        tracing::info!(
            root = %root.display(),
            files = session.total_files(),
            folders = session.folders.len(),
            unknown = session.unknown_extensions.len(),
            "scan complete"
        );
        Ok(session)
    }

    fn scan_dir(
        &self,
        root: &Path,
        dir: &Path,
        session: &mut ScanSession,
    ) -> Result<(), ScanError> {
        let mut entries: Vec<_> = fs::read_dir(dir)
            .map_err(|source| ScanError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?
            .flatten()
            .collect();
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let Ok(file_type) = entry.file_type() else {
                tracing::warn!(path = %path.display(), "could not determine entry type, skipping");
                continue;
            };

            if file_type.is_dir() {
                if Category::is_reserved_dir_name(&name) {
                    tracing::debug!(path = %path.display(), "skipping output folder");
                    continue;
                }
                session.folders.push(path.clone());
                if let Err(e) = self.scan_dir(root, &path, session) {
                    tracing::warn!("{}", e);
                }
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(&path);
            if !self.filters.should_include(relative) {
                tracing::debug!(path = %path.display(), "excluded by filters");
                session.excluded.push(path);
                continue;
            }

            let classification = self.registry.classify(&name);
            if let Some(ext) = classification.extension {
                if classification.unknown {
                    session.unknown_extensions.insert(ext.clone());
                }
                session.extensions.insert(ext);
            }
            tracing::trace!(
                path = %path.display(),
                category = %classification.category,
                "classified"
            );
            session.push(classification.category, path);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_scan_buckets_by_category() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(&root.join("a.png"));
        touch(&root.join("b.MP3"));
        touch(&root.join("nested/c.pdf"));
        touch(&root.join("nested/deeper/d.zip"));
        touch(&root.join("e.exe"));
        touch(&root.join("README"));

        let filters = CompiledFilters::allow_all();
        let session = Scanner::new(&filters).scan(root).unwrap();

        assert_eq!(session.bucket(Category::Images), [root.join("a.png")]);
        assert_eq!(session.bucket(Category::Audio), [root.join("b.MP3")]);
        assert_eq!(session.bucket(Category::Documents), [root.join("nested/c.pdf")]);
        assert_eq!(
            session.bucket(Category::Archive),
            [root.join("nested/deeper/d.zip")]
        );
        assert_eq!(
            session.bucket(Category::Others),
            [root.join("README"), root.join("e.exe")]
        );
        assert!(session.bucket(Category::Video).is_empty());
        assert_eq!(session.total_files(), 6);
    }

    #[test]
    fn test_scan_records_folders_and_extensions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(&root.join("one/two/x.txt"));
        touch(&root.join("y.rar"));
        fs::create_dir(root.join("empty")).unwrap();

        let filters = CompiledFilters::allow_all();
        let session = Scanner::new(&filters).scan(root).unwrap();

        assert_eq!(
            session.folders,
            vec![root.join("empty"), root.join("one"), root.join("one/two")]
        );
        assert_eq!(
            session.extensions.iter().cloned().collect::<Vec<_>>(),
            vec!["RAR".to_string(), "TXT".to_string()]
        );
        assert_eq!(
            session.unknown_extensions.iter().cloned().collect::<Vec<_>>(),
            vec!["RAR".to_string()]
        );
    }

    #[test]
    fn test_scan_skips_output_folders() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(&root.join("IMAGES/old.png"));
        touch(&root.join("ARCHIVE/pack/inner.txt"));
        touch(&root.join("MP3/song.mp3"));
        touch(&root.join("fresh.png"));

        let filters = CompiledFilters::allow_all();
        let session = Scanner::new(&filters).scan(root).unwrap();

        assert_eq!(session.total_files(), 1);
        assert!(session.folders.is_empty());
    }

    #[test]
    fn test_scan_applies_filters() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(&root.join("keep/secret.txt"));
        touch(&root.join("move.txt"));

        let filters = FilterConfig::from_toml("[filters.exclude]\npatterns = [\"keep/**\"]\n")
            .unwrap()
            .compile()
            .unwrap();
        let session = Scanner::new(&filters).scan(root).unwrap();

        assert_eq!(session.bucket(Category::Documents), [root.join("move.txt")]);
        assert_eq!(session.excluded, vec![root.join("keep/secret.txt")]);
    }

    #[test]
    fn test_take_bucket_drains() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(&root.join("a.jpg"));

        let filters = CompiledFilters::allow_all();
        let mut session = Scanner::new(&filters).scan(root).unwrap();

        assert_eq!(session.take_bucket(Category::Images).len(), 1);
        assert!(session.bucket(Category::Images).is_empty());
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let filters = CompiledFilters::allow_all();
        let result = Scanner::new(&filters).scan(Path::new("/non/existent/root"));
        assert!(matches!(result, Err(ScanError::ReadDir { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_does_not_follow_directory_symlinks() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("loop")).unwrap();
        std::os::unix::fs::symlink(root, root.join("loop/back")).unwrap();
        touch(&root.join("loop/a.txt"));

        let filters = CompiledFilters::allow_all();
        let session = Scanner::new(&filters).scan(root).unwrap();

        assert_eq!(session.folders, vec![root.join("loop")]);
        assert_eq!(session.bucket(Category::Documents), [root.join("loop/a.txt")]);
        assert_eq!(session.bucket(Category::Others), [root.join("loop/back")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(&root.join("a.txt"));
        touch(&root.join("locked/secret.pdf"));
        touch(&root.join("z.png"));
        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let filters = CompiledFilters::allow_all();
        let result = Scanner::new(&filters).scan(root);
        // Privileged users can still list the folder.
        let enforced = fs::read_dir(&locked).is_err();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let session = result.expect("an unreadable subdirectory must not abort the scan");
        assert_eq!(session.bucket(Category::Documents).first(), Some(&root.join("a.txt")));
        assert_eq!(session.bucket(Category::Images), [root.join("z.png")]);
        assert_eq!(session.folders, vec![locked.clone()]);
        if enforced {
            assert_eq!(session.bucket(Category::Documents), [root.join("a.txt")]);
        }
    }
}
