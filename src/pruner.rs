//! Removal of directories emptied by relocation.

use std::fs;
use std::path::Path;

/// Removes every empty directory below `root`, deepest first.
///
/// `root` itself is never removed. Directories that still hold anything, or
/// that cannot be removed for any other reason, are silently kept. Symbolic
/// links to directories are not followed.
///
/// Returns the number of directories removed.
pub fn prune_empty_dirs(root: &Path) -> usize {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let path = entry.path();
        removed += prune_empty_dirs(&path);
        match fs::remove_dir(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "removed empty folder");
                removed += 1;
            }
            Err(e) => tracing::trace!(path = %path.display(), "kept folder: {}", e),
        }
    }
    removed
}
