/// Moving files into their category folders.
///
/// This module creates category subdirectories under the scan root and moves
/// files into them under their normalized names.
use crate::file_category::Category;
use crate::transliterate::normalize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single completed move.
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    /// Where the file was found.
    pub original_path: PathBuf,
    /// Where the file ended up.
    pub new_path: PathBuf,
    /// The category the file was moved to.
    pub category: Category,
}

/// Errors that can occur while relocating files.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid base path {}: {source}", path.display())]
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File has no name component: {}", .0.display())]
    MissingFileName(PathBuf),

    #[error("Failed to remove {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Creates `path` unless it already exists.
pub(crate) fn ensure_dir(path: &Path) -> OrganizeResult<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(source) => Err(OrganizeError::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Renames `from` to `to`, replacing whatever file already sits at `to`.
pub(crate) fn move_file(from: &Path, to: &Path) -> OrganizeResult<()> {
    if to.exists() {
        tracing::warn!(
            from = %from.display(),
            to = %to.display(),
            "destination exists and will be replaced"
        );
    }
    fs::rename(from, to).map_err(|source| OrganizeError::FileMoveFailure {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

pub(crate) fn file_name_of(path: &Path) -> OrganizeResult<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| OrganizeError::MissingFileName(path.to_path_buf()))
}

/// Moves files into category folders under a base directory.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Returns where `file_path` would land under `base_path` for `category`.
    ///
    /// # Examples
    ///
    /// ```
    /// use clean_folder::file_category::Category;
    /// use clean_folder::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let dest = FileOrganizer::destination(
    ///     Path::new("/base"),
    ///     Path::new("/base/nested/фото 1.png"),
    ///     Category::Images,
    /// )
    /// .unwrap();
    /// assert_eq!(dest, Path::new("/base/IMAGES/foto_1.png"));
    /// ```
    pub fn destination(
        base_path: &Path,
        file_path: &Path,
        category: Category,
    ) -> OrganizeResult<PathBuf> {
        let file_name = file_name_of(file_path)?;
        Ok(base_path
            .join(category.dir_name())
            .join(normalize(&file_name)))
    }

    /// Moves a file into its category directory under its normalized name.
    ///
    /// The category directory is created if missing. Two files that normalize
    /// to the same name are not told apart: the later move replaces the
    /// earlier file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use clean_folder::file_category::Category;
    /// use clean_folder::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::relocate(
    ///     Path::new("/path/to/base"),
    ///     Path::new("/path/to/base/Світлина.png"),
    ///     Category::Images,
    /// );
    ///
    /// match result {
    ///     Ok(op) => println!("Moved {} to {}", op.original_path.display(), op.new_path.display()),
    ///     Err(e) => eprintln!("Relocation failed: {}", e),
    /// }
    /// ```
    pub fn relocate(
        base_path: &Path,
        file_path: &Path,
        category: Category,
    ) -> OrganizeResult<Operation> {
        if !base_path.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "base path does not exist",
                ),
            });
        }

        let destination_path = Self::destination(base_path, file_path, category)?;
        ensure_dir(&base_path.join(category.dir_name()))?;
        move_file(file_path, &destination_path)?;

        tracing::debug!(
            from = %file_path.display(),
            to = %destination_path.display(),
            "moved"
        );

        Ok(Operation {
            original_path: file_path.to_path_buf(),
            new_path: destination_path,
            category,
        })
    }
}
