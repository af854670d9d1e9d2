//! Archive expansion.
//!
//! Every archive gets its own folder under `ARCHIVE`, named after the
//! normalized archive name without its extension. The archive is moved into
//! that folder under its original name and unpacked there; on success only
//! the extracted contents remain.

use crate::file_category::Category;
use crate::file_organizer::{OrganizeError, OrganizeResult, ensure_dir, file_name_of, move_file};
use crate::transliterate::normalize;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why an archive could not be unpacked.
#[derive(Debug, Error)]
pub enum UnpackError {
    /// The file is not an archive this unpacker understands.
    #[error("not a recognized archive: {0}")]
    Format(String),

    /// The archive disappeared before it could be read.
    #[error("archive not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("I/O error while unpacking: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can unpack an archive file into a directory.
pub trait Unpacker {
    fn unpack(&self, archive: &Path, destination: &Path) -> Result<(), UnpackError>;
}

/// Unpacks ZIP archives.
///
/// The leading bytes are sniffed before anything is extracted, so a text file
/// that merely ends in `.zip` is reported as a format fault.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipUnpacker;

impl Unpacker for ZipUnpacker {
    fn unpack(&self, archive: &Path, destination: &Path) -> Result<(), UnpackError> {
        let mut file = match File::open(archive) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(UnpackError::Missing(archive.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut header = [0u8; 8];
        let read = file.read(&mut header)?;
        if !infer::archive::is_zip(&header[..read]) {
            let detected = infer::get(&header[..read])
                .map(|kind| kind.mime_type())
                .unwrap_or("unknown content");
            return Err(UnpackError::Format(format!(
                "{} looks like {}",
                archive.display(),
                detected
            )));
        }

        let mut zip = zip::ZipArchive::new(file).map_err(|e| zip_error(archive, e))?;
        zip.extract(destination).map_err(|e| zip_error(archive, e))
    }
}

fn zip_error(archive: &Path, error: zip::result::ZipError) -> UnpackError {
    match error {
        zip::result::ZipError::Io(e) if e.kind() == ErrorKind::NotFound => {
            UnpackError::Missing(archive.to_path_buf())
        }
        zip::result::ZipError::Io(e) => UnpackError::Io(e),
        other => UnpackError::Format(format!("{}: {}", archive.display(), other)),
    }
}

/// What happened to one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveOutcome {
    /// Contents were extracted and the archive file removed.
    Extracted { folder: PathBuf },
    /// The archive could not be read and was left inside its folder.
    KeptCorrupt { archive: PathBuf, reason: String },
    /// The archive vanished before extraction; its folder was removed.
    Missing { archive: PathBuf },
}

/// Returns the folder name an archive expands into.
///
/// The trailing archive extension is stripped (ignoring case) before the rest
/// of the name is normalized.
///
/// # Examples
///
/// ```
/// use clean_folder::archive::archive_folder_name;
///
/// assert_eq!(archive_folder_name("Звіт.zip"), "Zvit");
/// assert_eq!(archive_folder_name("photos.2024.ZIP"), "photos.2024");
/// ```
pub fn archive_folder_name(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("zip") => stem,
        _ => file_name,
    };
    normalize(stem)
}

/// Where the contents of `archive` end up under `base_path`.
pub fn target_folder(base_path: &Path, archive: &Path) -> OrganizeResult<PathBuf> {
    let file_name = file_name_of(archive)?;
    Ok(base_path
        .join(Category::Archive.dir_name())
        .join(archive_folder_name(&file_name)))
}

/// Moves archives under `ARCHIVE` and unpacks them.
pub struct ArchiveExpander<U: Unpacker = ZipUnpacker> {
    unpacker: U,
}

impl ArchiveExpander<ZipUnpacker> {
    pub fn new() -> Self {
        Self {
            unpacker: ZipUnpacker,
        }
    }
}

impl Default for ArchiveExpander<ZipUnpacker> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Unpacker> ArchiveExpander<U> {
    pub fn with_unpacker(unpacker: U) -> Self {
        Self { unpacker }
    }

    /// Expands one archive found during the scan.
    ///
    /// Unpacking faults are part of the outcome, not errors: a corrupt archive
    /// stays in its folder and a vanished one has its folder removed.
    ///
    /// # Errors
    ///
    /// Returns an error if a folder cannot be created, the archive cannot be
    /// moved, or the archive cannot be deleted after a successful extraction.
    pub fn expand(&self, base_path: &Path, archive: &Path) -> OrganizeResult<ArchiveOutcome> {
        let file_name = file_name_of(archive)?;
        ensure_dir(&base_path.join(Category::Archive.dir_name()))?;

        let folder = target_folder(base_path, archive)?;
        ensure_dir(&folder)?;

        let moved = folder.join(&file_name);
        match move_file(archive, &moved) {
            Ok(()) => {}
            Err(OrganizeError::FileMoveFailure { source, .. })
                if source.kind() == ErrorKind::NotFound =>
            {
                return Ok(self.drop_missing(&folder, archive));
            }
            Err(e) => return Err(e),
        }

        match self.unpacker.unpack(&moved, &folder) {
            Ok(()) => {
                fs::remove_file(&moved).map_err(|source| OrganizeError::RemoveFailed {
                    path: moved.clone(),
                    source,
                })?;
                tracing::debug!(
                    archive = %archive.display(),
                    folder = %folder.display(),
                    "extracted"
                );
                Ok(ArchiveOutcome::Extracted { folder })
            }
            Err(UnpackError::Missing(_)) => Ok(self.drop_missing(&folder, archive)),
            Err(e) => {
                tracing::warn!(archive = %moved.display(), "{}, leaving it in place", e);
                Ok(ArchiveOutcome::KeptCorrupt {
                    archive: moved,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn drop_missing(&self, folder: &Path, archive: &Path) -> ArchiveOutcome {
        tracing::warn!(archive = %archive.display(), "archive vanished before extraction");
        if let Err(e) = fs::remove_dir(folder) {
            tracing::trace!(folder = %folder.display(), "could not remove folder: {}", e);
        }
        ArchiveOutcome::Missing {
            archive: archive.to_path_buf(),
        }
    }
}
