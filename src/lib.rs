//! clean-folder - sort a messy directory into category folders
//!
//! This library scans a directory tree, classifies files by extension,
//! transliterates Cyrillic file names into ASCII, moves files into category
//! folders, unpacks ZIP archives and removes the folders left empty.

pub mod archive;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod pipeline;
pub mod pruner;
pub mod scanner;
pub mod transliterate;

pub use archive::{ArchiveExpander, ArchiveOutcome, Unpacker, ZipUnpacker};
pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use file_category::{Category, ExtensionRegistry};
pub use file_organizer::FileOrganizer;
pub use pipeline::{CleanError, RunReport, plan, run};
pub use scanner::{ScanSession, Scanner};

pub use cli::{CliArgs, run_cli};
