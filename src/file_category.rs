/// File categorization by extension.
///
/// This module owns the fixed extension registry and the `Category` enum whose
/// folder names double as the scanner's list of reserved directories, so the
/// relocator and the scanner always agree on what a category folder is called.
///
/// # Examples
///
/// ```
/// use clean_folder::file_category::{Category, ExtensionRegistry};
///
/// let registry = ExtensionRegistry::default();
/// assert_eq!(registry.classify("photo.JPG").category, Category::Images);
/// assert_eq!(registry.classify("song.mp3").category, Category::Audio);
/// assert_eq!(registry.classify("notes").category, Category::Others);
/// ```
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Folder names left behind by older runs that sorted by raw extension.
///
/// The scanner never descends into these, in addition to the category folders.
const LEGACY_OUTPUT_DIRS: [&str; 13] = [
    "JPEG", "JPG", "PNG", "TXT", "DOCX", "DOC", "PDF", "PPTX", "XLSX", "OTHER", "ZIP", "MP3", "MP4",
];

/// Represents a destination category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Image files (JPEG, JPG, PNG)
    Images,
    /// Audio files (MP3)
    Audio,
    /// Video files (MP4)
    Video,
    /// Document files (DOC, DOCX, PDF, TXT, PPTX, XLSX)
    Documents,
    /// Archive files (ZIP)
    Archive,
    /// Everything else, including files without an extension
    Others,
}

impl Category {
    /// All categories, in the order the pipeline drains them.
    pub const ALL: [Category; 6] = [
        Category::Images,
        Category::Audio,
        Category::Video,
        Category::Documents,
        Category::Others,
        Category::Archive,
    ];

    /// Returns the folder name created for this category under the scan root.
    ///
    /// # Examples
    ///
    /// ```
    /// use clean_folder::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "IMAGES");
    /// assert_eq!(Category::Archive.dir_name(), "ARCHIVE");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "IMAGES",
            Category::Audio => "AUDIO",
            Category::Video => "VIDEO",
            Category::Documents => "DOCUMENTS",
            Category::Archive => "ARCHIVE",
            Category::Others => "OTHERS",
        }
    }

    /// Returns true if a directory with this name is output of a previous run
    /// and must not be scanned again.
    pub fn is_reserved_dir_name(name: &str) -> bool {
        Category::ALL.iter().any(|c| c.dir_name() == name) || LEGACY_OUTPUT_DIRS.contains(&name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// The outcome of classifying a single file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// Uppercased extension token, `None` when the file has no extension.
    pub extension: Option<String>,
    /// True when the extension is present but not in the registry.
    pub unknown: bool,
}

/// Maps uppercase extension tokens to categories.
///
/// The table is fixed at construction; there is no way to add mappings later.
#[derive(Debug, Clone)]
pub struct ExtensionRegistry {
    extension_map: HashMap<&'static str, Category>,
}

impl ExtensionRegistry {
    /// Creates a registry holding the standard mappings.
    pub fn new() -> Self {
        let mappings = [
            ("JPEG", Category::Images),
            ("PNG", Category::Images),
            ("JPG", Category::Images),
            ("DOC", Category::Documents),
            ("PDF", Category::Documents),
            ("TXT", Category::Documents),
            ("DOCX", Category::Documents),
            ("PPTX", Category::Documents),
            ("XLSX", Category::Documents),
            ("ZIP", Category::Archive),
            ("MP3", Category::Audio),
            ("MP4", Category::Video),
        ];

        Self {
            extension_map: mappings.into_iter().collect(),
        }
    }

    /// Maps an extension token to a category, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use clean_folder::file_category::{Category, ExtensionRegistry};
    ///
    /// let registry = ExtensionRegistry::default();
    /// assert_eq!(registry.extension_to_category("pdf"), Some(Category::Documents));
    /// assert_eq!(registry.extension_to_category("rar"), None);
    /// ```
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(ext.to_uppercase().as_str()).copied()
    }

    /// Classifies a file by the text after the last `.` of its name.
    ///
    /// Names like `.bashrc` or `notes` have no extension and land in
    /// `Category::Others` without being reported as unknown.
    pub fn classify(&self, file_name: &str) -> Classification {
        let extension = Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_uppercase())
            .filter(|ext| !ext.is_empty());

        match extension {
            None => Classification {
                category: Category::Others,
                extension: None,
                unknown: false,
            },
            Some(ext) => match self.extension_to_category(&ext) {
                Some(category) => Classification {
                    category,
                    extension: Some(ext),
                    unknown: false,
                },
                None => Classification {
                    category: Category::Others,
                    extension: Some(ext),
                    unknown: true,
                },
            },
        }
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
