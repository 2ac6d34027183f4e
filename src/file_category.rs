/// File categorization by extension.
///
/// Every file lands in exactly one category folder. The mapping is fixed for
/// the lifetime of the process: a lowercase extension (with its leading dot)
/// maps to a category, and anything unmapped falls into [`Category::Other`].
///
/// # Examples
///
/// ```
/// use foldersort::file_category::{Category, classify};
/// use std::path::Path;
///
/// assert_eq!(classify(Path::new("holiday.JPG")), Category::Pics);
/// assert_eq!(classify(Path::new("notes.txt")), Category::Docs);
/// assert_eq!(classify(Path::new("Makefile")), Category::Other);
/// ```
use std::fmt;
use std::path::Path;

/// Represents a destination category folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Images (JPG, PNG, GIF)
    Pics,
    /// Documents (PDF, DOCX, TXT)
    Docs,
    /// Video (MP4, AVI, MOV)
    Video,
    /// Audio (MP3, WAV)
    Audio,
    /// Archives (ZIP, TAR, RAR)
    Archives,
    /// Everything without a known extension
    Other,
}

/// Extension table, keyed by lowercase extension including the leading dot.
pub static CATEGORY_TABLE: &[(&str, Category)] = &[
    (".jpg", Category::Pics),
    (".jpeg", Category::Pics),
    (".png", Category::Pics),
    (".gif", Category::Pics),
    (".pdf", Category::Docs),
    (".docx", Category::Docs),
    (".txt", Category::Docs),
    (".mp4", Category::Video),
    (".avi", Category::Video),
    (".mov", Category::Video),
    (".mp3", Category::Audio),
    (".wav", Category::Audio),
    (".zip", Category::Archives),
    (".tar", Category::Archives),
    (".rar", Category::Archives),
];

impl Category {
    /// Returns the folder name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldersort::file_category::Category;
    ///
    /// assert_eq!(Category::Pics.dir_name(), "pics");
    /// assert_eq!(Category::Other.dir_name(), "other");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Pics => "pics",
            Category::Docs => "docs",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Archives => "archives",
            Category::Other => "other",
        }
    }

    /// Looks up a dotted extension such as `".PNG"`, case-insensitively.
    ///
    /// The empty string and unknown extensions resolve to [`Category::Other`].
    pub fn from_extension(ext: &str) -> Category {
        let ext = ext.to_lowercase();
        CATEGORY_TABLE
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, category)| *category)
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Returns the dotted extension of `path`, or an empty string when it has none.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Classifies a file by its extension.
pub fn classify(path: &Path) -> Category {
    Category::from_extension(&dotted_extension(path))
}
