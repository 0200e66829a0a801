use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Largest accepted request body, 16 MiB
pub const MAX_CONTENT_LENGTH: u64 = 16 * 1024 * 1024;

pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

/// Document types accepted for upload
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["txt", "pdf", "doc", "docx", "rtf"];

/// File upload configuration
#[derive(Debug, Clone, PartialEq)]
pub struct UploadConfig {
    /// Directory uploaded files are written to
    pub folder: PathBuf,
    /// Maximum upload size in bytes
    pub max_content_length: u64,
    /// Lowercase extensions without the leading dot
    pub allowed_extensions: BTreeSet<String>,
}

impl UploadConfig {
    pub fn new(folder: impl AsRef<Path>) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
            max_content_length: MAX_CONTENT_LENGTH,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Check whether a file name carries one of the allowed extensions
    ///
    /// The comparison ignores case; names without a dot are rejected.
    pub fn allowed_file(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => self.allowed_extensions.contains(&ext.to_ascii_lowercase()),
            None => false,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_FOLDER)
    }
}
