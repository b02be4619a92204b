use std::path::PathBuf;

/// A discovered path that passed admission control. Owned by exactly
/// one pipeline stage at a time; `content` is populated when the file
/// is read and may be rewritten by hooks and sanitization.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub size: u64,
    pub content: Option<String>,
}

/// The admitted, sanitized representation handed to output strategies.
/// Immutable from that point on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub relative_path: PathBuf,
    pub content: String,
    /// Set when the original content was rejected and `content` holds a
    /// human-readable reason instead. The stub keeps the rejection
    /// visible in the artifact rather than silently dropping the file.
    pub is_error_placeholder: bool,
    pub size: u64,
}

impl FileRecord {
    pub fn new(relative_path: PathBuf, content: String, size: u64) -> Self {
        Self {
            relative_path,
            content,
            is_error_placeholder: false,
            size,
        }
    }

    pub fn error_placeholder(relative_path: PathBuf, size: u64, reason: impl Into<String>) -> Self {
        Self {
            relative_path,
            content: reason.into(),
            is_error_placeholder: true,
            size,
        }
    }
}
