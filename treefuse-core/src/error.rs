use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for a fusion run.
///
/// Per-file variants (traversal, symlink, size, binary, plugin) are
/// recovered inside the pipeline and become skipped candidates or error
/// placeholders. Run-level variants (configuration, no files matched,
/// cancelled) abort the run with no partial artifacts.
#[derive(Error, Debug)]
pub enum FusionError {
    #[error("path escapes the configured root: {path}")]
    PathTraversal { path: PathBuf },

    #[error("symbolic link rejected by policy: {path}")]
    SymlinkNotAllowed { path: PathBuf },

    #[error("file exceeds the size limit: {path} ({size} bytes, limit {limit})")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    #[error("binary file skipped: {path}")]
    BinaryFileSkipped { path: PathBuf },

    #[error("plugin hook failed: {plugin}::{hook}: {reason}")]
    PluginHookFailed {
        plugin: String,
        hook: String,
        reason: String,
    },

    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    #[error("fusion cancelled")]
    Cancelled,

    #[error("no files matched the configured filters. {hint}")]
    NoFilesMatched { hint: String },

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FusionError {
    /// True for problems that abort the whole run rather than a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FusionError::Cancelled
                | FusionError::NoFilesMatched { .. }
                | FusionError::ConfigurationInvalid(_)
        )
    }
}
