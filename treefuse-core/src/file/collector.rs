use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::error::FusionError;
use crate::file::types::{FileCandidate, FileRecord};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::diag::{DiagnosticKind, DiagnosticLog};
use crate::security::{validate_secure_path, SymlinkAuditor, SymlinkVerdict};
use crate::settings::FusionConfig;

/// One admission decision, in discovery order. Placeholders keep
/// rejected-but-visible files (for example oversized ones) in the same
/// position they would have rendered at.
#[derive(Debug)]
pub enum Admission {
    Candidate(FileCandidate),
    Placeholder(FileRecord),
}

#[derive(Debug, Default)]
pub struct CollectorOutcome {
    pub admissions: Vec<Admission>,
    /// Files that matched the extension filter before gating.
    pub considered: usize,
    /// Candidates dropped by guards (traversal, symlink, ignore).
    pub skipped: usize,
    pub budget_exhausted: bool,
}

/// Walks the tree under the root and applies admission control:
/// path-guard containment, symlink policy, extension filter, ignore
/// patterns (plus gitignore when enabled), per-file size limits, and
/// the run budgets. Admission order is stable: discovery is sorted by
/// relative path so every downstream pass sees the same sequence.
pub struct FileCollector<'a> {
    config: &'a FusionConfig,
    root: PathBuf,
    extensions: BTreeSet<String>,
    ignore_matcher: Gitignore,
    auditor: SymlinkAuditor,
}

impl<'a> FileCollector<'a> {
    pub fn new(
        config: &'a FusionConfig,
        root: PathBuf,
        extensions: BTreeSet<String>,
    ) -> Result<Self, FusionError> {
        let mut builder = GitignoreBuilder::new(&root);
        for pattern in &config.ignore_patterns {
            builder.add_line(None, pattern).map_err(|e| {
                FusionError::ConfigurationInvalid(format!(
                    "invalid ignore pattern {pattern:?}: {e}"
                ))
            })?;
        }
        let ignore_matcher = builder
            .build()
            .map_err(|e| FusionError::ConfigurationInvalid(format!("ignore patterns: {e}")))?;

        let auditor = SymlinkAuditor::new(config.allow_symlinks, config.symlink_audit_cap);

        Ok(Self {
            config,
            root,
            extensions,
            ignore_matcher,
            auditor,
        })
    }

    pub fn collect(
        &mut self,
        diag: &mut DiagnosticLog,
        cancel: &CancelToken,
    ) -> Result<CollectorOutcome, FusionError> {
        let discovered = self.discover();

        let mut outcome = CollectorOutcome::default();
        let mut admitted_files = 0usize;
        let mut admitted_bytes = 0u64;
        let max_files = self.config.max_files;
        let max_bytes = self.config.max_total_size_bytes();
        let max_file_bytes = self.config.max_file_size_bytes();

        for path in discovered {
            if cancel.is_cancelled() {
                return Err(FusionError::Cancelled);
            }

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let relative = relative.to_path_buf();

            if !self.extension_matches(&path) {
                continue;
            }
            outcome.considered += 1;

            if self.ignored(&path) {
                debug!(path = %relative.display(), "Skipped by ignore pattern");
                outcome.skipped += 1;
                continue;
            }

            // Containment is checked before any stat of the target so an
            // out-of-bounds path leaks neither existence nor size.
            if let Err(e) = validate_secure_path(&path, &self.root) {
                warn!(path = %relative.display(), "Path escapes root");
                diag.record(DiagnosticKind::PathTraversal, Some(&relative), e.to_string());
                outcome.skipped += 1;
                continue;
            }

            let read_path = match self.auditor.audit(&path) {
                Ok(SymlinkVerdict::NotSymlink) => path.clone(),
                Ok(SymlinkVerdict::Allowed { resolved }) => {
                    // A permitted symlink still may not escape the root.
                    match validate_secure_path(&resolved, &self.root) {
                        Ok(inside) => inside,
                        Err(e) => {
                            warn!(path = %relative.display(), "Symlink target escapes root");
                            diag.record(
                                DiagnosticKind::PathTraversal,
                                Some(&relative),
                                e.to_string(),
                            );
                            outcome.skipped += 1;
                            continue;
                        }
                    }
                }
                Err(e) => {
                    diag.record(DiagnosticKind::SymlinkRejected, Some(&relative), e.to_string());
                    outcome.skipped += 1;
                    continue;
                }
            };

            let size = match fs::metadata(&read_path) {
                Ok(meta) if meta.is_file() => meta.len(),
                Ok(_) => {
                    outcome.skipped += 1;
                    continue;
                }
                Err(e) => {
                    diag.record(
                        DiagnosticKind::ReadFailed,
                        Some(&relative),
                        format!("cannot stat: {e}"),
                    );
                    outcome.skipped += 1;
                    continue;
                }
            };

            if admitted_files >= max_files {
                let error = FusionError::BudgetExceeded(format!(
                    "file budget reached ({max_files}); remaining files skipped"
                ));
                diag.record(DiagnosticKind::BudgetExceeded, None, error.to_string());
                outcome.budget_exhausted = true;
                break;
            }
            if admitted_bytes + size > max_bytes {
                let error = FusionError::BudgetExceeded(format!(
                    "total size budget reached ({max_bytes} bytes); remaining files skipped"
                ));
                diag.record(DiagnosticKind::BudgetExceeded, None, error.to_string());
                outcome.budget_exhausted = true;
                break;
            }

            if size > max_file_bytes {
                let error = FusionError::FileTooLarge {
                    path: relative.clone(),
                    size,
                    limit: max_file_bytes,
                };
                diag.record(DiagnosticKind::FileTooLarge, Some(&relative), error.to_string());
                // Oversized files stay visible as placeholders instead
                // of silently vanishing from the artifact.
                outcome.admissions.push(Admission::Placeholder(
                    FileRecord::error_placeholder(relative, size, error.to_string()),
                ));
                admitted_files += 1;
                continue;
            }

            outcome.admissions.push(Admission::Candidate(FileCandidate {
                absolute_path: read_path,
                relative_path: relative,
                size,
                content: None,
            }));
            admitted_files += 1;
            admitted_bytes += size;
        }

        Ok(outcome)
    }

    pub fn symlink_audit(&self) -> &SymlinkAuditor {
        &self.auditor
    }

    /// Walks the tree without following links and returns file and
    /// symlink entries sorted by path, so admission order is stable
    /// regardless of directory iteration order.
    fn discover(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .follow_links(false)
            .git_ignore(self.config.use_gitignore)
            .git_exclude(self.config.use_gitignore)
            .git_global(false)
            .filter_entry(|entry| entry.file_name().to_string_lossy() != ".git")
            .build();

        for result in walker {
            let Ok(entry) = result else { continue };
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_file() || file_type.is_symlink() {
                paths.push(entry.into_path());
            }
        }

        paths.sort();
        paths
    }

    fn extension_matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    fn ignored(&self, path: &Path) -> bool {
        let is_dir = false;
        self.ignore_matcher
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }
}
