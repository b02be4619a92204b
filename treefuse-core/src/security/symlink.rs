use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::FusionError;

/// Outcome of auditing a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymlinkVerdict {
    /// Not a symlink (regular file, directory, or nothing on disk).
    NotSymlink,
    /// A symlink the policy permits; `resolved` is the canonical target
    /// and must be re-checked against the root by the caller.
    Allowed { resolved: PathBuf },
}

/// One retained audit record. The trail is capped so a pathological
/// tree (a symlink farm, a recursive link bomb) cannot grow it without
/// bound.
#[derive(Debug, Clone)]
pub struct SymlinkAuditEntry {
    pub path: PathBuf,
    pub target: Option<PathBuf>,
    pub allowed: bool,
    pub at: DateTime<Utc>,
}

pub struct SymlinkAuditor {
    allow_symlinks: bool,
    cap: usize,
    entries: Vec<SymlinkAuditEntry>,
    dropped: usize,
}

impl SymlinkAuditor {
    pub fn new(allow_symlinks: bool, cap: usize) -> Self {
        Self {
            allow_symlinks,
            cap,
            entries: Vec::new(),
            dropped: 0,
        }
    }

    /// Classifies `path`. Non-existent paths are not symlinks and not an
    /// error; read failures surface downstream with their own
    /// diagnostics. A rejected symlink fails with `SymlinkNotAllowed`
    /// and is recorded in the audit trail. When the policy permits
    /// symlinks, the resolved target is returned for containment
    /// re-validation; a link that cannot be resolved is rejected.
    pub fn audit(&mut self, path: &Path) -> Result<SymlinkVerdict, FusionError> {
        let Ok(metadata) = fs::symlink_metadata(path) else {
            return Ok(SymlinkVerdict::NotSymlink);
        };
        if !metadata.file_type().is_symlink() {
            return Ok(SymlinkVerdict::NotSymlink);
        }

        if !self.allow_symlinks {
            self.record(path, None, false);
            return Err(FusionError::SymlinkNotAllowed {
                path: path.to_path_buf(),
            });
        }

        match fs::canonicalize(path) {
            Ok(resolved) => {
                self.record(path, Some(resolved.clone()), true);
                Ok(SymlinkVerdict::Allowed { resolved })
            }
            Err(e) => {
                // Dangling or cyclic link: nothing to re-validate, so
                // it cannot be admitted even under a permissive policy.
                warn!(path = %path.display(), error = %e, "Symlink target could not be resolved");
                self.record(path, None, false);
                Err(FusionError::SymlinkNotAllowed {
                    path: path.to_path_buf(),
                })
            }
        }
    }

    fn record(&mut self, path: &Path, target: Option<PathBuf>, allowed: bool) {
        if self.entries.len() >= self.cap {
            self.dropped += 1;
            return;
        }
        self.entries.push(SymlinkAuditEntry {
            path: path.to_path_buf(),
            target,
            allowed,
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[SymlinkAuditEntry] {
        &self.entries
    }

    /// Audit records not retained because the cap was reached.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_path_is_not_a_symlink() {
        let temp = tempdir().unwrap();
        let mut auditor = SymlinkAuditor::new(false, 16);
        let verdict = auditor.audit(&temp.path().join("nope.txt")).unwrap();
        assert_eq!(verdict, SymlinkVerdict::NotSymlink);
        assert!(auditor.entries().is_empty());
    }

    #[test]
    fn regular_file_is_not_a_symlink() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("a.txt");
        std::fs::write(&file, "hello").unwrap();
        let mut auditor = SymlinkAuditor::new(false, 16);
        assert_eq!(auditor.audit(&file).unwrap(), SymlinkVerdict::NotSymlink);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_rejected_when_policy_forbids() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("a.txt");
        std::fs::write(&target, "hello").unwrap();
        let link = temp.path().join("b.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let mut auditor = SymlinkAuditor::new(false, 16);
        let err = auditor.audit(&link).unwrap_err();
        assert!(matches!(err, FusionError::SymlinkNotAllowed { .. }));
        assert_eq!(auditor.entries().len(), 1);
        assert!(!auditor.entries()[0].allowed);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_resolved_when_policy_permits() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("a.txt");
        std::fs::write(&target, "hello").unwrap();
        let link = temp.path().join("b.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let mut auditor = SymlinkAuditor::new(true, 16);
        match auditor.audit(&link).unwrap() {
            SymlinkVerdict::Allowed { resolved } => {
                assert_eq!(resolved, target.canonicalize().unwrap());
            }
            other => panic!("expected Allowed, got {other:?}"),
        }
        assert!(auditor.entries()[0].allowed);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_rejected_even_when_permitted() {
        let temp = tempdir().unwrap();
        let link = temp.path().join("dangling.txt");
        std::os::unix::fs::symlink(temp.path().join("gone.txt"), &link).unwrap();

        let mut auditor = SymlinkAuditor::new(true, 16);
        let err = auditor.audit(&link).unwrap_err();
        assert!(matches!(err, FusionError::SymlinkNotAllowed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn audit_trail_is_capped() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("a.txt");
        std::fs::write(&target, "hello").unwrap();

        let mut auditor = SymlinkAuditor::new(false, 2);
        for i in 0..5 {
            let link = temp.path().join(format!("link-{i}"));
            std::os::unix::fs::symlink(&target, &link).unwrap();
            let _ = auditor.audit(&link);
        }
        assert_eq!(auditor.entries().len(), 2);
        assert_eq!(auditor.dropped(), 3);
    }
}
