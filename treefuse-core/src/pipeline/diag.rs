use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// What happened to a file (or to the run) that the user should be able
/// to see after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    PathTraversal,
    SymlinkRejected,
    BinarySkipped,
    FileTooLarge,
    ReadFailed,
    SecretRedacted,
    ProtocolBlocked,
    ContentClipped,
    FileVetoed,
    PluginHookFailed,
    BudgetExceeded,
    Cancelled,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::PathTraversal => "path-traversal",
            DiagnosticKind::SymlinkRejected => "symlink-rejected",
            DiagnosticKind::BinarySkipped => "binary-skipped",
            DiagnosticKind::FileTooLarge => "file-too-large",
            DiagnosticKind::ReadFailed => "read-failed",
            DiagnosticKind::SecretRedacted => "secret-redacted",
            DiagnosticKind::ProtocolBlocked => "protocol-blocked",
            DiagnosticKind::ContentClipped => "content-clipped",
            DiagnosticKind::FileVetoed => "file-vetoed",
            DiagnosticKind::PluginHookFailed => "plugin-hook-failed",
            DiagnosticKind::BudgetExceeded => "budget-exceeded",
            DiagnosticKind::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    pub at: DateTime<Utc>,
    pub kind: DiagnosticKind,
    pub path: Option<PathBuf>,
    pub detail: String,
}

/// In-memory event log for one run, persisted as the `.log` artifact.
/// Security-relevant rejections must never disappear without a trace,
/// so everything recoverable lands here as well as in tracing.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    events: Vec<DiagnosticEvent>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        kind: DiagnosticKind,
        path: Option<&Path>,
        detail: impl Into<String>,
    ) {
        self.events.push(DiagnosticEvent {
            at: Utc::now(),
            kind,
            path: path.map(Path::to_path_buf),
            detail: detail.into(),
        });
    }

    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.events
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Plain-text rendering written next to the fusion artifacts.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "treefuse diagnostic log ({} events)\n",
            self.events.len()
        ));
        for event in &self.events {
            let path = event
                .path
                .as_ref()
                .map(|p| format!(" {}", p.display()))
                .unwrap_or_default();
            out.push_str(&format!(
                "{} [{}]{}: {}\n",
                event.at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                event.kind.as_str(),
                path,
                event.detail
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_includes_kind_path_and_detail() {
        let mut log = DiagnosticLog::new();
        log.record(
            DiagnosticKind::SymlinkRejected,
            Some(Path::new("b.js")),
            "symbolic link rejected by policy",
        );
        let rendered = log.render();
        assert!(rendered.contains("[symlink-rejected]"));
        assert!(rendered.contains("b.js"));
        assert!(rendered.contains("rejected by policy"));
    }

    #[test]
    fn counts_filter_by_kind() {
        let mut log = DiagnosticLog::new();
        log.record(DiagnosticKind::BinarySkipped, Some(Path::new("a.png")), "");
        log.record(DiagnosticKind::BinarySkipped, Some(Path::new("b.png")), "");
        log.record(DiagnosticKind::BudgetExceeded, None, "file budget");
        assert_eq!(log.count(DiagnosticKind::BinarySkipped), 2);
        assert_eq!(log.count(DiagnosticKind::BudgetExceeded), 1);
        assert_eq!(log.count(DiagnosticKind::Cancelled), 0);
    }
}
