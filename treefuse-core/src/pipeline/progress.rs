use std::path::Path;

/// Synchronous progress notifications at well-defined pipeline
/// checkpoints. All methods default to no-ops so sinks implement only
/// what they care about.
pub trait ProgressSink: Send + Sync {
    fn scan_started(&self, _root: &Path) {}
    fn file_completed(&self, _relative_path: &Path, _admitted: bool) {}
    fn render_started(&self, _format: &str) {}
    fn write_completed(&self, _artifact: &Path) {}
}

/// Sink for callers that do not track progress.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// Forwards checkpoints to tracing at debug level.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn scan_started(&self, root: &Path) {
        tracing::debug!(root = %root.display(), "Scan started");
    }

    fn file_completed(&self, relative_path: &Path, admitted: bool) {
        tracing::debug!(path = %relative_path.display(), admitted, "File completed");
    }

    fn render_started(&self, format: &str) {
        tracing::debug!(format, "Render started");
    }

    fn write_completed(&self, artifact: &Path) {
        tracing::debug!(artifact = %artifact.display(), "Artifact written");
    }
}
