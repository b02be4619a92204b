pub mod cancel;
pub mod diag;
pub mod progress;

use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use crate::error::FusionError;
use crate::file::collector::{Admission, FileCollector};
use crate::file::sniff::is_binary;
use crate::file::types::FileRecord;
use crate::output::{builtin_strategies, RenderContext};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::diag::{DiagnosticKind, DiagnosticLog};
use crate::pipeline::progress::ProgressSink;
use crate::plugin::PluginRegistry;
use crate::sanitize::Sanitizer;
use crate::settings::FusionConfig;

/// Counts and artifact locations for a completed run. The afterFusion
/// hook category reduces over this value, so plugins can annotate it
/// via `notes`.
#[derive(Debug, Clone)]
pub struct FusionSummary {
    pub artifacts: Vec<PathBuf>,
    pub log_path: Option<PathBuf>,
    /// Records rendered into the artifacts, placeholders included.
    pub files_fused: usize,
    pub placeholders: usize,
    /// Candidates dropped by guards, filters, vetoes or binary checks.
    pub skipped: usize,
    pub total_bytes: u64,
    pub notes: Vec<String>,
}

/// Discriminated outcome of a fusion run. Per-file problems never
/// produce `Failure`; they are visible in the diagnostic log and as
/// placeholders instead.
#[derive(Debug)]
pub enum FusionResult {
    Success(FusionSummary),
    Failure(FusionError),
    Cancelled,
}

/// Runs the whole fusion pipeline: admission, hooks, sanitization,
/// rendering, persistence. A cancellation observed before the first
/// read resolves to `Cancelled` with zero reads and zero artifacts; a
/// cancellation observed mid-run stops after the in-flight file and
/// still persists the diagnostic log.
pub async fn process_fusion(
    config: FusionConfig,
    registry: &PluginRegistry,
    progress: &dyn ProgressSink,
    cancel: CancelToken,
) -> FusionResult {
    if cancel.is_cancelled() {
        return FusionResult::Cancelled;
    }

    let mut diag = DiagnosticLog::new();
    let mut log_target: Option<(PathBuf, String)> = None;

    match execute(&config, registry, progress, &cancel, &mut diag, &mut log_target).await {
        Ok(summary) => FusionResult::Success(summary),
        Err(FusionError::Cancelled) => {
            if let Some((dir, name)) = log_target {
                diag.record(
                    DiagnosticKind::Cancelled,
                    None,
                    "cancellation observed; no artifacts were written",
                );
                let _ = tokio::fs::write(dir.join(format!("{name}.log")), diag.render()).await;
            }
            FusionResult::Cancelled
        }
        Err(e) => FusionResult::Failure(e),
    }
}

async fn execute(
    config: &FusionConfig,
    registry: &PluginRegistry,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
    diag: &mut DiagnosticLog,
    log_target: &mut Option<(PathBuf, String)>,
) -> Result<FusionSummary, FusionError> {
    let extra_groups = registry.extension_groups();
    config.validate(&extra_groups)?;

    let root = config.root_directory.canonicalize().map_err(|e| {
        FusionError::ConfigurationInvalid(format!(
            "cannot resolve rootDirectory {}: {e}",
            config.root_directory.display()
        ))
    })?;
    let output_dir = config
        .output_directory
        .clone()
        .unwrap_or_else(|| root.clone());
    *log_target = Some((output_dir.clone(), config.generated_file_name.clone()));

    progress.scan_started(&root);
    let extensions = config.admitted_extensions(&extra_groups);
    let mut collector = FileCollector::new(config, root.clone(), extensions)?;
    let outcome = collector.collect(diag, cancel)?;

    if outcome.admissions.is_empty() {
        return Err(FusionError::NoFilesMatched {
            hint: format!(
                "{} files matched the extension filter under {}. Enable more extension groups \
                 (configured: {:?}), add additionalExtensions, or relax ignorePatterns.",
                outcome.considered,
                root.display(),
                config.extension_groups
            ),
        });
    }

    let chain = registry.chain();
    let sanitizer = Sanitizer::from_config(config);
    let mut records: Vec<FileRecord> = Vec::new();
    let mut skipped = outcome.skipped;

    for admission in outcome.admissions {
        match admission {
            Admission::Placeholder(record) => {
                progress.file_completed(&record.relative_path, true);
                records.push(record);
            }
            Admission::Candidate(mut candidate) => {
                if cancel.is_cancelled() {
                    return Err(FusionError::Cancelled);
                }
                let relative = candidate.relative_path.clone();

                let bytes = match tokio::fs::read(&candidate.absolute_path).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        diag.record(
                            DiagnosticKind::ReadFailed,
                            Some(&relative),
                            format!("cannot read: {e}"),
                        );
                        records.push(FileRecord::error_placeholder(
                            relative.clone(),
                            candidate.size,
                            format!("file could not be read: {e}"),
                        ));
                        progress.file_completed(&relative, true);
                        continue;
                    }
                };

                if is_binary(&bytes) {
                    let error = FusionError::BinaryFileSkipped {
                        path: relative.clone(),
                    };
                    diag.record(DiagnosticKind::BinarySkipped, Some(&relative), error.to_string());
                    skipped += 1;
                    progress.file_completed(&relative, false);
                    continue;
                }

                let text = match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => {
                        diag.record(
                            DiagnosticKind::ReadFailed,
                            Some(&relative),
                            "content is not valid UTF-8",
                        );
                        records.push(FileRecord::error_placeholder(
                            relative.clone(),
                            candidate.size,
                            "content could not be decoded as UTF-8",
                        ));
                        progress.file_completed(&relative, true);
                        continue;
                    }
                };
                candidate.content = Some(text);

                let Some(candidate) = chain.before_file(cancel, candidate, diag).await? else {
                    skipped += 1;
                    progress.file_completed(&relative, false);
                    continue;
                };

                let content = candidate.content.clone().unwrap_or_default();
                let sanitized = sanitizer.apply(&content);
                if sanitized.redactions > 0 {
                    diag.record(
                        DiagnosticKind::SecretRedacted,
                        Some(&relative),
                        format!("{} credential-shaped matches redacted", sanitized.redactions),
                    );
                }
                if sanitized.blocked_protocols > 0 {
                    diag.record(
                        DiagnosticKind::ProtocolBlocked,
                        Some(&relative),
                        format!("{} dangerous URI schemes neutralized", sanitized.blocked_protocols),
                    );
                }
                if sanitized.clips > 0 {
                    diag.record(
                        DiagnosticKind::ContentClipped,
                        Some(&relative),
                        format!("{} oversized segments truncated", sanitized.clips),
                    );
                }

                let content = chain
                    .after_file(cancel, &candidate, sanitized.content, diag)
                    .await?;

                progress.file_completed(&candidate.relative_path, true);
                records.push(FileRecord::new(
                    candidate.relative_path,
                    content,
                    candidate.size,
                ));
            }
        }
    }

    let records = chain.before_fusion(cancel, records, diag).await?;

    tokio::fs::create_dir_all(&output_dir).await?;

    let mut strategies = builtin_strategies(config);
    strategies.extend(registry.output_strategies());

    let root_label = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let ctx = RenderContext {
        root_label,
        generated_at: Utc::now(),
        files: &records,
    };

    let mut artifacts = Vec::new();
    for strategy in strategies.iter_mut() {
        if cancel.is_cancelled() {
            return Err(FusionError::Cancelled);
        }
        progress.render_started(strategy.id());

        let mut rendered = strategy.generate_header(&ctx);
        for record in &records {
            rendered.push_str(&strategy.process_file(record));
        }
        rendered.push_str(&strategy.generate_footer(&ctx));

        let path = output_dir.join(format!(
            "{}.{}",
            config.generated_file_name,
            strategy.file_extension()
        ));
        tokio::fs::write(&path, rendered).await?;
        progress.write_completed(&path);
        artifacts.push(path);
    }

    let log_path = output_dir.join(format!("{}.log", config.generated_file_name));
    tokio::fs::write(&log_path, diag.render()).await?;

    let placeholders = records.iter().filter(|r| r.is_error_placeholder).count();
    let total_bytes = records
        .iter()
        .filter(|r| !r.is_error_placeholder)
        .map(|r| r.size)
        .sum();
    info!(
        files = records.len(),
        placeholders,
        skipped,
        artifacts = artifacts.len(),
        "Fusion complete"
    );

    let summary = FusionSummary {
        artifacts,
        log_path: Some(log_path),
        files_fused: records.len(),
        placeholders,
        skipped,
        total_bytes,
        notes: Vec::new(),
    };
    chain.after_fusion(cancel, summary, diag).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::types::{BeforeFileHook, FusionPlugin, PluginCapabilities};
    use crate::file::types::FileCandidate;
    use crate::pipeline::progress::NoopProgress;
    use async_trait::async_trait;
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn config_for(root: &Path) -> FusionConfig {
        FusionConfig {
            root_directory: root.to_path_buf(),
            use_gitignore: false,
            generate_text: true,
            generate_markdown: false,
            generate_html: false,
            ..FusionConfig::default()
        }
    }

    async fn run(config: FusionConfig) -> FusionResult {
        let registry = PluginRegistry::new();
        process_fusion(config, &registry, &NoopProgress, CancelToken::new()).await
    }

    fn summary(result: FusionResult) -> FusionSummary {
        match result {
            FusionResult::Success(summary) => summary,
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fuses_a_small_tree() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.rs"), "fn a() {}").unwrap();
        fs::write(temp.path().join("b.rs"), "fn b() {}").unwrap();

        let summary = summary(run(config_for(temp.path())).await);
        assert_eq!(summary.files_fused, 2);
        assert_eq!(summary.placeholders, 0);

        let artifact = fs::read_to_string(temp.path().join("fusion.txt")).unwrap();
        assert!(artifact.contains("fn a() {}"));
        assert!(artifact.contains("fn b() {}"));
        assert!(temp.path().join("fusion.log").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rejected_symlink_is_logged_and_content_appears_once() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.js"), "let shared = 42;").unwrap();
        std::os::unix::fs::symlink(temp.path().join("a.js"), temp.path().join("b.js")).unwrap();

        let summary = summary(run(config_for(temp.path())).await);
        assert_eq!(summary.files_fused, 1);
        assert_eq!(summary.skipped, 1);

        let artifact = fs::read_to_string(temp.path().join("fusion.txt")).unwrap();
        assert_eq!(artifact.matches("let shared = 42;").count(), 1);
        assert!(!artifact.contains("FILE: b.js"));

        let log = fs::read_to_string(temp.path().join("fusion.log")).unwrap();
        assert!(log.contains("b.js"));
        assert!(log.contains("symlink-rejected"));
    }

    #[tokio::test]
    async fn file_budget_yields_partial_success() {
        let temp = tempdir().unwrap();
        for i in 0..5 {
            fs::write(temp.path().join(format!("f{i}.rs")), format!("fn f{i}() {{}}")).unwrap();
        }

        let mut config = config_for(temp.path());
        config.max_files = 3;
        let summary = summary(run(config).await);
        assert_eq!(summary.files_fused, 3);

        let log = fs::read_to_string(temp.path().join("fusion.log")).unwrap();
        assert!(log.contains("budget-exceeded"));
    }

    #[tokio::test]
    async fn script_content_is_escaped_in_html() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("evil.js"), "<script>alert(1)</script>").unwrap();

        let mut config = config_for(temp.path());
        config.generate_text = false;
        config.generate_html = true;
        let summary = summary(run(config).await);
        assert_eq!(summary.files_fused, 1);

        let artifact = fs::read_to_string(temp.path().join("fusion.html")).unwrap();
        assert!(artifact.contains("&lt;script&gt;"));
        assert!(!artifact.contains("<script>"));
    }

    #[tokio::test]
    async fn cancellation_before_start_writes_nothing() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.rs"), "fn a() {}").unwrap();

        let registry = PluginRegistry::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result =
            process_fusion(config_for(temp.path()), &registry, &NoopProgress, cancel).await;
        assert!(matches!(result, FusionResult::Cancelled));

        assert!(!temp.path().join("fusion.txt").exists());
        assert!(!temp.path().join("fusion.log").exists());
    }

    #[tokio::test]
    async fn empty_tree_fails_with_remediation_hint() {
        let temp = tempdir().unwrap();
        let result = run(config_for(temp.path())).await;
        match result {
            FusionResult::Failure(FusionError::NoFilesMatched { hint }) => {
                assert!(hint.contains("extension"));
            }
            other => panic!("expected NoFilesMatched, got {other:?}"),
        }
        assert!(!temp.path().join("fusion.txt").exists());
        assert!(!temp.path().join("fusion.log").exists());
    }

    #[tokio::test]
    async fn oversized_file_is_visible_as_placeholder() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("big.rs"), vec![b'x'; 4096]).unwrap();
        fs::write(temp.path().join("ok.rs"), "fn ok() {}").unwrap();

        let mut config = config_for(temp.path());
        config.max_file_size_kb = 1;
        let summary = summary(run(config).await);
        assert_eq!(summary.files_fused, 2);
        assert_eq!(summary.placeholders, 1);

        let artifact = fs::read_to_string(temp.path().join("fusion.txt")).unwrap();
        assert!(artifact.contains("big.rs ⚠ UNAVAILABLE"));
        assert!(artifact.contains("fn ok() {}"));
    }

    #[tokio::test]
    async fn secrets_are_redacted_and_logged() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("settings.env"),
            "API_KEY = sk-abcdef1234567890\n",
        )
        .unwrap();

        let mut config = config_for(temp.path());
        config.extension_groups = vec!["config".to_string()];
        let summary = summary(run(config).await);
        assert_eq!(summary.files_fused, 1);

        let artifact = fs::read_to_string(temp.path().join("fusion.txt")).unwrap();
        assert!(artifact.contains("API_KEY = [REDACTED]"));
        assert!(!artifact.contains("sk-abcdef1234567890"));

        let log = fs::read_to_string(temp.path().join("fusion.log")).unwrap();
        assert!(log.contains("secret-redacted"));
    }

    struct VetoTests;

    #[async_trait]
    impl BeforeFileHook for VetoTests {
        async fn run(&self, c: FileCandidate) -> anyhow::Result<Option<FileCandidate>> {
            if c.relative_path.to_string_lossy().contains("test") {
                Ok(None)
            } else {
                Ok(Some(c))
            }
        }
    }

    #[tokio::test]
    async fn vetoed_file_leaves_no_trace_in_artifacts() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("main.rs"), "fn main() {}").unwrap();
        fs::write(temp.path().join("main_test.rs"), "fn probe() {}").unwrap();

        let mut registry = PluginRegistry::new();
        registry
            .register(FusionPlugin {
                name: "skip-tests".to_string(),
                version: "1.0".to_string(),
                capabilities: PluginCapabilities {
                    before_file_processing: Some(Arc::new(VetoTests)),
                    ..PluginCapabilities::default()
                },
            })
            .unwrap();

        let result = process_fusion(
            config_for(temp.path()),
            &registry,
            &NoopProgress,
            CancelToken::new(),
        )
        .await;
        let summary = summary(result);
        assert_eq!(summary.files_fused, 1);
        assert_eq!(summary.skipped, 1);

        let artifact = fs::read_to_string(temp.path().join("fusion.txt")).unwrap();
        assert!(artifact.contains("fn main() {}"));
        assert!(!artifact.contains("main_test.rs"));

        let log = fs::read_to_string(temp.path().join("fusion.log")).unwrap();
        assert!(log.contains("file-vetoed"));
    }

    #[tokio::test]
    async fn binary_file_is_skipped_with_diagnostic() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("blob.rs"), b"\x00\x01\x02binary").unwrap();
        fs::write(temp.path().join("ok.rs"), "fn ok() {}").unwrap();

        let summary = summary(run(config_for(temp.path())).await);
        assert_eq!(summary.files_fused, 1);
        assert_eq!(summary.skipped, 1);

        let log = fs::read_to_string(temp.path().join("fusion.log")).unwrap();
        assert!(log.contains("binary-skipped"));
        assert!(log.contains("blob.rs"));
    }

    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl ProgressSink for Recording {
        fn scan_started(&self, _root: &Path) {
            self.events.lock().unwrap().push("scan".to_string());
        }
        fn file_completed(&self, path: &Path, admitted: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("file:{}:{admitted}", path.display()));
        }
        fn render_started(&self, format: &str) {
            self.events.lock().unwrap().push(format!("render:{format}"));
        }
        fn write_completed(&self, artifact: &Path) {
            let name = artifact.file_name().unwrap().to_string_lossy().into_owned();
            self.events.lock().unwrap().push(format!("write:{name}"));
        }
    }

    #[tokio::test]
    async fn progress_checkpoints_fire_in_order() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.rs"), "fn a() {}").unwrap();

        let progress = Recording {
            events: Mutex::new(Vec::new()),
        };
        let registry = PluginRegistry::new();
        let result = process_fusion(
            config_for(temp.path()),
            &registry,
            &progress,
            CancelToken::new(),
        )
        .await;
        assert!(matches!(result, FusionResult::Success(_)));

        let events = progress.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "scan".to_string(),
                "file:a.rs:true".to_string(),
                "render:text".to_string(),
                "write:fusion.txt".to_string(),
            ]
        );
    }
}
