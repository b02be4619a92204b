use std::sync::Arc;

use tracing::warn;

use crate::error::FusionError;
use crate::file::types::{FileCandidate, FileRecord};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::diag::{DiagnosticKind, DiagnosticLog};
use crate::pipeline::FusionSummary;
use crate::plugin::types::FusionPlugin;

/// Ordered, fault-isolated execution of one hook category. Hooks form a
/// reducer: the output of hook n feeds hook n+1. A hook that fails is
/// logged and its attempted transformation discarded; the next hook
/// receives the pre-hook value, so one misbehaving plugin cannot
/// corrupt or halt the run. Cancellation is checked once at chain
/// entry.
pub struct HookChain {
    plugins: Vec<Arc<FusionPlugin>>,
}

impl HookChain {
    pub fn new(plugins: Vec<Arc<FusionPlugin>>) -> Self {
        Self { plugins }
    }

    pub async fn before_file(
        &self,
        cancel: &CancelToken,
        candidate: FileCandidate,
        diag: &mut DiagnosticLog,
    ) -> Result<Option<FileCandidate>, FusionError> {
        if cancel.is_cancelled() {
            return Err(FusionError::Cancelled);
        }
        let mut current = candidate;
        for plugin in &self.plugins {
            let Some(hook) = &plugin.capabilities.before_file_processing else {
                continue;
            };
            match hook.run(current.clone()).await {
                Ok(Some(next)) => current = next,
                Ok(None) => {
                    // Veto: short-circuit the rest of the chain.
                    diag.record(
                        DiagnosticKind::FileVetoed,
                        Some(&current.relative_path),
                        format!("vetoed by plugin {}", plugin.name),
                    );
                    return Ok(None);
                }
                Err(e) => self.isolate(plugin, "beforeFileProcessing", &e, diag),
            }
        }
        Ok(Some(current))
    }

    pub async fn after_file(
        &self,
        cancel: &CancelToken,
        candidate: &FileCandidate,
        content: String,
        diag: &mut DiagnosticLog,
    ) -> Result<String, FusionError> {
        if cancel.is_cancelled() {
            return Err(FusionError::Cancelled);
        }
        let mut current = content;
        for plugin in &self.plugins {
            let Some(hook) = &plugin.capabilities.after_file_processing else {
                continue;
            };
            match hook.run(candidate, current.clone()).await {
                Ok(next) => current = next,
                Err(e) => self.isolate(plugin, "afterFileProcessing", &e, diag),
            }
        }
        Ok(current)
    }

    pub async fn before_fusion(
        &self,
        cancel: &CancelToken,
        records: Vec<FileRecord>,
        diag: &mut DiagnosticLog,
    ) -> Result<Vec<FileRecord>, FusionError> {
        if cancel.is_cancelled() {
            return Err(FusionError::Cancelled);
        }
        let mut current = records;
        for plugin in &self.plugins {
            let Some(hook) = &plugin.capabilities.before_fusion else {
                continue;
            };
            match hook.run(current.clone()).await {
                Ok(next) => current = next,
                Err(e) => self.isolate(plugin, "beforeFusion", &e, diag),
            }
        }
        Ok(current)
    }

    pub async fn after_fusion(
        &self,
        cancel: &CancelToken,
        summary: FusionSummary,
        diag: &mut DiagnosticLog,
    ) -> Result<FusionSummary, FusionError> {
        if cancel.is_cancelled() {
            return Err(FusionError::Cancelled);
        }
        let mut current = summary;
        for plugin in &self.plugins {
            let Some(hook) = &plugin.capabilities.after_fusion else {
                continue;
            };
            match hook.run(current.clone()).await {
                Ok(next) => current = next,
                Err(e) => self.isolate(plugin, "afterFusion", &e, diag),
            }
        }
        Ok(current)
    }

    fn isolate(
        &self,
        plugin: &FusionPlugin,
        hook: &str,
        error: &anyhow::Error,
        diag: &mut DiagnosticLog,
    ) {
        warn!(plugin = %plugin.name, hook, error = %error, "Hook failed; continuing with pre-hook value");
        let error = FusionError::PluginHookFailed {
            plugin: plugin.name.clone(),
            hook: hook.to_string(),
            reason: error.to_string(),
        };
        diag.record(DiagnosticKind::PluginHookFailed, None, error.to_string());
    }
}
