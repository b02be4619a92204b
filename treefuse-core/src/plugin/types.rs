use std::sync::Arc;

use async_trait::async_trait;

use crate::file::types::{FileCandidate, FileRecord};
use crate::output::OutputStrategy;
use crate::pipeline::FusionSummary;
use crate::settings::ExtensionGroup;

/// Runs before a file's content is sanitized. Returning `Ok(None)`
/// vetoes the file: it is removed from the output set entirely, not
/// even as a placeholder.
#[async_trait]
pub trait BeforeFileHook: Send + Sync {
    async fn run(&self, candidate: FileCandidate) -> anyhow::Result<Option<FileCandidate>>;
}

/// Runs after sanitization, reducing the final content string.
#[async_trait]
pub trait AfterFileHook: Send + Sync {
    async fn run(&self, candidate: &FileCandidate, content: String) -> anyhow::Result<String>;
}

/// Runs once over the aggregated records before rendering.
#[async_trait]
pub trait BeforeFusionHook: Send + Sync {
    async fn run(&self, records: Vec<FileRecord>) -> anyhow::Result<Vec<FileRecord>>;
}

/// Runs once over the run summary after artifacts are written.
#[async_trait]
pub trait AfterFusionHook: Send + Sync {
    async fn run(&self, summary: FusionSummary) -> anyhow::Result<FusionSummary>;
}

/// Closed set of optional capability slots. A missing slot is a no-op,
/// not an error; presence and shape are checked once at registration,
/// never at call time.
#[derive(Default)]
pub struct PluginCapabilities {
    pub before_file_processing: Option<Arc<dyn BeforeFileHook>>,
    pub after_file_processing: Option<Arc<dyn AfterFileHook>>,
    pub before_fusion: Option<Arc<dyn BeforeFusionHook>>,
    pub after_fusion: Option<Arc<dyn AfterFusionHook>>,
    /// Additional output strategies, constructed fresh per run.
    pub register_output_strategies: Option<fn() -> Vec<Box<dyn OutputStrategy>>>,
    /// Additional extension groups, resolved once at startup.
    pub register_file_extensions: Option<fn() -> Vec<ExtensionGroup>>,
}

/// A registered plugin: identity plus its capability slots.
pub struct FusionPlugin {
    pub name: String,
    pub version: String,
    pub capabilities: PluginCapabilities,
}

impl FusionPlugin {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            capabilities: PluginCapabilities::default(),
        }
    }
}

impl std::fmt::Debug for FusionPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caps = &self.capabilities;
        f.debug_struct("FusionPlugin")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("before_file_processing", &caps.before_file_processing.is_some())
            .field("after_file_processing", &caps.after_file_processing.is_some())
            .field("before_fusion", &caps.before_fusion.is_some())
            .field("after_fusion", &caps.after_fusion.is_some())
            .field(
                "register_output_strategies",
                &caps.register_output_strategies.is_some(),
            )
            .field(
                "register_file_extensions",
                &caps.register_file_extensions.is_some(),
            )
            .finish()
    }
}
