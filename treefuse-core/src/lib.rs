pub mod error;
pub mod file;
pub mod output;
pub mod pipeline;
pub mod plugin;
pub mod sanitize;
pub mod security;
pub mod settings;

// Public library API - the types a CLI or embedding application needs
// to run a fusion and extend it with plugins.
pub use error::FusionError;
pub use file::{FileCandidate, FileRecord};
pub use output::{AnchorAllocator, OutputStrategy, RenderContext};
pub use pipeline::cancel::CancelToken;
pub use pipeline::progress::{NoopProgress, ProgressSink, TracingProgress};
pub use pipeline::{process_fusion, FusionResult, FusionSummary};
pub use plugin::{FusionPlugin, PluginCapabilities, PluginRegistry};
pub use settings::{ConfigManager, ExtensionGroup, FusionConfig, CONFIG_FILE_NAME};
