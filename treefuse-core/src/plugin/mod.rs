pub mod chain;
pub mod registry;
pub mod types;

pub use chain::HookChain;
pub use registry::PluginRegistry;
pub use types::{
    AfterFileHook, AfterFusionHook, BeforeFileHook, BeforeFusionHook, FusionPlugin,
    PluginCapabilities,
};
