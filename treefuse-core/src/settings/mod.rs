pub mod config;
pub mod groups;
pub mod manager;

pub use config::FusionConfig;
pub use groups::ExtensionGroup;
pub use manager::{ConfigManager, CONFIG_FILE_NAME};
