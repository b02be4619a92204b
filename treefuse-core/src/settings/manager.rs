use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::error::FusionError;
use crate::settings::config::FusionConfig;

/// On-disk configuration file name, looked up in the scanned root.
pub const CONFIG_FILE_NAME: &str = "treefuse.json";

/// Loads and writes the JSON configuration file. The core pipeline
/// never parses raw JSON itself; it receives the already-validated
/// `FusionConfig` this produces.
pub struct ConfigManager;

impl ConfigManager {
    /// Loads `treefuse.json` from `root`, merged over defaults. A
    /// missing file yields the defaults with `root` as the scan root.
    pub fn load(root: &Path) -> Result<FusionConfig, FusionError> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(FusionConfig {
                root_directory: root.to_path_buf(),
                ..FusionConfig::default()
            });
        }
        let mut config = Self::load_file(&path)?;
        // A relative root in the file is anchored at the file's own
        // directory, not wherever the process happens to run.
        if config.root_directory.is_relative() {
            config.root_directory = root.join(&config.root_directory);
        }
        Ok(config)
    }

    /// Loads a specific configuration file. Unknown keys and malformed
    /// JSON are configuration errors, surfaced before any file I/O on
    /// the tree.
    pub fn load_file(path: &Path) -> Result<FusionConfig, FusionError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            FusionError::ConfigurationInvalid(format!(
                "cannot read {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            FusionError::ConfigurationInvalid(format!(
                "cannot parse {}: {e}",
                path.display()
            ))
        })
    }

    /// Writes a default configuration file into `root` for `init`.
    pub fn init(root: &Path, force: bool) -> Result<PathBuf> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.exists() && !force {
            bail!(
                "{} already exists; pass --force to overwrite",
                path.display()
            );
        }
        let defaults = FusionConfig::default();
        let contents = serde_json::to_string_pretty(&defaults)
            .context("Failed to serialize default configuration")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
