use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use treefuse_core::{
    process_fusion, CancelToken, ConfigManager, FusionConfig, FusionResult, PluginRegistry,
    TracingProgress,
};

/// Runs the fusion pipeline and prints a result summary.
pub async fn run_fuse(
    root: &Path,
    config_path: Option<&Path>,
    out_name: Option<String>,
    no_redact: bool,
) -> Result<()> {
    let mut config = load_config(root, config_path)?;
    if let Some(name) = out_name {
        config.generated_file_name = name;
    }
    if no_redact {
        config.redact_secrets = false;
    }

    let registry = PluginRegistry::new();
    let result = process_fusion(config, &registry, &TracingProgress, CancelToken::new()).await;

    match result {
        FusionResult::Success(summary) => {
            println!(
                "Fused {} files ({} placeholders, {} skipped, {} bytes)",
                summary.files_fused, summary.placeholders, summary.skipped, summary.total_bytes
            );
            for artifact in &summary.artifacts {
                println!("  wrote {}", artifact.display());
            }
            if let Some(log) = &summary.log_path {
                println!("  log   {}", log.display());
            }
            for note in &summary.notes {
                println!("  note  {note}");
            }
            Ok(())
        }
        FusionResult::Cancelled => bail!("fusion cancelled before completion"),
        FusionResult::Failure(error) => Err(error.into()),
    }
}

/// Writes a default configuration file into the root.
pub fn run_init(root: &Path, force: bool) -> Result<()> {
    let path = ConfigManager::init(root, force)?;
    info!(path = %path.display(), "Configuration written");
    println!("Wrote {}", path.display());
    Ok(())
}

/// Loads the configuration and reports every validation finding.
pub fn run_check(root: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(root, config_path)?;
    let findings = config.findings(&[]);
    if findings.is_empty() {
        println!("Configuration OK");
        return Ok(());
    }
    for finding in &findings {
        println!("  problem: {finding}");
    }
    bail!("{} configuration problem(s) found", findings.len())
}

fn load_config(root: &Path, config_path: Option<&Path>) -> Result<FusionConfig> {
    let mut config = match config_path {
        Some(path) => ConfigManager::load_file(path)?,
        None => ConfigManager::load(root)?,
    };
    // An explicit --config may carry a relative root; anchor it at the
    // scanned root rather than the process working directory.
    if config.root_directory.is_relative() {
        config.root_directory = root.join(&config.root_directory);
    }
    Ok(config)
}
