use std::sync::Arc;

use crate::error::FusionError;
use crate::output::OutputStrategy;
use crate::plugin::chain::HookChain;
use crate::plugin::types::FusionPlugin;
use crate::settings::groups::{builtin_group, is_valid_group_name};
use crate::settings::ExtensionGroup;

/// Holds registered plugins in registration order. Validation happens
/// here, once, so the hook chain never has to re-check shapes at call
/// time.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<FusionPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: FusionPlugin) -> Result<(), FusionError> {
        if plugin.name.is_empty() {
            return Err(FusionError::ConfigurationInvalid(
                "plugin name must not be empty".to_string(),
            ));
        }
        if self.plugins.iter().any(|p| p.name == plugin.name) {
            return Err(FusionError::ConfigurationInvalid(format!(
                "plugin already registered: {}",
                plugin.name
            )));
        }

        if let Some(register) = plugin.capabilities.register_file_extensions {
            for group in register() {
                if !is_valid_group_name(&group.name) {
                    return Err(FusionError::ConfigurationInvalid(format!(
                        "plugin {} registers invalid group name: {:?}",
                        plugin.name, group.name
                    )));
                }
                if builtin_group(&group.name).is_some() {
                    return Err(FusionError::ConfigurationInvalid(format!(
                        "plugin {} redefines built-in group: {}",
                        plugin.name, group.name
                    )));
                }
                if group.extensions.is_empty() {
                    return Err(FusionError::ConfigurationInvalid(format!(
                        "plugin {} registers empty group: {}",
                        plugin.name, group.name
                    )));
                }
            }
        }

        tracing::info!(plugin = %plugin.name, version = %plugin.version, "Plugin registered");
        self.plugins.push(Arc::new(plugin));
        Ok(())
    }

    pub fn plugins(&self) -> &[Arc<FusionPlugin>] {
        &self.plugins
    }

    /// All plugin-registered extension groups, in registration order.
    pub fn extension_groups(&self) -> Vec<ExtensionGroup> {
        self.plugins
            .iter()
            .filter_map(|p| p.capabilities.register_file_extensions)
            .flat_map(|register| register())
            .collect()
    }

    /// Fresh instances of every plugin-registered output strategy.
    pub fn output_strategies(&self) -> Vec<Box<dyn OutputStrategy>> {
        self.plugins
            .iter()
            .filter_map(|p| p.capabilities.register_output_strategies)
            .flat_map(|register| register())
            .collect()
    }

    pub fn chain(&self) -> HookChain {
        HookChain::new(self.plugins.clone())
    }
}
