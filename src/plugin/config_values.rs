//! Plugin configuration values
//!
//! Plugins declare `plugin:<name>:<key>` options with a default. The value
//! seen by the plugin is the one from the `[plugin.<name>]` config table when
//! present, the default otherwise, and is refreshed on every config reload.

use anyhow::{bail, Result};
use log::debug;
use std::collections::BTreeMap;

use crate::config::WinwrapConfig;
use crate::plugin::PluginHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigOption {
    owner: PluginHandle,
    default: String,
    value: String,
}

#[derive(Debug, Default)]
pub struct ConfigValueStore {
    options: BTreeMap<String, ConfigOption>,
}

impl ConfigValueStore {
    /// Declare an option; `config` supplies the initial value
    pub fn add(&mut self, owner: PluginHandle, key: &str, default: &str, config: &WinwrapConfig) -> Result<()> {
        if key.splitn(3, ':').count() != 3 || !key.starts_with("plugin:") {
            bail!("Plugin config values must be named plugin:<name>:<key>, got {}", key);
        }
        if let Some(existing) = self.options.get(key) {
            if existing.owner != owner {
                bail!("Config value {} is already registered by another plugin", key);
            }
        }

        let value = config.plugin_value(key).unwrap_or(default).to_string();
        debug!("Registered config value {} = {:?}", key, value);
        self.options.insert(
            key.to_string(),
            ConfigOption {
                owner,
                default: default.to_string(),
                value,
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(|option| option.value.as_str())
    }

    /// Refresh every value from a newly loaded config
    pub fn apply_config(&mut self, config: &WinwrapConfig) {
        for (key, option) in self.options.iter_mut() {
            option.value = config.plugin_value(key).unwrap_or(&option.default).to_string();
        }
    }

    pub fn remove_owner(&mut self, owner: PluginHandle) -> usize {
        let before = self.options.len();
        self.options.retain(|_, option| option.owner != owner);
        before - self.options.len()
    }

    pub fn count_for(&self, owner: PluginHandle) -> usize {
        self.options.values().filter(|option| option.owner == owner).count()
    }
}
