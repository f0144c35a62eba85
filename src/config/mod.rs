//! Configuration management for winwrap
//!
//! This module handles loading, parsing, and validating the compositor
//! configuration from TOML files. Plugin options live in `[plugin.<name>]`
//! tables and are surfaced to plugins as `plugin:<name>:<key>` values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WinwrapConfig {
    /// General compositor settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Window appearance settings
    #[serde(default)]
    pub window: WindowConfig,

    /// Visual effects configuration
    #[serde(default)]
    pub effects: EffectsConfig,

    /// Outputs of the headless session, in layout order
    #[serde(default)]
    pub outputs: Vec<OutputConfig>,

    /// Window rules, in `windowrulev2` syntax
    #[serde(default)]
    pub window_rules: Vec<String>,

    /// Plugin options: plugin name -> key -> value
    #[serde(default)]
    pub plugin: BTreeMap<String, BTreeMap<String, String>>,
}

/// General compositor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Frames per second of the headless session
    pub max_fps: u32,

    /// Window move/resize animation duration (milliseconds)
    pub animation_duration: u32,

    /// Overrides the API version the compositor reports to plugins
    pub api_version: Option<String>,
}

/// Window appearance configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Border width (pixels)
    pub border_width: u32,

    /// Corner rounding (pixels)
    pub rounding: u32,

    /// Active border color
    pub active_border_color: String,

    /// Inactive border color
    pub inactive_border_color: String,

    /// Opacity of the focused window (0.0-1.0)
    pub active_opacity: f32,

    /// Opacity of unfocused windows (0.0-1.0)
    pub inactive_opacity: f32,
}

/// Visual effects configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EffectsConfig {
    /// Blur effect settings
    pub blur: BlurConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlurConfig {
    /// Enable blur effects
    pub enabled: bool,

    /// Blur radius (pixels)
    pub radius: u32,

    /// Number of blur passes
    pub passes: u32,
}

/// A single output of the headless session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    pub name: String,

    /// Top-left corner in layout coordinates
    pub position: [f64; 2],

    /// Size in layout coordinates
    pub size: [f64; 2],
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_fps: 60,
            animation_duration: 200,
            api_version: None,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            border_width: 2,
            rounding: 8,
            active_border_color: "#7C3AED".to_string(),   // Purple
            inactive_border_color: "#374151".to_string(), // Gray
            active_opacity: 1.0,
            inactive_opacity: 0.95,
        }
    }
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 8,
            passes: 1,
        }
    }
}

impl WinwrapConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            let rest = path.strip_prefix("~").unwrap_or(path);
            Path::new(&home).join(rest)
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to load config file: {}", expanded_path.display()))
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: WinwrapConfig = toml::from_str(contents).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.general.max_fps == 0 {
            anyhow::bail!("Invalid max_fps: must be greater than 0");
        }

        for (name, opacity) in [
            ("active_opacity", self.window.active_opacity),
            ("inactive_opacity", self.window.inactive_opacity),
        ] {
            if !(0.0..=1.0).contains(&opacity) {
                anyhow::bail!("Invalid {}: must be between 0.0 and 1.0", name);
            }
        }

        let mut names = HashSet::new();
        for output in &self.outputs {
            if output.size[0] <= 0.0 || output.size[1] <= 0.0 {
                anyhow::bail!("Invalid size for output {}: {:?}", output.name, output.size);
            }
            if !names.insert(output.name.as_str()) {
                anyhow::bail!("Duplicate output name: {}", output.name);
            }
        }

        for (plugin, values) in &self.plugin {
            if let Some(class) = values.get("class") {
                if class.trim().is_empty() {
                    anyhow::bail!("Invalid plugin:{}:class: must not be empty", plugin);
                }
            }
        }

        Ok(())
    }

    /// Look up a `plugin:<name>:<key>` value
    pub fn plugin_value(&self, key: &str) -> Option<&str> {
        let mut parts = key.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("plugin"), Some(plugin), Some(option)) => {
                self.plugin.get(plugin)?.get(option).map(String::as_str)
            }
            _ => None,
        }
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Merge a partial configuration into this one
    /// Non-default values from the partial config will override this config
    pub fn merge_partial(mut self, partial: WinwrapConfig) -> Self {
        let default_config = WinwrapConfig::default();

        if partial.general != default_config.general {
            self.general = partial.general;
        }
        if partial.window != default_config.window {
            self.window = partial.window;
        }
        if partial.effects != default_config.effects {
            self.effects = partial.effects;
        }
        if !partial.outputs.is_empty() {
            self.outputs = partial.outputs;
        }
        self.window_rules.extend(partial.window_rules);
        for (plugin, values) in partial.plugin {
            self.plugin.entry(plugin).or_default().extend(values);
        }

        self
    }
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod property_tests;
