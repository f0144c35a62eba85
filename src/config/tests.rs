//! Unit tests for configuration module
//!
//! Tests configuration parsing, validation, plugin value lookup and
//! merging of partial configurations.

use super::*;
use anyhow::Result;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_configuration_is_valid() -> Result<()> {
    let config = WinwrapConfig::default();
    config.validate()?;

    assert_eq!(config.general.max_fps, 60);
    assert!(config.outputs.is_empty());
    assert!(config.plugin.is_empty());
    assert!(config.effects.blur.enabled);

    Ok(())
}

#[test]
fn test_configuration_serialization_roundtrip() -> Result<()> {
    let mut original_config = WinwrapConfig::default();
    original_config.outputs.push(OutputConfig {
        name: "DP-1".to_string(),
        position: [0.0, 0.0],
        size: [1920.0, 1080.0],
    });
    original_config
        .plugin
        .entry("winwrap".to_string())
        .or_default()
        .insert("class".to_string(), "mpv-bg".to_string());

    let toml_string = toml::to_string(&original_config)?;
    let deserialized_config: WinwrapConfig = toml::from_str(&toml_string)?;

    assert_eq!(original_config, deserialized_config);

    Ok(())
}

#[test]
fn test_configuration_from_file() -> Result<()> {
    let dir = tempdir()?;
    let file_path = dir.path().join("winwrap.toml");

    let test_config = r#"
window_rules = ["float, class:^(pavucontrol)$"]

[general]
max_fps = 30

[window]
border_width = 3
rounding = 0

[[outputs]]
name = "DP-1"
position = [0.0, 0.0]
size = [1920.0, 1080.0]

[[outputs]]
name = "HDMI-A-1"
position = [1920.0, 0.0]
size = [1080.0, 1920.0]

[plugin.winwrap]
class = "kitty-bg"
"#;

    fs::write(&file_path, test_config)?;

    let config = WinwrapConfig::load(&file_path)?;

    assert_eq!(config.general.max_fps, 30);
    assert_eq!(config.general.animation_duration, 200);
    assert_eq!(config.window.border_width, 3);
    assert_eq!(config.outputs.len(), 2);
    assert_eq!(config.outputs[1].size, [1080.0, 1920.0]);
    assert_eq!(config.window_rules, vec!["float, class:^(pavucontrol)$".to_string()]);
    assert_eq!(config.plugin_value("plugin:winwrap:class"), Some("kitty-bg"));

    Ok(())
}

#[test]
fn test_missing_file_reports_path() {
    let err = WinwrapConfig::load("/nonexistent/winwrap.toml").unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/winwrap.toml"));
}

#[test]
fn test_invalid_toml_is_rejected() {
    assert!(WinwrapConfig::from_toml("[general\nmax_fps = 1").is_err());
}

#[test]
fn test_validation_rejects_zero_sized_output() {
    let config = r#"
[[outputs]]
name = "DP-1"
position = [0.0, 0.0]
size = [0.0, 1080.0]
"#;
    assert!(WinwrapConfig::from_toml(config).is_err());
}

#[test]
fn test_validation_rejects_duplicate_output_names() {
    let config = r#"
[[outputs]]
name = "DP-1"
position = [0.0, 0.0]
size = [1920.0, 1080.0]

[[outputs]]
name = "DP-1"
position = [1920.0, 0.0]
size = [1920.0, 1080.0]
"#;
    assert!(WinwrapConfig::from_toml(config).is_err());
}

#[test]
fn test_validation_rejects_empty_class() {
    let config = r#"
[plugin.winwrap]
class = "  "
"#;
    assert!(WinwrapConfig::from_toml(config).is_err());
}

#[test]
fn test_validation_rejects_out_of_range_opacity() {
    let mut config = WinwrapConfig::default();
    config.window.inactive_opacity = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_plugin_value_lookup() {
    let config = WinwrapConfig::from_toml("[plugin.winwrap]\nclass = \"mpv\"\n").unwrap();

    assert_eq!(config.plugin_value("plugin:winwrap:class"), Some("mpv"));
    assert_eq!(config.plugin_value("plugin:winwrap:missing"), None);
    assert_eq!(config.plugin_value("plugin:other:class"), None);
    assert_eq!(config.plugin_value("general:max_fps"), None);
}

#[test]
fn test_merge_partial_keeps_unspecified_sections() {
    let mut base = WinwrapConfig::default();
    base.window.border_width = 5;
    base.outputs.push(OutputConfig {
        name: "DP-1".to_string(),
        position: [0.0, 0.0],
        size: [2560.0, 1440.0],
    });

    let partial = WinwrapConfig::from_toml("[plugin.winwrap]\nclass = \"mpv\"\n").unwrap();
    let merged = base.merge_partial(partial);

    assert_eq!(merged.window.border_width, 5);
    assert_eq!(merged.outputs.len(), 1);
    assert_eq!(merged.plugin_value("plugin:winwrap:class"), Some("mpv"));
}

#[test]
fn test_save_and_reload() -> Result<()> {
    let dir = tempdir()?;
    let file_path = dir.path().join("saved.toml");

    let mut config = WinwrapConfig::default();
    config.general.max_fps = 144;
    config.save(&file_path)?;

    let loaded = WinwrapConfig::load(&file_path)?;
    assert_eq!(loaded, config);

    Ok(())
}
