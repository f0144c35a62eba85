//! Property-based tests for configuration module
//!
//! These tests use proptest to generate random configurations and verify
//! validation invariants and serialization round-trips.

use super::*;
use proptest::prelude::*;

// Strategy for generating valid window configurations
prop_compose! {
    fn valid_window_config()(
        border_width in 0u32..20u32,
        rounding in 0u32..40u32,
        active_opacity in 0.0f32..=1.0f32,
        inactive_opacity in 0.0f32..=1.0f32,
    ) -> WindowConfig {
        WindowConfig {
            border_width,
            rounding,
            active_opacity,
            inactive_opacity,
            ..WindowConfig::default()
        }
    }
}

// Strategy for generating a row of outputs with unique names
prop_compose! {
    fn valid_outputs()(
        sizes in prop::collection::vec((320.0f64..7680.0, 240.0f64..4320.0), 0..6),
    ) -> Vec<OutputConfig> {
        let mut x = 0.0;
        sizes
            .into_iter()
            .enumerate()
            .map(|(i, (w, h))| {
                let output = OutputConfig {
                    name: format!("DP-{}", i + 1),
                    position: [x, 0.0],
                    size: [w, h],
                };
                x += w;
                output
            })
            .collect()
    }
}

prop_compose! {
    fn valid_config()(
        max_fps in 1u32..240u32,
        window in valid_window_config(),
        outputs in valid_outputs(),
        class in "[a-z][a-z0-9-]{0,15}",
    ) -> WinwrapConfig {
        let mut config = WinwrapConfig {
            general: GeneralConfig { max_fps, ..GeneralConfig::default() },
            window,
            outputs,
            ..WinwrapConfig::default()
        };
        config.plugin.entry("winwrap".to_string()).or_default().insert("class".to_string(), class);
        config
    }
}

proptest! {
    #[test]
    fn prop_generated_configs_validate(config in valid_config()) {
        prop_assert!(config.validate().is_ok());
    }

    #[test]
    fn prop_toml_roundtrip_preserves_plugin_values(config in valid_config()) {
        let serialized = toml::to_string(&config).unwrap();
        let parsed = WinwrapConfig::from_toml(&serialized).unwrap();

        prop_assert_eq!(parsed.plugin_value("plugin:winwrap:class"), config.plugin_value("plugin:winwrap:class"));
        prop_assert_eq!(parsed.outputs.len(), config.outputs.len());
        prop_assert_eq!(parsed.general.max_fps, config.general.max_fps);
    }

    #[test]
    fn prop_zero_fps_always_rejected(mut config in valid_config()) {
        config.general.max_fps = 0;
        prop_assert!(config.validate().is_err());
    }

    #[test]
    fn prop_duplicate_output_names_rejected(mut config in valid_config()) {
        prop_assume!(!config.outputs.is_empty());
        let duplicate = config.outputs[0].clone();
        config.outputs.push(duplicate);
        prop_assert!(config.validate().is_err());
    }
}
