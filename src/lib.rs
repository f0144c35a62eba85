//! # Winwrap
//!
//! A background window layer for compositors: windows of one configured class
//! are stretched over every output, pinned to every workspace and painted
//! behind everything else, like xwinwrap on X11.
//!
//! ## Architecture
//!
//! Winwrap is built on a modular architecture:
//! - `compositor`: Headless reference compositor the layer plugs into
//! - `plugin`: Plugin API (events, function hooks, config values, window rules)
//! - `background`: The background layer itself, shipped as a plugin
//! - `geometry`, `output`, `window`, `workspace`: Host data model
//! - `renderer`, `effects`, `decoration`, `input`: Host pipelines
//! - `config`: Configuration parsing and management
//!
//! ## Usage
//!
//! ```rust,no_run
//! use winwrap::{Compositor, WinwrapConfig, WinwrapPlugin};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = WinwrapConfig::load("~/.config/winwrap/winwrap.toml")?;
//!     let mut compositor = Compositor::new(config.clone());
//!     compositor.load_plugin(Box::new(WinwrapPlugin::new()))?;
//!     compositor.reload_config(config);
//!
//!     compositor.open_window("kitty-bg", "background");
//!     compositor.render_frame();
//!     Ok(())
//! }
//! ```

pub mod background;
pub mod compositor;
pub mod config;
pub mod decoration;
pub mod effects;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod output;
pub mod plugin;
pub mod renderer;
pub mod window;
pub mod workspace;

// Re-export main types for easy access
pub use background::{BackgroundRegistry, WinwrapPlugin};
pub use compositor::Compositor;
pub use config::WinwrapConfig;
pub use plugin::{Plugin, PluginError};

// Re-export common error types
pub use anyhow::{Context, Error, Result};

/// Version information for Winwrap
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// API version the crate was built against; plugins refuse to load into a
/// compositor reporting a different one
pub const API_HASH: &str = env!("WINWRAP_API_HASH");
