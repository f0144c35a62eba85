//! Plugin API
//!
//! Plugins are loaded into a running [`Compositor`] and extend it through a
//! small set of primitives:
//!
//! - event callbacks ([`events`])
//! - function hooks on internal handlers ([`hooks`])
//! - `plugin:<name>:<key>` config values ([`config_values`])
//! - config keywords such as `windowrulev2` ([`rules`])
//! - on-screen notifications
//!
//! Everything a plugin registers is tied to its [`PluginHandle`] and released
//! by the compositor when the plugin is unloaded or fails to initialize.

pub mod config_values;
pub mod events;
pub mod hooks;
pub mod rules;

use anyhow::{bail, Result};
use log::{error, info, warn};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::compositor::Compositor;
use events::{Callback, CallbackId, EventKind};
use hooks::{FunctionAddress, FunctionHook, FunctionMatch, Replacement};
use rules::WindowRule;

/// Identity of a loaded plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginHandle(pub u64);

impl fmt::Display for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plugin#{}", self.0)
    }
}

/// What a plugin reports about itself after a successful init
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescription {
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
}

/// Errors that abort plugin initialization
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Version mismatch: built against {expected}, running {found}")]
    VersionMismatch { expected: String, found: String },

    #[error("Failed to find a hookable {0} function")]
    FunctionNotFound(&'static str),

    #[error("Failed to install hook: {0}")]
    HookFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Notification colours
pub const COLOR_ERROR: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
pub const COLOR_SUCCESS: [f32; 4] = [0.2, 1.0, 0.2, 1.0];

/// An on-screen notification
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub text: String,
    pub color: [f32; 4],
    pub timeout: Duration,
}

/// A compositor plugin
pub trait Plugin {
    /// Called once when the plugin is loaded
    fn init(&mut self, compositor: &mut Compositor, handle: PluginHandle) -> Result<PluginDescription, PluginError>;

    /// Called once when the plugin is unloaded
    fn exit(&mut self, compositor: &mut Compositor);
}

pub(crate) struct LoadedPlugin {
    pub(crate) handle: PluginHandle,
    pub(crate) description: PluginDescription,
    pub(crate) plugin: Box<dyn Plugin>,
}

impl Compositor {
    /// Load and initialize a plugin.
    ///
    /// On failure everything the plugin registered so far is released and
    /// the error is returned; the plugin is not kept.
    pub fn load_plugin(&mut self, mut plugin: Box<dyn Plugin>) -> Result<PluginHandle, PluginError> {
        self.next_plugin_handle += 1;
        let handle = PluginHandle(self.next_plugin_handle);

        match plugin.init(self, handle) {
            Ok(description) => {
                info!(
                    "Loaded plugin {} {} by {} ({})",
                    description.name, description.version, description.author, handle
                );
                self.plugins.push(LoadedPlugin {
                    handle,
                    description,
                    plugin,
                });
                Ok(handle)
            }
            Err(err) => {
                error!("Plugin initialization failed: {}", err);
                self.release_plugin(handle);
                Err(err)
            }
        }
    }

    /// Unload a plugin; returns false for unknown handles
    pub fn unload_plugin(&mut self, handle: PluginHandle) -> bool {
        let Some(index) = self.plugins.iter().position(|p| p.handle == handle) else {
            warn!("Unload requested for unknown {}", handle);
            return false;
        };

        let mut loaded = self.plugins.remove(index);
        loaded.plugin.exit(self);
        self.release_plugin(handle);
        info!("Unloaded plugin {}", loaded.description.name);
        true
    }

    pub fn plugin_description(&self, handle: PluginHandle) -> Option<&PluginDescription> {
        self.plugins
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| &p.description)
    }

    pub fn loaded_plugins(&self) -> Vec<PluginHandle> {
        self.plugins.iter().map(|p| p.handle).collect()
    }

    fn release_plugin(&mut self, handle: PluginHandle) {
        let callbacks = self.events.unregister_owner(handle);
        let hooks = self.hooks.remove_owner(handle);
        let values = self.config_values.remove_owner(handle);
        if callbacks + hooks + values > 0 {
            info!(
                "Released {}: {} callbacks, {} hooks, {} config values",
                handle, callbacks, hooks, values
            );
        }
    }

    /// Number of callbacks, hooks and config values held by `handle`
    pub fn plugin_registrations(&self, handle: PluginHandle) -> usize {
        self.events.count_for(handle) + self.hooks.count_for(handle) + self.config_values.count_for(handle)
    }

    pub fn register_callback(&mut self, handle: PluginHandle, kind: EventKind, callback: Callback) -> CallbackId {
        self.events.register(handle, kind, callback)
    }

    pub fn unregister_callback(&mut self, id: CallbackId) -> bool {
        self.events.unregister(id)
    }

    pub fn find_functions_by_name(&self, name: &str) -> Vec<FunctionMatch> {
        self.hooks.find_functions_by_name(name)
    }

    /// Create a (disabled) hook; call [`FunctionHook::hook`] to enable it
    pub fn create_function_hook(
        &mut self,
        handle: PluginHandle,
        address: FunctionAddress,
        replacement: Replacement,
    ) -> Result<FunctionHook> {
        self.hooks.create(handle, address, replacement)
    }

    pub fn add_config_value(&mut self, handle: PluginHandle, key: &str, default: &str) -> Result<()> {
        self.config_values.add(handle, key, default, &self.config)
    }

    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config_values.get(key)
    }

    /// Apply a config keyword at runtime
    pub fn parse_keyword(&mut self, keyword: &str, value: &str) -> Result<()> {
        match keyword {
            "windowrulev2" => {
                self.rules.add(WindowRule::parse(value)?);
                Ok(())
            }
            other => bail!("Unknown config keyword: {}", other),
        }
    }

    pub fn add_notification(&mut self, text: impl Into<String>, color: [f32; 4], timeout: Duration) {
        let notification = Notification {
            text: text.into(),
            color,
            timeout,
        };
        info!("Notification: {}", notification.text);
        self.notifications.push(notification);
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }
}
