//! Plugin lifecycle
//!
//! `WinwrapPlugin` wires the background layer into a compositor: it checks
//! the API version, subscribes to window/render/config events, hooks both
//! commit handlers and registers the class option. Any failure rolls back
//! what was installed and is reported as a red notification.

use log::{debug, info, warn};
use std::rc::Rc;
use std::time::Duration;

use crate::background::{interceptors, placement, render_hook, SharedRegistry, CLASS_OPTION, DEFAULT_CLASS};
use crate::compositor::Compositor;
use crate::plugin::events::{CallbackId, Event, EventKind};
use crate::plugin::hooks::{FunctionHook, Replacement, SubsurfaceCommitFn, WindowCommitFn};
use crate::plugin::rules::escape_class;
use crate::plugin::{Plugin, PluginDescription, PluginError, PluginHandle, COLOR_ERROR, COLOR_SUCCESS};
use crate::window::{Subsurface, WindowHandle};

const NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Name of the subsurface commit handler among the `on_commit` candidates
const SUBSURFACE_TYPE: &str = "Subsurface";

/// The background layer plugin
#[derive(Default)]
pub struct WinwrapPlugin {
    registry: SharedRegistry,
    callbacks: Vec<CallbackId>,
    hooks: Vec<FunctionHook>,
}

impl WinwrapPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the registry, valid after the plugin is boxed and loaded
    pub fn registry(&self) -> SharedRegistry {
        Rc::clone(&self.registry)
    }

    fn description() -> PluginDescription {
        PluginDescription {
            name: "winwrap".to_string(),
            description: "Run any window as the desktop background".to_string(),
            author: "Winwrap Contributors".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    fn try_init(&mut self, compositor: &mut Compositor, handle: PluginHandle) -> Result<(), PluginError> {
        let found = compositor.api_version();
        if found != crate::API_HASH {
            return Err(PluginError::VersionMismatch {
                expected: crate::API_HASH.to_string(),
                found: found.to_string(),
            });
        }

        self.register_callbacks(compositor, handle);
        self.install_hooks(compositor, handle)?;
        compositor.add_config_value(handle, CLASS_OPTION, DEFAULT_CLASS)?;

        Ok(())
    }

    fn register_callbacks(&mut self, compositor: &mut Compositor, handle: PluginHandle) {
        let registry = Rc::clone(&self.registry);
        let on_open = Rc::new(move |c: &mut Compositor, event: &Event| {
            if let Event::OpenWindow(window) = event {
                let class = target_class(c);
                placement::on_new_window(c, &registry, window, &class);
            }
        });

        let registry = Rc::clone(&self.registry);
        let on_close = Rc::new(move |_: &mut Compositor, event: &Event| {
            if let Event::CloseWindow(window) = event {
                let removed = registry.borrow_mut().unregister_closed(window);
                if removed > 0 {
                    debug!("Dropped {} background registry entries", removed);
                }
            }
        });

        let registry = Rc::clone(&self.registry);
        let on_render = Rc::new(move |c: &mut Compositor, event: &Event| {
            if let Event::Render(stage) = event {
                render_hook::on_render_stage(c, &registry, *stage);
            }
        });

        let on_reload = Rc::new(|c: &mut Compositor, _: &Event| install_rules(c));

        self.callbacks = vec![
            compositor.register_callback(handle, EventKind::OpenWindow, on_open),
            compositor.register_callback(handle, EventKind::CloseWindow, on_close),
            compositor.register_callback(handle, EventKind::Render, on_render),
            compositor.register_callback(handle, EventKind::ConfigReloaded, on_reload),
        ];
    }

    fn install_hooks(&mut self, compositor: &mut Compositor, handle: PluginHandle) -> Result<(), PluginError> {
        let candidates = compositor.find_functions_by_name("on_commit");
        if candidates.is_empty() {
            return Err(PluginError::FunctionNotFound("on_commit"));
        }
        let subsurface_commit = candidates
            .iter()
            .find(|candidate| candidate.demangled.contains(SUBSURFACE_TYPE))
            .ok_or(PluginError::FunctionNotFound("Subsurface::on_commit"))?;

        let window_commit = compositor
            .find_functions_by_name("listener_commit_window")
            .into_iter()
            .next()
            .ok_or(PluginError::FunctionNotFound("listener_commit_window"))?;

        let registry = Rc::clone(&self.registry);
        let subsurface_hook = compositor
            .create_function_hook(
                handle,
                subsurface_commit.address,
                Replacement::SubsurfaceCommit(Rc::new(
                    move |c: &mut Compositor, subsurface: &Subsurface, original: SubsurfaceCommitFn| {
                        interceptors::on_commit_subsurface(c, &registry, subsurface, original)
                    },
                )),
            )
            .map_err(|err| PluginError::HookFailed(format!("{:#}", err)))?;
        self.hooks.push(subsurface_hook.clone());

        let registry = Rc::clone(&self.registry);
        let window_hook = compositor
            .create_function_hook(
                handle,
                window_commit.address,
                Replacement::WindowCommit(Rc::new(
                    move |c: &mut Compositor, window: &WindowHandle, original: WindowCommitFn| {
                        interceptors::on_commit_window(c, &registry, window, original)
                    },
                )),
            )
            .map_err(|err| PluginError::HookFailed(format!("{:#}", err)))?;
        self.hooks.push(window_hook.clone());

        if !subsurface_hook.hook(compositor) {
            return Err(PluginError::HookFailed("subsurface commit handler".to_string()));
        }
        if !window_hook.hook(compositor) {
            return Err(PluginError::HookFailed("window commit handler".to_string()));
        }

        Ok(())
    }

    fn rollback(&mut self, compositor: &mut Compositor) {
        for hook in self.hooks.drain(..) {
            hook.unhook(compositor);
        }
        for id in self.callbacks.drain(..) {
            compositor.unregister_callback(id);
        }
        self.registry.borrow_mut().clear();
    }
}

impl Plugin for WinwrapPlugin {
    fn init(&mut self, compositor: &mut Compositor, handle: PluginHandle) -> Result<PluginDescription, PluginError> {
        match self.try_init(compositor, handle) {
            Ok(()) => {
                compositor.add_notification(
                    "[winwrap] Initialized successfully!",
                    COLOR_SUCCESS,
                    NOTIFICATION_TIMEOUT,
                );
                info!("🖼️ Background layer ready for class {}", target_class(compositor));
                Ok(Self::description())
            }
            Err(err) => {
                self.rollback(compositor);
                compositor.add_notification(
                    format!("[winwrap] Failure in initialization: {}", err),
                    COLOR_ERROR,
                    NOTIFICATION_TIMEOUT,
                );
                Err(err)
            }
        }
    }

    fn exit(&mut self, _compositor: &mut Compositor) {
        let windows = self.registry.borrow().len();
        self.registry.borrow_mut().clear();
        self.callbacks.clear();
        self.hooks.clear();
        info!("Background layer unloaded ({} registry entries released)", windows);
    }
}

fn target_class(compositor: &Compositor) -> String {
    compositor
        .config_value(CLASS_OPTION)
        .unwrap_or(DEFAULT_CLASS)
        .to_string()
}

/// Make the host's own rule engine float and stretch matching windows too
fn install_rules(compositor: &mut Compositor) {
    let class = escape_class(&target_class(compositor));
    for rule in [
        format!("float, class:^({})$", class),
        format!("size 100% 100%, class:^({})$", class),
    ] {
        if let Err(err) = compositor.parse_keyword("windowrulev2", &rule) {
            warn!("Failed to install window rule {:?}: {:#}", rule, err);
        }
    }
}
