//! Core compositor implementation
//!
//! This module contains the headless `Compositor`: it owns outputs, windows,
//! workspaces and per-frame render state, and exposes the operations plugins
//! build on. Surface commits are dispatched through the hook table so a
//! plugin can wrap the default handlers.
//!
//! Everything runs on one thread. Callbacks and hooks receive `&mut
//! Compositor` and may call any public operation, including ones that emit
//! further events.

use log::{debug, info, trace, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::WinwrapConfig;
use crate::decoration;
use crate::effects::EffectsEngine;
use crate::geometry::{Rectangle, Vector2D};
use crate::input::InputManager;
use crate::output::{Output, OutputId};
use crate::plugin::config_values::ConfigValueStore;
use crate::plugin::events::{Event, EventBus};
use crate::plugin::hooks::{FunctionAddress, HookTable, Original, Symbol};
use crate::plugin::rules::{RuleEffect, RuleStore, WindowRule};
use crate::plugin::{LoadedPlugin, Notification};
use crate::renderer::damage::DamageTracker;
use crate::renderer::window_stack::WindowStack;
use crate::renderer::{PaintOptions, PaintRecord, RenderStage, RenderState};
use crate::window::layout::LayoutManager;
use crate::window::{Buffer, Subsurface, Window, WindowHandle, WindowId};
use crate::workspace::{WorkspaceId, WorkspaceManager};

/// Gap between tiled windows
const TILING_GAP: f64 = 8.0;

/// Where published functions start in the symbol table
const SYMBOL_BASE: usize = 0x0040_1000;

/// Main compositor struct that orchestrates all subsystems
pub struct Compositor {
    pub(crate) config: WinwrapConfig,
    api_version: String,

    outputs: Vec<Output>,
    windows: Vec<WindowHandle>,
    subsurfaces: Vec<Rc<Subsurface>>,

    // Core subsystems
    workspaces: WorkspaceManager,
    layout: LayoutManager,
    stack: WindowStack,
    input: InputManager,
    effects: EffectsEngine,
    damage: DamageTracker,
    render: RenderState,

    // Plugin state
    pub(crate) events: EventBus,
    pub(crate) hooks: HookTable,
    pub(crate) config_values: ConfigValueStore,
    pub(crate) rules: RuleStore,
    pub(crate) notifications: Vec<Notification>,
    pub(crate) plugins: Vec<LoadedPlugin>,
    pub(crate) next_plugin_handle: u64,

    next_output_id: u64,
    next_window_id: u64,
    next_subsurface_id: u64,
}

impl Compositor {
    /// Create a compositor with the outputs and rules from `config`
    pub fn new(config: WinwrapConfig) -> Self {
        let api_version = config
            .general
            .api_version
            .clone()
            .unwrap_or_else(|| crate::API_HASH.to_string());
        info!("🏗️ Initializing compositor (API {})", api_version);

        let mut compositor = Self {
            effects: EffectsEngine::new(&config.effects),
            config,
            api_version,
            outputs: Vec::new(),
            windows: Vec::new(),
            subsurfaces: Vec::new(),
            workspaces: WorkspaceManager::new(),
            layout: LayoutManager::new(TILING_GAP),
            stack: WindowStack::new(),
            input: InputManager::new(),
            damage: DamageTracker::new(),
            render: RenderState::default(),
            events: EventBus::default(),
            hooks: HookTable::new(published_symbols()),
            config_values: ConfigValueStore::default(),
            rules: RuleStore::default(),
            notifications: Vec::new(),
            plugins: Vec::new(),
            next_plugin_handle: 0,
            next_output_id: 0,
            next_window_id: 0,
            next_subsurface_id: 0,
        };

        for output in compositor.config.outputs.clone() {
            compositor.add_output(
                output.name,
                Vector2D::new(output.position[0], output.position[1]),
                Vector2D::new(output.size[0], output.size[1]),
            );
        }
        compositor.install_config_rules();

        compositor
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn config(&self) -> &WinwrapConfig {
        &self.config
    }

    pub fn now(&self) -> Instant {
        Instant::now()
    }

    /// Replace the config, reinstall rules and notify plugins
    pub fn reload_config(&mut self, config: WinwrapConfig) {
        info!("🔄 Reloading configuration");
        self.effects.update_config(&config.effects);
        self.config_values.apply_config(&config);
        self.config = config;

        self.rules.clear();
        self.install_config_rules();

        for window in self.windows.clone() {
            self.update_window_decoration_values(&window);
        }

        self.emit(Event::ConfigReloaded);
    }

    fn install_config_rules(&mut self) {
        for value in &self.config.window_rules {
            match WindowRule::parse(value) {
                Ok(rule) => self.rules.add(rule),
                Err(err) => warn!("Ignoring window rule {:?}: {:#}", value, err),
            }
        }
    }

    pub fn window_rules(&self) -> &RuleStore {
        &self.rules
    }

    pub(crate) fn emit(&mut self, event: Event) {
        for callback in self.events.listeners(event.kind()) {
            callback(self, &event);
        }
    }

    // Outputs

    /// Connect an output; it gets a fresh workspace
    pub fn add_output(&mut self, name: impl Into<String>, position: Vector2D, size: Vector2D) -> OutputId {
        self.next_output_id += 1;
        let id = OutputId(self.next_output_id);
        let workspace = self.workspaces.create(id);
        let output = Output::new(id, name.into(), position, size, workspace);

        info!(
            "🖥️ Output {} ({}) at ({}, {}) size {}x{}",
            output.name, id, position.x, position.y, size.x, size.y
        );

        self.outputs.push(output);
        self.effects.blur.add_output(id);
        self.damage.add_full(id);
        id
    }

    /// Disconnect an output, moving its windows to the first remaining one
    pub fn remove_output(&mut self, id: OutputId) -> bool {
        let Some(index) = self.outputs.iter().position(|o| o.id == id) else {
            return false;
        };

        let removed = self.outputs.remove(index);
        self.effects.blur.remove_output(id);
        self.damage.take(id);
        let workspaces = self.workspaces.remove_output(id);
        info!("🖥️ Output {} ({}) disconnected", removed.name, id);

        let fallback = self.outputs.first().map(|o| o.active_workspace);
        for window in self.windows.clone() {
            let (window_id, orphaned) = {
                let w = window.borrow();
                (w.id, w.output == Some(id) || w.workspace.map_or(false, |ws| workspaces.contains(&ws)))
            };
            if !orphaned {
                continue;
            }

            let tiled = self.layout.remove(window_id).is_some();
            match fallback {
                Some(target) => {
                    if tiled {
                        self.layout.add_tiled(target, window_id);
                    }
                    self.move_window_to_workspace(&window, target);
                }
                None => {
                    let mut w = window.borrow_mut();
                    w.output = None;
                    w.workspace = None;
                }
            }
        }

        self.refocus();
        true
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn output(&self, id: OutputId) -> Option<&Output> {
        self.outputs.iter().find(|o| o.id == id)
    }

    pub fn output_at(&self, point: Vector2D) -> Option<&Output> {
        self.outputs.iter().find(|o| o.geometry().contains_point(point))
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    /// Whether `workspace` is shown on any output
    pub fn is_workspace_visible(&self, workspace: WorkspaceId) -> bool {
        self.outputs.iter().any(|o| o.active_workspace == workspace)
    }

    // Windows

    /// Map a new client window.
    ///
    /// Window rules are applied before `openWindow` fires, so listeners see
    /// the window as the rules left it.
    pub fn open_window(&mut self, class: &str, title: &str) -> WindowHandle {
        self.next_window_id += 1;
        let id = WindowId(self.next_window_id);
        let animation = Duration::from_millis(u64::from(self.config.general.animation_duration));

        let mut window = Window::new(id, class, title, animation);
        window.mapped = true;

        let target = self
            .output_at(self.input.pointer)
            .or_else(|| self.outputs.first())
            .map(|o| (o.id, o.active_workspace, o.geometry()));

        if let Some((output, workspace, _)) = target {
            window.output = Some(output);
            window.workspace = Some(workspace);
            self.workspaces.assign_window(id, workspace);
        }

        self.apply_window_rules(&mut window, target.map(|(_, _, geometry)| geometry));

        debug!(
            "🪟 Opened {} class={} floating={} on {:?}",
            id, window.class, window.floating, window.output
        );

        let floating = window.floating;
        let workspace = window.workspace;
        let handle = Rc::new(RefCell::new(window));
        self.windows.push(Rc::clone(&handle));
        self.stack.push(id);

        if let (false, Some(workspace)) = (floating, workspace) {
            self.layout.add_tiled(workspace, id);
            self.relayout(workspace);
        }
        self.update_window_decoration_values(&handle);

        self.emit(Event::OpenWindow(Rc::clone(&handle)));

        if handle.borrow().is_visible_to_pipeline() {
            self.focus_window(Some(id));
        }

        handle
    }

    fn apply_window_rules(&self, window: &mut Window, output: Option<Rectangle>) {
        for effect in self.rules.matching(&window.initial_class) {
            match effect {
                RuleEffect::Float => window.floating = true,
                RuleEffect::Tile => window.floating = false,
                RuleEffect::Pin => window.pinned = true,
                RuleEffect::Size(..) => {
                    if let Some(size) = output.and_then(|o| effect.resolve_size(o.size)) {
                        window.size = size;
                        window.real_size.set_value_and_warp(size);
                    }
                }
            }
        }

        // Floating windows start centred on their output
        if let (true, Some(output)) = (window.floating, output) {
            let position = output.origin + (output.size - window.size) / 2.0;
            window.position = position;
            window.real_position.set_value_and_warp(position);
        }
    }

    /// Destroy a window. `closeWindow` fires while it is still registered.
    pub fn close_window(&mut self, window: &WindowHandle) {
        let Some(index) = self.windows.iter().position(|w| Rc::ptr_eq(w, window)) else {
            warn!("close_window called for an unknown window");
            return;
        };

        self.emit(Event::CloseWindow(Rc::clone(window)));

        let handle = self.windows.remove(index);
        let (id, geometry, visible) = {
            let mut w = handle.borrow_mut();
            let visible = w.is_visible_to_pipeline();
            w.mapped = false;
            (w.id, w.goal_geometry(), visible)
        };

        self.stack.remove(id);
        if let Some(workspace) = self.layout.remove(id) {
            self.relayout(workspace);
        }
        self.workspaces.remove_window(id);
        self.input.forget(id);
        self.subsurfaces
            .retain(|s| s.window().map_or(false, |parent| !Rc::ptr_eq(&parent, &handle)));

        if visible {
            self.damage_region(geometry);
        }

        debug!("🪟 Closed {}", id);
        self.refocus();
    }

    pub fn windows(&self) -> &[WindowHandle] {
        &self.windows
    }

    pub fn find_window(&self, id: WindowId) -> Option<&WindowHandle> {
        self.windows.iter().find(|w| w.borrow().id == id)
    }

    pub fn is_tiled(&self, id: WindowId) -> bool {
        self.layout.is_tiled(id)
    }

    /// Toggle between floating and tiled
    pub fn change_window_floating_mode(&mut self, window: &WindowHandle) {
        let (id, floating, workspace) = {
            let mut w = window.borrow_mut();
            w.floating = !w.floating;
            (w.id, w.floating, w.workspace)
        };
        debug!("{} is now {}", id, if floating { "floating" } else { "tiled" });

        if floating {
            if let Some(workspace) = self.layout.remove(id) {
                self.relayout(workspace);
            }
        } else if let Some(workspace) = workspace {
            self.layout.add_tiled(workspace, id);
            self.relayout(workspace);
        }
    }

    /// Move a window onto `workspace` (and therefore its output)
    pub fn move_window_to_workspace(&mut self, window: &WindowHandle, workspace: WorkspaceId) -> bool {
        let id = window.borrow().id;
        let Some(output) = self.workspaces.assign_window(id, workspace) else {
            warn!("Cannot move {} to unknown {}", id, workspace);
            return false;
        };

        {
            let mut w = window.borrow_mut();
            w.workspace = Some(workspace);
            w.output = Some(output);
        }

        if let Some(previous) = self.layout.remove(id) {
            self.relayout(previous);
            self.layout.add_tiled(workspace, id);
            self.relayout(workspace);
        }

        trace!("Moved {} to {} on {}", id, workspace, output);
        true
    }

    /// Ask the client to resize. Without `force`, an unchanged size is not resent.
    pub fn set_window_size(&mut self, window: &WindowHandle, size: Vector2D, force: bool) {
        let mut w = window.borrow_mut();
        if !force && w.surface.requested_size == Some(size) {
            return;
        }

        w.surface.requested_size = Some(size);
        w.surface.configure_serial += 1;
        debug!(
            "Configure {} to {}x{} (serial {})",
            w.id, size.x, size.y, w.surface.configure_serial
        );
    }

    pub fn update_window_decoration_values(&mut self, window: &WindowHandle) {
        let focused = self.input.focused() == Some(window.borrow().id);
        let values = decoration::compute(&self.config.window, &window.borrow(), focused);
        window.borrow_mut().decoration = values;
    }

    fn relayout(&mut self, workspace: WorkspaceId) {
        let Some(bounds) = self
            .outputs
            .iter()
            .find(|o| o.active_workspace == workspace)
            .map(Output::geometry)
        else {
            return;
        };

        for (id, rect) in self.layout.calculate_layout(workspace, bounds) {
            if let Some(window) = self.find_window(id) {
                let mut w = window.borrow_mut();
                w.position = rect.origin;
                w.size = rect.size;
                w.real_position.set_goal(rect.origin);
                w.real_size.set_goal(rect.size);
            }
        }
    }

    // Focus

    pub fn focused_window(&self) -> Option<WindowId> {
        self.input.focused()
    }

    pub fn pointer(&self) -> Vector2D {
        self.input.pointer
    }

    /// Move the pointer and let focus follow it
    pub fn pointer_motion(&mut self, position: Vector2D) {
        self.input.pointer = position;
        self.refocus();
    }

    fn is_focusable(&self, window: &Window) -> bool {
        window.is_visible_to_pipeline()
            && (window.pinned || window.workspace.map_or(false, |ws| self.is_workspace_visible(ws)))
    }

    /// Re-evaluate keyboard focus: the top-most focusable window under the
    /// pointer, else the most recently focused one that is still focusable
    pub fn refocus(&mut self) {
        let pointer = self.input.pointer;
        let under_pointer = self.stack.render_order().iter().rev().copied().find(|&id| {
            self.find_window(id).map_or(false, |window| {
                let w = window.borrow();
                self.is_focusable(&w) && w.goal_geometry().contains_point(pointer)
            })
        });

        let next = under_pointer.or_else(|| {
            self.input.last_focused(|id| {
                self.find_window(id)
                    .map_or(false, |window| self.is_focusable(&window.borrow()))
            })
        });

        self.focus_window(next);
    }

    fn focus_window(&mut self, next: Option<WindowId>) {
        let previous = self.input.focused();
        if previous == next {
            return;
        }

        self.input.set_focus(next);
        if let Some(id) = next {
            self.stack.raise_to_top(id);
        }
        for id in [previous, next].into_iter().flatten() {
            if let Some(window) = self.find_window(id).cloned() {
                self.update_window_decoration_values(&window);
            }
        }
    }

    // Surfaces

    /// Client side: attach a buffer to be applied on the next commit
    pub fn attach_buffer(&mut self, window: &WindowHandle, buffer: Buffer) {
        window.borrow_mut().surface.attach(buffer);
    }

    /// Client side: commit the window surface
    pub fn commit_window(&mut self, window: &WindowHandle) {
        match self.hooks.window_commit() {
            Some(hook) => hook(self, window, listener_commit_window),
            None => listener_commit_window(self, window),
        }
    }

    pub fn create_subsurface(&mut self, window: &WindowHandle) -> Rc<Subsurface> {
        self.next_subsurface_id += 1;
        let subsurface = Rc::new(Subsurface::new(self.next_subsurface_id, Rc::downgrade(window)));
        self.subsurfaces.push(Rc::clone(&subsurface));
        subsurface
    }

    /// Client side: commit a subsurface
    pub fn commit_subsurface(&mut self, subsurface: &Subsurface) {
        match self.hooks.subsurface_commit() {
            Some(hook) => hook(self, subsurface, subsurface_on_commit),
            None => subsurface_on_commit(self, subsurface),
        }
    }

    /// Withdraw a published function so lookups no longer find it
    pub fn unpublish_function(&mut self, name: &str) -> usize {
        self.hooks.unpublish(name)
    }

    // Damage and effects

    fn damage_region(&mut self, region: Rectangle) {
        for output in &self.outputs {
            if let Some(clip) = region.intersection(&output.geometry()) {
                self.damage.add(output.id, clip);
            }
        }
    }

    pub fn damage(&self) -> &DamageTracker {
        &self.damage
    }

    pub fn effects(&self) -> &EffectsEngine {
        &self.effects
    }

    pub fn mark_blur_dirty_for_output(&mut self, output: OutputId) {
        self.effects.blur.mark_dirty(output);
    }

    // Rendering

    /// Output whose frame is being rendered right now
    pub fn current_render_output(&self) -> Option<OutputId> {
        self.render.output
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render
    }

    pub fn take_paints(&mut self) -> Vec<PaintRecord> {
        self.render.drain()
    }

    /// Paint one window onto `output` right now.
    ///
    /// Windows hidden from the pipeline are never painted, and nothing is
    /// painted outside the output.
    pub fn render_window(&mut self, window: &WindowHandle, output: OutputId, now: Instant, options: PaintOptions) {
        let record = {
            let w = window.borrow();
            if !w.is_visible_to_pipeline() {
                trace!("Not painting hidden {}", w.id);
                return;
            }

            let Some(output_geometry) = self.output(output).map(Output::geometry) else {
                return;
            };
            let Some(clip) = w.goal_geometry().intersection(&output_geometry) else {
                return;
            };

            PaintRecord {
                frame: self.render.frame,
                output,
                window: w.id,
                stage: self.render.stage,
                options,
                clip,
                buffer: w.surface.current.map(|b| b.serial),
                time: now,
            }
        };

        self.render.record(record);
    }

    /// Render one frame of `output`
    pub fn render_output(&mut self, output: OutputId) -> bool {
        let Some(active_workspace) = self.output(output).map(|o| o.active_workspace) else {
            return false;
        };

        let now = self.now();
        for window in &self.windows {
            let mut w = window.borrow_mut();
            w.real_position.tick(now);
            w.real_size.tick(now);
        }

        self.render.begin_frame(output);
        self.emit(Event::Render(RenderStage::Begin));

        let blur_enabled = self.effects.config().blur.enabled;
        self.effects.blur.refresh(output, blur_enabled);

        self.render.stage = Some(RenderStage::PreWindows);
        self.emit(Event::Render(RenderStage::PreWindows));

        let order: Vec<WindowId> = self.stack.render_order().to_vec();
        for id in order {
            let Some(window) = self.find_window(id).cloned() else {
                continue;
            };
            let eligible = {
                let w = window.borrow();
                w.is_visible_to_pipeline() && (w.pinned || w.workspace == Some(active_workspace))
            };
            if eligible {
                self.render_window(&window, output, now, PaintOptions::normal());
            }
        }

        self.render.stage = Some(RenderStage::PostWindows);
        self.emit(Event::Render(RenderStage::PostWindows));

        self.render.stage = Some(RenderStage::LastMoment);
        self.emit(Event::Render(RenderStage::LastMoment));

        self.damage.take(output);
        self.render.end_frame();
        true
    }

    /// Render one frame on every output
    pub fn render_frame(&mut self) {
        let outputs: Vec<OutputId> = self.outputs.iter().map(|o| o.id).collect();
        for output in outputs {
            self.render_output(output);
        }
    }
}

/// Default handler for top-level surface commits.
///
/// Commits of windows hidden from the pipeline are dropped: the pending
/// buffer stays pending and nothing is damaged.
pub fn listener_commit_window(compositor: &mut Compositor, window: &WindowHandle) {
    let (id, visible, geometry) = {
        let w = window.borrow();
        (w.id, w.is_visible_to_pipeline(), w.goal_geometry())
    };

    if !visible {
        trace!("Dropping commit of hidden {}", id);
        return;
    }

    if window.borrow_mut().surface.apply_pending() {
        compositor.damage_region(geometry);
    }
}

/// Default handler for subsurface commits; same visibility rules as the parent
pub fn subsurface_on_commit(compositor: &mut Compositor, subsurface: &Subsurface) {
    let Some(window) = subsurface.window() else {
        subsurface.surface.borrow_mut().apply_pending();
        return;
    };

    let (id, visible, geometry) = {
        let w = window.borrow();
        (w.id, w.is_visible_to_pipeline(), w.goal_geometry())
    };

    if !visible {
        trace!("Dropping subsurface commit of hidden {}", id);
        return;
    }

    if subsurface.surface.borrow_mut().apply_pending() {
        compositor.damage_region(geometry);
    }
}

fn published_symbols() -> Vec<Symbol> {
    let functions: [(&str, &str, Option<Original>); 4] = [
        ("on_commit", "winwrap::compositor::Popup::on_commit", None),
        (
            "on_commit",
            "winwrap::window::Subsurface::on_commit",
            Some(Original::SubsurfaceCommit(subsurface_on_commit)),
        ),
        ("on_commit", "winwrap::compositor::LayerSurface::on_commit", None),
        (
            "listener_commit_window",
            "winwrap::compositor::listener_commit_window",
            Some(Original::WindowCommit(listener_commit_window)),
        ),
    ];

    functions
        .into_iter()
        .enumerate()
        .map(|(i, (name, demangled, original))| Symbol {
            name: name.to_string(),
            demangled: demangled.to_string(),
            address: FunctionAddress(SYMBOL_BASE + i * 0x40),
            original,
        })
        .collect()
}
