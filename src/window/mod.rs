//! Window model
//!
//! Windows are owned by the compositor as [`WindowHandle`]s. Other subsystems
//! may keep [`WeakWindow`] references, which expire as soon as the compositor
//! drops the window on close.
//!
//! Geometry comes in two flavours: the *real* position/size are animated
//! variables used for rendering, while the logical position/size are what the
//! layout and rules reason about.

pub mod layout;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use crate::decoration::DecorationValues;
use crate::geometry::{Rectangle, Vector2D};
use crate::output::OutputId;
use crate::workspace::WorkspaceId;

/// Shared, compositor-owned window
pub type WindowHandle = Rc<RefCell<Window>>;

/// Non-owning window reference; `upgrade()` fails once the window is gone
pub type WeakWindow = Weak<RefCell<Window>>;

/// Stable identity of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// A value that is either set instantly ("warped") or animated towards a goal
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedVariable {
    value: Vector2D,
    begun: Vector2D,
    goal: Vector2D,
    started_at: Option<Instant>,
    duration: Duration,
}

impl AnimatedVariable {
    pub fn new(initial: Vector2D, duration: Duration) -> Self {
        Self {
            value: initial,
            begun: initial,
            goal: initial,
            started_at: None,
            duration,
        }
    }

    /// Current (possibly mid-animation) value
    pub fn value(&self) -> Vector2D {
        self.value
    }

    pub fn goal(&self) -> Vector2D {
        self.goal
    }

    pub fn is_animating(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start animating towards `goal` from the current value
    pub fn set_goal(&mut self, goal: Vector2D) {
        if goal == self.goal && !self.is_animating() {
            return;
        }
        self.begun = self.value;
        self.goal = goal;
        self.started_at = Some(Instant::now());
    }

    /// Jump to `goal` with no animation
    pub fn set_value_and_warp(&mut self, goal: Vector2D) {
        self.goal = goal;
        self.warp();
    }

    /// Finish any running animation immediately
    pub fn warp(&mut self) {
        self.value = self.goal;
        self.begun = self.goal;
        self.started_at = None;
    }

    /// Advance the animation with linear interpolation
    pub fn tick(&mut self, now: Instant) {
        let Some(start) = self.started_at else {
            return;
        };

        let elapsed = now.saturating_duration_since(start);
        if self.duration.is_zero() || elapsed >= self.duration {
            self.warp();
            return;
        }

        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.value = self.begun + (self.goal - self.begun) * t;
    }
}

/// Client buffer contents as seen by the compositor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Buffer {
    /// Client-chosen serial so tests can tell buffers apart
    pub serial: u64,
    pub size: Vector2D,
}

/// Double-buffered surface state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceState {
    /// Attached but not yet committed
    pub pending: Option<Buffer>,
    /// Last committed buffer
    pub current: Option<Buffer>,
    /// Number of commits the compositor has applied
    pub applied_commits: u64,
    /// Size the compositor asked the client to use
    pub requested_size: Option<Vector2D>,
    pub configure_serial: u32,
}

impl SurfaceState {
    pub fn attach(&mut self, buffer: Buffer) {
        self.pending = Some(buffer);
    }

    /// Promote the pending buffer; returns whether anything changed
    pub fn apply_pending(&mut self) -> bool {
        self.applied_commits += 1;
        match self.pending.take() {
            Some(buffer) => {
                self.current = Some(buffer);
                true
            }
            None => false,
        }
    }
}

/// A client window
#[derive(Debug, Clone)]
pub struct Window {
    pub id: WindowId,

    /// Class the client announced when the window was created
    pub initial_class: String,
    pub class: String,
    pub title: String,

    pub mapped: bool,
    pub floating: bool,
    /// Shown on every workspace
    pub pinned: bool,
    /// Excluded from the normal render/damage/focus pipeline
    pub hidden: bool,

    pub real_position: AnimatedVariable,
    pub real_size: AnimatedVariable,
    pub position: Vector2D,
    pub size: Vector2D,

    pub output: Option<OutputId>,
    pub workspace: Option<WorkspaceId>,

    pub surface: SurfaceState,
    pub decoration: DecorationValues,
}

impl Window {
    pub fn new(id: WindowId, class: impl Into<String>, title: impl Into<String>, animation: Duration) -> Self {
        let class = class.into();
        let default_size = Vector2D::new(800.0, 600.0);
        let origin = Vector2D::new(0.0, 0.0);

        Self {
            id,
            initial_class: class.clone(),
            class,
            title: title.into(),
            mapped: false,
            floating: false,
            pinned: false,
            hidden: false,
            real_position: AnimatedVariable::new(origin, animation),
            real_size: AnimatedVariable::new(default_size, animation),
            position: origin,
            size: default_size,
            output: None,
            workspace: None,
            surface: SurfaceState::default(),
            decoration: DecorationValues::default(),
        }
    }

    /// Rendered geometry, taken from the animation goals
    pub fn goal_geometry(&self) -> Rectangle {
        Rectangle {
            origin: self.real_position.goal(),
            size: self.real_size.goal(),
        }
    }

    /// Whether the normal pipeline (render, damage, focus) should consider this window
    pub fn is_visible_to_pipeline(&self) -> bool {
        self.mapped && !self.hidden
    }
}

/// A child surface embedded in a window
#[derive(Debug)]
pub struct Subsurface {
    pub id: u64,
    window: WeakWindow,
    pub surface: RefCell<SurfaceState>,
}

impl Subsurface {
    pub fn new(id: u64, window: WeakWindow) -> Self {
        Self {
            id,
            window,
            surface: RefCell::new(SurfaceState::default()),
        }
    }

    /// The window this subsurface belongs to, if it is still alive
    pub fn window(&self) -> Option<WindowHandle> {
        self.window.upgrade()
    }
}
