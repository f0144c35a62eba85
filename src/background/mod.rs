//! Background window layer
//!
//! Windows of one configured class are turned into a desktop background:
//! stretched over every output, pinned to every workspace and hidden from
//! the normal render, damage and focus pipeline. They are painted once per
//! frame right before ordinary windows, and their commits are let through by
//! hooking the compositor's commit handlers.
//!
//! - [`registry`] keeps weak references to background windows
//! - [`placement`] classifies and reshapes new windows
//! - [`interceptors`] wrap the commit handlers
//! - [`render_hook`] paints the layer
//! - [`lifecycle`] installs all of the above as a [`Plugin`](crate::plugin::Plugin)

pub mod interceptors;
pub mod lifecycle;
pub mod placement;
pub mod registry;
pub mod render_hook;

use std::cell::RefCell;
use std::rc::Rc;

pub use interceptors::HiddenGuard;
pub use lifecycle::WinwrapPlugin;
pub use registry::BackgroundRegistry;

/// Config value naming the background class
pub const CLASS_OPTION: &str = "plugin:winwrap:class";

pub const DEFAULT_CLASS: &str = "kitty-bg";

/// Registry shared by the plugin's callbacks and hooks
pub type SharedRegistry = Rc<RefCell<BackgroundRegistry>>;
