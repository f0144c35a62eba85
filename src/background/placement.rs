//! Window classification and placement
//!
//! A new window whose initial class equals the configured class becomes a
//! background window: floating, pinned, stretched over every output, moved
//! onto every output's active workspace, and hidden from the normal pipeline.
//! Placement happens once; later output changes do not re-place the window.

use log::{debug, info};
use std::cell::RefCell;

use crate::background::BackgroundRegistry;
use crate::compositor::Compositor;
use crate::geometry::bounding_box;
use crate::window::WindowHandle;
use crate::workspace::WorkspaceId;

/// Classify `window` and place it if it matches `class`.
/// Returns whether it was registered.
pub fn on_new_window(
    compositor: &mut Compositor,
    registry: &RefCell<BackgroundRegistry>,
    window: &WindowHandle,
    class: &str,
) -> bool {
    if window.borrow().initial_class != class {
        return false;
    }

    let Some(bbox) = bounding_box(compositor.outputs()) else {
        debug!("No outputs, not placing {}", window.borrow().id);
        return false;
    };

    if !window.borrow().floating {
        compositor.change_window_floating_mode(window);
    }

    {
        let mut w = window.borrow_mut();
        w.real_size.set_value_and_warp(bbox.size);
        w.real_position.set_value_and_warp(bbox.origin);
        w.size = bbox.size;
        w.position = bbox.origin;
        w.pinned = true;
    }

    let workspaces: Vec<WorkspaceId> = compositor.outputs().iter().map(|o| o.active_workspace).collect();
    for workspace in workspaces {
        compositor.move_window_to_workspace(window, workspace);
    }

    compositor.set_window_size(window, bbox.size, true);
    compositor.update_window_decoration_values(window);

    registry.borrow_mut().register(window);
    window.borrow_mut().hidden = true;

    compositor.refocus();

    let w = window.borrow();
    debug!(
        "{} goal size {}x{} at ({}, {})",
        w.id, bbox.size.x, bbox.size.y, bbox.origin.x, bbox.origin.y
    );
    info!("🖼️ Moved {} ({}) to the background layer", w.id, w.class);
    true
}
