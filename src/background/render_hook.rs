//! Background painting
//!
//! Right before ordinary windows are drawn on an output, each registered
//! window assigned to that output is painted with the compositor's own window
//! routine. The window is revealed only for the paint call.

use log::trace;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::background::interceptors::HiddenGuard;
use crate::background::BackgroundRegistry;
use crate::compositor::Compositor;
use crate::output::OutputId;
use crate::renderer::{PaintOptions, RenderStage};
use crate::window::WindowHandle;

/// Handle a render stage; returns the number of windows painted
pub fn on_render_stage(compositor: &mut Compositor, registry: &RefCell<BackgroundRegistry>, stage: RenderStage) -> usize {
    paint_layer(compositor, registry, stage, |c, window, output, now| {
        c.render_window(window, output, now, PaintOptions::background_layer());
    })
}

fn paint_layer<F>(compositor: &mut Compositor, registry: &RefCell<BackgroundRegistry>, stage: RenderStage, mut paint: F) -> usize
where
    F: FnMut(&mut Compositor, &WindowHandle, OutputId, Instant),
{
    if stage != RenderStage::PreWindows {
        return 0;
    }

    let Some(output) = compositor.current_render_output() else {
        return 0;
    };

    let mut targets: Vec<WindowHandle> = Vec::new();
    registry.borrow().for_each_live(|window| {
        if window.borrow().output == Some(output) {
            targets.push(Rc::clone(window));
        }
    });

    let now = compositor.now();
    for window in &targets {
        let _revealed = HiddenGuard::reveal(window);
        paint(compositor, window, output, now);
    }

    if !targets.is_empty() {
        trace!("Painted {} background windows on {}", targets.len(), output);
    }
    targets.len()
}
