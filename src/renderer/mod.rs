//! Headless rendering pipeline
//!
//! No pixels are produced here. Each paint is recorded as a [`PaintRecord`]
//! so the frame can be inspected afterwards, which is all the compositor
//! model needs to reason about what would have reached the screen.

pub mod damage;
pub mod window_stack;

use std::time::Instant;

use crate::geometry::Rectangle;
use crate::output::OutputId;
use crate::window::WindowId;

/// Named points within a single frame of one output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStage {
    /// Frame started, nothing drawn yet
    Begin,
    /// Layer surfaces below windows are drawn, ordinary windows are not
    PreWindows,
    /// Ordinary windows are drawn
    PostWindows,
    /// Right before the frame is submitted
    LastMoment,
}

/// Which parts of a window tree to paint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// Main surface and popups
    All,
    /// Main surface only
    Main,
    /// Popups only
    Popup,
}

/// Flags passed to the window paint routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintOptions {
    pub pass: RenderPass,
    /// Draw borders and shadows
    pub decorate: bool,
    /// Allow the window to be left out of screen captures
    pub capture_exclusion: bool,
    /// Paint at the window's own geometry, ignoring stacking and workspace offsets
    pub background: bool,
}

impl PaintOptions {
    /// Options used for ordinary windows in the stacking pass
    pub fn normal() -> Self {
        Self {
            pass: RenderPass::All,
            decorate: true,
            capture_exclusion: true,
            background: false,
        }
    }

    /// Options used for the background layer
    pub fn background_layer() -> Self {
        Self {
            pass: RenderPass::All,
            decorate: false,
            capture_exclusion: false,
            background: true,
        }
    }
}

/// One window paint as it would have been submitted to the GPU
#[derive(Debug, Clone, PartialEq)]
pub struct PaintRecord {
    pub frame: u64,
    pub output: OutputId,
    pub window: WindowId,
    /// Stage that was active when the paint happened, if any
    pub stage: Option<RenderStage>,
    pub options: PaintOptions,
    /// Part of the window geometry that lands on the output
    pub clip: Rectangle,
    /// Serial of the buffer that was sampled
    pub buffer: Option<u64>,
    pub time: Instant,
}

/// Per-frame render bookkeeping
#[derive(Debug, Default)]
pub struct RenderState {
    /// Output currently being rendered
    pub output: Option<OutputId>,
    pub stage: Option<RenderStage>,
    pub frame: u64,
    paints: Vec<PaintRecord>,
}

impl RenderState {
    pub fn begin_frame(&mut self, output: OutputId) {
        self.frame += 1;
        self.output = Some(output);
        self.stage = Some(RenderStage::Begin);
    }

    pub fn end_frame(&mut self) {
        self.output = None;
        self.stage = None;
    }

    pub fn record(&mut self, paint: PaintRecord) {
        self.paints.push(paint);
    }

    /// Every paint recorded since the last [`RenderState::drain`]
    pub fn paints(&self) -> &[PaintRecord] {
        &self.paints
    }

    pub fn drain(&mut self) -> Vec<PaintRecord> {
        std::mem::take(&mut self.paints)
    }
}
