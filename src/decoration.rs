//! Cached per-window decoration values
//!
//! Border width, corner rounding and opacity depend on focus, on the window
//! config and (for rounding) on the window size. They are recomputed whenever
//! one of those inputs changes rather than on every frame.

use log::trace;

use crate::config::WindowConfig;
use crate::window::Window;

/// Values the renderer needs to decorate a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationValues {
    pub border_size: u32,
    pub rounding: f64,
    pub alpha: f32,
    pub border_color: [f32; 4],
}

impl Default for DecorationValues {
    fn default() -> Self {
        Self {
            border_size: 0,
            rounding: 0.0,
            alpha: 1.0,
            border_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Parse a `#RRGGBB` or `#RRGGBBAA` colour
pub fn parse_color(hex: &str) -> Option<[f32; 4]> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok().map(|v| v as f32 / 255.0);

    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// Recompute the decoration values of `window`.
///
/// Rounding is clamped to half of the smaller window dimension so tiny
/// windows don't turn into ellipses.
pub fn compute(config: &WindowConfig, window: &Window, focused: bool) -> DecorationValues {
    let size = window.real_size.goal();
    let max_rounding = (size.x.min(size.y) / 2.0).max(0.0);

    let (alpha, color) = if focused {
        (config.active_opacity, &config.active_border_color)
    } else {
        (config.inactive_opacity, &config.inactive_border_color)
    };

    let values = DecorationValues {
        border_size: config.border_width,
        rounding: (config.rounding as f64).min(max_rounding),
        alpha,
        border_color: parse_color(color).unwrap_or([0.0, 0.0, 0.0, 1.0]),
    };

    trace!("Decoration values for {}: {:?}", window.id, values);
    values
}
