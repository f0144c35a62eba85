//! Input focus tracking
//!
//! Keyboard focus follows the pointer: on every refocus the top-most window
//! under the cursor that the normal pipeline can see wins. When nothing is
//! under the cursor, the most recently focused visible window keeps focus.

use log::debug;
use std::collections::VecDeque;

use crate::geometry::Vector2D;
use crate::window::WindowId;

/// Number of previously focused windows remembered for fallback
const FOCUS_HISTORY_LEN: usize = 10;

#[derive(Debug)]
pub struct InputManager {
    /// Pointer location in layout coordinates
    pub pointer: Vector2D,
    keyboard_focus: Option<WindowId>,
    focus_history: VecDeque<WindowId>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            pointer: Vector2D::new(0.0, 0.0),
            keyboard_focus: None,
            focus_history: VecDeque::new(),
        }
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.keyboard_focus
    }

    /// Give keyboard focus to `window` (or nobody)
    pub fn set_focus(&mut self, window: Option<WindowId>) {
        if self.keyboard_focus == window {
            return;
        }

        debug!("Keyboard focus: {:?} -> {:?}", self.keyboard_focus, window);
        if let Some(id) = window {
            self.focus_history.retain(|&w| w != id);
            self.focus_history.push_back(id);
            while self.focus_history.len() > FOCUS_HISTORY_LEN {
                self.focus_history.pop_front();
            }
        }
        self.keyboard_focus = window;
    }

    /// Most recently focused window accepted by `eligible`
    pub fn last_focused<F>(&self, eligible: F) -> Option<WindowId>
    where
        F: Fn(WindowId) -> bool,
    {
        self.focus_history.iter().rev().copied().find(|&id| eligible(id))
    }

    /// Forget a window that went away
    pub fn forget(&mut self, window: WindowId) {
        self.focus_history.retain(|&w| w != window);
        if self.keyboard_focus == Some(window) {
            self.keyboard_focus = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_history_order() {
        let mut input = InputManager::new();
        input.set_focus(Some(WindowId(1)));
        input.set_focus(Some(WindowId(2)));
        input.set_focus(Some(WindowId(1)));

        assert_eq!(input.focused(), Some(WindowId(1)));
        assert_eq!(input.last_focused(|id| id != WindowId(1)), Some(WindowId(2)));
    }

    #[test]
    fn test_forget_clears_focus() {
        let mut input = InputManager::new();
        input.set_focus(Some(WindowId(5)));
        input.forget(WindowId(5));

        assert_eq!(input.focused(), None);
        assert_eq!(input.last_focused(|_| true), None);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut input = InputManager::new();
        for id in 0..(FOCUS_HISTORY_LEN as u64 + 5) {
            input.set_focus(Some(WindowId(id)));
        }
        assert_eq!(input.focus_history.len(), FOCUS_HISTORY_LEN);
        assert_eq!(input.last_focused(|id| id == WindowId(0)), None);
    }
}
