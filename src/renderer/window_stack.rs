//! Window Z-ordering stack management
//!
//! Windows are ordered from bottom to top, with the last window in the stack
//! being the top-most visible window.

use std::collections::HashMap;

use crate::window::WindowId;

/// Manages the Z-ordering of windows in the compositor.
///
/// # Examples
///
/// ```
/// use winwrap::renderer::window_stack::WindowStack;
/// use winwrap::window::WindowId;
///
/// let mut stack = WindowStack::new();
/// stack.push(WindowId(1));
/// stack.push(WindowId(2));
///
/// assert_eq!(stack.top(), Some(WindowId(2)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct WindowStack {
    /// Windows ordered from bottom to top
    windows: Vec<WindowId>,

    /// Fast lookup: window ID → position in stack
    positions: HashMap<WindowId, usize>,
}

impl WindowStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a window to the top of the stack.
    ///
    /// Returns `false` if the window was already present.
    pub fn push(&mut self, window_id: WindowId) -> bool {
        if self.positions.contains_key(&window_id) {
            return false;
        }

        self.positions.insert(window_id, self.windows.len());
        self.windows.push(window_id);
        true
    }

    /// Removes a window, returning its previous position
    pub fn remove(&mut self, window_id: WindowId) -> Option<usize> {
        let pos = self.positions.remove(&window_id)?;
        self.windows.remove(pos);
        self.rebuild_positions();
        Some(pos)
    }

    /// Raises a window to the top of the stack
    pub fn raise_to_top(&mut self, window_id: WindowId) -> bool {
        if self.remove(window_id).is_some() {
            self.push(window_id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, window_id: WindowId) -> bool {
        self.positions.contains_key(&window_id)
    }

    pub fn top(&self) -> Option<WindowId> {
        self.windows.last().copied()
    }

    /// Windows in paint order (bottom first)
    pub fn render_order(&self) -> &[WindowId] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    fn rebuild_positions(&mut self) {
        self.positions.clear();
        for (i, &id) in self.windows.iter().enumerate() {
            self.positions.insert(id, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_top() {
        let mut stack = WindowStack::new();
        assert!(stack.push(WindowId(1)));
        assert!(stack.push(WindowId(2)));
        assert!(!stack.push(WindowId(1)));

        assert_eq!(stack.top(), Some(WindowId(2)));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_remove_window() {
        let mut stack = WindowStack::new();
        stack.push(WindowId(1));
        stack.push(WindowId(2));
        stack.push(WindowId(3));

        assert_eq!(stack.remove(WindowId(2)), Some(1));
        assert_eq!(stack.remove(WindowId(2)), None);
        assert_eq!(stack.render_order(), &[WindowId(1), WindowId(3)]);
    }

    #[test]
    fn test_raise_to_top() {
        let mut stack = WindowStack::new();
        stack.push(WindowId(1));
        stack.push(WindowId(2));
        stack.push(WindowId(3));

        assert!(stack.raise_to_top(WindowId(1)));
        assert_eq!(stack.render_order(), &[WindowId(2), WindowId(3), WindowId(1)]);
        assert!(!stack.raise_to_top(WindowId(99)));
    }

    #[test]
    fn test_positions_stay_consistent() {
        let mut stack = WindowStack::new();
        for id in 1..=5 {
            stack.push(WindowId(id));
        }
        stack.remove(WindowId(3));
        stack.raise_to_top(WindowId(1));

        for (i, &id) in stack.render_order().iter().enumerate() {
            assert_eq!(stack.positions.get(&id), Some(&i));
        }
        assert!(!stack.contains(WindowId(3)));
    }
}
