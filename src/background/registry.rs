//! Background window registry
//!
//! Holds weak references only. The compositor may drop a window at any time;
//! an expired entry counts as already removed and is skipped or swept.

use std::rc::Rc;

use crate::window::{WeakWindow, WindowHandle};

#[derive(Debug, Default)]
pub struct BackgroundRegistry {
    windows: Vec<WeakWindow>,
}

impl BackgroundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `window`; classification runs once per window so no de-duplication
    pub fn register(&mut self, window: &WindowHandle) {
        self.windows.push(Rc::downgrade(window));
    }

    /// Drop every entry that is expired or refers to `window`.
    /// Returns the number of entries removed.
    pub fn unregister_closed(&mut self, window: &WindowHandle) -> usize {
        let before = self.windows.len();
        self.windows.retain(|entry| entry.strong_count() > 0 && !refers_to(entry, window));
        before - self.windows.len()
    }

    pub fn is_registered(&self, window: &WindowHandle) -> bool {
        self.windows
            .iter()
            .any(|entry| entry.strong_count() > 0 && refers_to(entry, window))
    }

    /// Visit live entries in registration order
    pub fn for_each_live<F>(&self, mut visitor: F)
    where
        F: FnMut(&WindowHandle),
    {
        for window in self.windows.iter().filter_map(|entry| entry.upgrade()) {
            visitor(&window);
        }
    }

    /// Strong snapshot of the live entries
    pub fn live(&self) -> Vec<WindowHandle> {
        self.windows.iter().filter_map(|entry| entry.upgrade()).collect()
    }

    /// Number of entries, expired ones included
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn clear(&mut self) {
        self.windows.clear();
    }
}

fn refers_to(entry: &WeakWindow, window: &WindowHandle) -> bool {
    std::ptr::eq(entry.as_ptr(), Rc::as_ptr(window))
}
