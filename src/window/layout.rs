//! Tiling layout
//!
//! Tiled windows on a workspace share the output horizontally. Floating
//! windows keep whatever geometry they were given and are not tracked here.

use log::debug;
use std::collections::HashMap;

use crate::geometry::Rectangle;
use crate::window::WindowId;
use crate::workspace::WorkspaceId;

#[derive(Debug, Default)]
pub struct LayoutManager {
    /// Tiled windows per workspace, in tiling order
    tiled: HashMap<WorkspaceId, Vec<WindowId>>,
    gap: f64,
}

impl LayoutManager {
    pub fn new(gap: f64) -> Self {
        Self {
            tiled: HashMap::new(),
            gap,
        }
    }

    pub fn add_tiled(&mut self, workspace: WorkspaceId, window: WindowId) {
        let windows = self.tiled.entry(workspace).or_default();
        if !windows.contains(&window) {
            windows.push(window);
        }
    }

    /// Stop tiling `window`; returns the workspace it was tiled on
    pub fn remove(&mut self, window: WindowId) -> Option<WorkspaceId> {
        let mut found = None;
        for (workspace, windows) in self.tiled.iter_mut() {
            if let Some(pos) = windows.iter().position(|&id| id == window) {
                windows.remove(pos);
                found = Some(*workspace);
            }
        }
        found
    }

    pub fn is_tiled(&self, window: WindowId) -> bool {
        self.tiled.values().any(|windows| windows.contains(&window))
    }

    pub fn tiled_on(&self, workspace: WorkspaceId) -> &[WindowId] {
        self.tiled.get(&workspace).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Horizontal tiling of every tiled window of `workspace` inside `bounds`
    pub fn calculate_layout(&self, workspace: WorkspaceId, bounds: Rectangle) -> Vec<(WindowId, Rectangle)> {
        let windows = self.tiled_on(workspace);
        if windows.is_empty() {
            return Vec::new();
        }

        let gap = self.gap;
        let n = windows.len() as f64;
        let available_width = bounds.size.x - gap * (n + 1.0);
        let window_width = (available_width / n).max(1.0);
        let window_height = (bounds.size.y - 2.0 * gap).max(1.0);

        let layouts: Vec<(WindowId, Rectangle)> = windows
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let x = bounds.origin.x + gap + i as f64 * (window_width + gap);
                let y = bounds.origin.y + gap;
                (id, Rectangle::new(x, y, window_width, window_height))
            })
            .collect();

        debug!("Tiled {} windows on {}", layouts.len(), workspace);
        layouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_tiling() {
        let mut layout = LayoutManager::new(10.0);
        layout.add_tiled(WorkspaceId(1), WindowId(1));
        layout.add_tiled(WorkspaceId(1), WindowId(2));

        let result = layout.calculate_layout(WorkspaceId(1), Rectangle::new(0.0, 0.0, 1930.0, 1080.0));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], (WindowId(1), Rectangle::new(10.0, 10.0, 950.0, 1060.0)));
        assert_eq!(result[1], (WindowId(2), Rectangle::new(970.0, 10.0, 950.0, 1060.0)));
    }

    #[test]
    fn test_remove_returns_workspace() {
        let mut layout = LayoutManager::new(0.0);
        layout.add_tiled(WorkspaceId(3), WindowId(7));

        assert!(layout.is_tiled(WindowId(7)));
        assert_eq!(layout.remove(WindowId(7)), Some(WorkspaceId(3)));
        assert_eq!(layout.remove(WindowId(7)), None);
        assert!(layout.tiled_on(WorkspaceId(3)).is_empty());
    }

    #[test]
    fn test_empty_workspace_has_no_layout() {
        let layout = LayoutManager::new(5.0);
        assert!(layout
            .calculate_layout(WorkspaceId(1), Rectangle::new(0.0, 0.0, 100.0, 100.0))
            .is_empty());
    }
}
