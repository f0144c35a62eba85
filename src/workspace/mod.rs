//! Workspace management
//!
//! Every output shows exactly one active workspace. A window belongs to at
//! most one workspace; pinned windows are drawn on every workspace regardless
//! of which one they are formally assigned to.

use log::debug;
use std::collections::BTreeMap;
use std::fmt;

use crate::output::OutputId;
use crate::window::WindowId;

/// Stable identity of a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(pub u64);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workspace#{}", self.0)
    }
}

/// A virtual desktop living on one output
#[derive(Debug, Clone)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub output: OutputId,

    /// Windows assigned to this workspace, oldest first
    pub windows: Vec<WindowId>,
}

impl Workspace {
    pub fn add_window(&mut self, window_id: WindowId) {
        if !self.windows.contains(&window_id) {
            self.windows.push(window_id);
        }
    }

    pub fn remove_window(&mut self, window_id: WindowId) -> bool {
        if let Some(pos) = self.windows.iter().position(|&id| id == window_id) {
            self.windows.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Owns every workspace of the session
#[derive(Debug, Default)]
pub struct WorkspaceManager {
    workspaces: BTreeMap<WorkspaceId, Workspace>,
    next_id: u64,
}

impl WorkspaceManager {
    pub fn new() -> Self {
        Self {
            workspaces: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a new workspace on `output`
    pub fn create(&mut self, output: OutputId) -> WorkspaceId {
        let id = WorkspaceId(self.next_id);
        self.next_id += 1;

        self.workspaces.insert(
            id,
            Workspace {
                id,
                name: id.0.to_string(),
                output,
                windows: Vec::new(),
            },
        );

        debug!("Created {} on {}", id, output);
        id
    }

    pub fn get(&self, id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces.get(&id)
    }

    pub fn get_mut(&mut self, id: WorkspaceId) -> Option<&mut Workspace> {
        self.workspaces.get_mut(&id)
    }

    /// Assign a window to `target`, removing it from any other workspace.
    /// Returns the output the workspace lives on.
    pub fn assign_window(&mut self, window_id: WindowId, target: WorkspaceId) -> Option<OutputId> {
        if !self.workspaces.contains_key(&target) {
            return None;
        }

        for workspace in self.workspaces.values_mut() {
            if workspace.id != target {
                workspace.remove_window(window_id);
            }
        }

        let workspace = self.workspaces.get_mut(&target)?;
        workspace.add_window(window_id);
        Some(workspace.output)
    }

    /// Drop a window from whichever workspace holds it
    pub fn remove_window(&mut self, window_id: WindowId) -> bool {
        self.workspaces
            .values_mut()
            .fold(false, |removed, ws| ws.remove_window(window_id) || removed)
    }

    /// Remove all workspaces that live on `output`
    pub fn remove_output(&mut self, output: OutputId) -> Vec<WorkspaceId> {
        let removed: Vec<WorkspaceId> = self
            .workspaces
            .values()
            .filter(|ws| ws.output == output)
            .map(|ws| ws.id)
            .collect();
        for id in &removed {
            self.workspaces.remove(id);
        }
        removed
    }

    pub fn workspace_of(&self, window_id: WindowId) -> Option<WorkspaceId> {
        self.workspaces
            .values()
            .find(|ws| ws.windows.contains(&window_id))
            .map(|ws| ws.id)
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

#[cfg(test)]
mod tests;
