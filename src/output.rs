//! Output (monitor) model
//!
//! Outputs are owned by the compositor. Everything else only reads them, and
//! the set can change at runtime, so nothing derived from it is cached.

use std::fmt;

use crate::geometry::{Rectangle, Vector2D};
use crate::workspace::WorkspaceId;

/// Stable identity of an output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(pub u64);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output#{}", self.0)
    }
}

/// A physical or virtual display surface
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub id: OutputId,
    pub name: String,
    /// Top-left corner in layout coordinates
    pub position: Vector2D,
    pub size: Vector2D,
    /// Workspace currently shown on this output
    pub active_workspace: WorkspaceId,
}

impl Output {
    pub fn new(
        id: OutputId,
        name: String,
        position: Vector2D,
        size: Vector2D,
        active_workspace: WorkspaceId,
    ) -> Self {
        Self {
            id,
            name,
            position,
            size,
            active_workspace,
        }
    }

    pub fn geometry(&self) -> Rectangle {
        Rectangle {
            origin: self.position,
            size: self.size,
        }
    }
}
