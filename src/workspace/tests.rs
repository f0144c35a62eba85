//! Unit tests for workspace module
//!
//! Tests workspace creation, window assignment and output removal.

use super::*;

#[test]
fn test_workspace_creation() {
    let mut workspaces = WorkspaceManager::new();
    let a = workspaces.create(OutputId(1));
    let b = workspaces.create(OutputId(2));

    assert_ne!(a, b);
    assert_eq!(workspaces.len(), 2);
    assert_eq!(workspaces.get(a).map(|ws| ws.output), Some(OutputId(1)));
    assert_eq!(workspaces.get(b).map(|ws| ws.name.as_str()), Some("2"));
}

#[test]
fn test_assign_moves_window_between_workspaces() {
    let mut workspaces = WorkspaceManager::new();
    let a = workspaces.create(OutputId(1));
    let b = workspaces.create(OutputId(2));

    assert_eq!(workspaces.assign_window(WindowId(10), a), Some(OutputId(1)));
    assert_eq!(workspaces.workspace_of(WindowId(10)), Some(a));

    // Moving to the second workspace leaves the first one empty
    assert_eq!(workspaces.assign_window(WindowId(10), b), Some(OutputId(2)));
    assert_eq!(workspaces.workspace_of(WindowId(10)), Some(b));
    assert!(workspaces.get(a).unwrap().is_empty());
}

#[test]
fn test_assign_is_idempotent() {
    let mut workspaces = WorkspaceManager::new();
    let a = workspaces.create(OutputId(1));

    workspaces.assign_window(WindowId(1), a);
    workspaces.assign_window(WindowId(1), a);

    assert_eq!(workspaces.get(a).unwrap().windows, vec![WindowId(1)]);
}

#[test]
fn test_assign_to_unknown_workspace() {
    let mut workspaces = WorkspaceManager::new();
    let a = workspaces.create(OutputId(1));
    workspaces.assign_window(WindowId(1), a);

    assert_eq!(workspaces.assign_window(WindowId(1), WorkspaceId(99)), None);
    // The window stays where it was
    assert_eq!(workspaces.workspace_of(WindowId(1)), Some(a));
}

#[test]
fn test_window_removal() {
    let mut workspaces = WorkspaceManager::new();
    let a = workspaces.create(OutputId(1));
    workspaces.assign_window(WindowId(1), a);
    workspaces.assign_window(WindowId(2), a);

    assert!(workspaces.remove_window(WindowId(1)));
    assert!(!workspaces.remove_window(WindowId(1)));
    assert_eq!(workspaces.get(a).unwrap().windows, vec![WindowId(2)]);
}

#[test]
fn test_remove_output_drops_its_workspaces() {
    let mut workspaces = WorkspaceManager::new();
    let a = workspaces.create(OutputId(1));
    let b = workspaces.create(OutputId(2));
    let c = workspaces.create(OutputId(1));

    let removed = workspaces.remove_output(OutputId(1));
    assert_eq!(removed, vec![a, c]);
    assert_eq!(workspaces.len(), 1);
    assert!(workspaces.get(b).is_some());
}
