//! Event callbacks
//!
//! Plugins subscribe to compositor events by name. Callbacks run
//! synchronously on the compositor thread and receive the compositor itself,
//! so they may call back into any host operation.

use std::fmt;
use std::rc::Rc;

use crate::compositor::Compositor;
use crate::plugin::PluginHandle;
use crate::renderer::RenderStage;
use crate::window::WindowHandle;

/// Events a plugin can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    OpenWindow,
    CloseWindow,
    Render,
    ConfigReloaded,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::OpenWindow => "openWindow",
            EventKind::CloseWindow => "closeWindow",
            EventKind::Render => "render",
            EventKind::ConfigReloaded => "configReloaded",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "openWindow" => Some(EventKind::OpenWindow),
            "closeWindow" => Some(EventKind::CloseWindow),
            "render" => Some(EventKind::Render),
            "configReloaded" => Some(EventKind::ConfigReloaded),
            _ => None,
        }
    }
}

/// Event payloads
#[derive(Clone)]
pub enum Event {
    /// A window was mapped; rules are already applied
    OpenWindow(WindowHandle),
    /// A window is about to be destroyed
    CloseWindow(WindowHandle),
    /// A render stage of the output currently being rendered
    Render(RenderStage),
    ConfigReloaded,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::OpenWindow(_) => EventKind::OpenWindow,
            Event::CloseWindow(_) => EventKind::CloseWindow,
            Event::Render(_) => EventKind::Render,
            Event::ConfigReloaded => EventKind::ConfigReloaded,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::OpenWindow(w) => write!(f, "OpenWindow({})", w.borrow().id),
            Event::CloseWindow(w) => write!(f, "CloseWindow({})", w.borrow().id),
            Event::Render(stage) => write!(f, "Render({:?})", stage),
            Event::ConfigReloaded => write!(f, "ConfigReloaded"),
        }
    }
}

pub type Callback = Rc<dyn Fn(&mut Compositor, &Event)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

struct CallbackEntry {
    id: CallbackId,
    owner: PluginHandle,
    kind: EventKind,
    callback: Callback,
}

/// Registered callbacks, in registration order
#[derive(Default)]
pub struct EventBus {
    entries: Vec<CallbackEntry>,
    next_id: u64,
}

impl EventBus {
    pub fn register(&mut self, owner: PluginHandle, kind: EventKind, callback: Callback) -> CallbackId {
        self.next_id += 1;
        let id = CallbackId(self.next_id);
        self.entries.push(CallbackEntry {
            id,
            owner,
            kind,
            callback,
        });
        id
    }

    pub fn unregister(&mut self, id: CallbackId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Drop every callback registered by `owner`
    pub fn unregister_owner(&mut self, owner: PluginHandle) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.owner != owner);
        before - self.entries.len()
    }

    /// Snapshot of the callbacks for `kind`, so dispatch can borrow the compositor
    pub fn listeners(&self, kind: EventKind) -> Vec<Callback> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| Rc::clone(&entry.callback))
            .collect()
    }

    pub fn count_for(&self, owner: PluginHandle) -> usize {
        self.entries.iter().filter(|entry| entry.owner == owner).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Rc::new(|_: &mut Compositor, _: &Event| {})
    }

    #[test]
    fn test_event_names_roundtrip() {
        for kind in [
            EventKind::OpenWindow,
            EventKind::CloseWindow,
            EventKind::Render,
            EventKind::ConfigReloaded,
        ] {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("mouseMove"), None);
    }

    #[test]
    fn test_listeners_filtered_by_kind() {
        let mut bus = EventBus::default();
        bus.register(PluginHandle(1), EventKind::Render, noop());
        bus.register(PluginHandle(1), EventKind::OpenWindow, noop());
        bus.register(PluginHandle(2), EventKind::Render, noop());

        assert_eq!(bus.listeners(EventKind::Render).len(), 2);
        assert_eq!(bus.listeners(EventKind::CloseWindow).len(), 0);
    }

    #[test]
    fn test_unregister_owner() {
        let mut bus = EventBus::default();
        let id = bus.register(PluginHandle(1), EventKind::Render, noop());
        bus.register(PluginHandle(1), EventKind::ConfigReloaded, noop());
        bus.register(PluginHandle(2), EventKind::Render, noop());

        assert!(bus.unregister(id));
        assert!(!bus.unregister(id));
        assert_eq!(bus.unregister_owner(PluginHandle(1)), 1);
        assert_eq!(bus.count_for(PluginHandle(1)), 0);
        assert_eq!(bus.count_for(PluginHandle(2)), 1);
    }
}
