//! Function hooks
//!
//! Internal handlers a plugin may intercept are dispatched through this table
//! instead of being called directly. Each hookable handler is published as a
//! symbol that plugins look up by name; a hook replaces the handler and is
//! handed the original so it can forward to it.
//!
//! At most one enabled hook exists per hook point. Enabling a second one
//! fails, which is how a plugin learns that another plugin got there first.

use anyhow::{anyhow, bail, Result};
use log::{debug, warn};
use std::fmt;
use std::rc::Rc;

use crate::compositor::Compositor;
use crate::plugin::PluginHandle;
use crate::window::{Subsurface, WindowHandle};

pub type WindowCommitFn = fn(&mut Compositor, &WindowHandle);
pub type SubsurfaceCommitFn = fn(&mut Compositor, &Subsurface);

pub type WindowCommitHook = Rc<dyn Fn(&mut Compositor, &WindowHandle, WindowCommitFn)>;
pub type SubsurfaceCommitHook = Rc<dyn Fn(&mut Compositor, &Subsurface, SubsurfaceCommitFn)>;

/// Address of a published function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionAddress(pub usize);

impl fmt::Display for FunctionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Handler that a hook can replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    WindowCommit,
    SubsurfaceCommit,
}

/// The pre-hook implementation of a handler
#[derive(Clone, Copy)]
pub enum Original {
    WindowCommit(WindowCommitFn),
    SubsurfaceCommit(SubsurfaceCommitFn),
}

impl Original {
    pub fn point(&self) -> HookPoint {
        match self {
            Original::WindowCommit(_) => HookPoint::WindowCommit,
            Original::SubsurfaceCommit(_) => HookPoint::SubsurfaceCommit,
        }
    }
}

impl fmt::Debug for Original {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Original({:?})", self.point())
    }
}

/// Replacement installed by a hook
#[derive(Clone)]
pub enum Replacement {
    WindowCommit(WindowCommitHook),
    SubsurfaceCommit(SubsurfaceCommitHook),
}

impl Replacement {
    pub fn point(&self) -> HookPoint {
        match self {
            Replacement::WindowCommit(_) => HookPoint::WindowCommit,
            Replacement::SubsurfaceCommit(_) => HookPoint::SubsurfaceCommit,
        }
    }
}

/// A published function
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub demangled: String,
    pub address: FunctionAddress,
    /// `None` for functions that are published but not hookable
    pub original: Option<Original>,
}

/// A lookup result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMatch {
    pub address: FunctionAddress,
    pub signature: String,
    pub demangled: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// Handle returned by hook creation
#[derive(Debug, Clone)]
pub struct FunctionHook {
    id: HookId,
    original: Original,
}

impl FunctionHook {
    pub fn id(&self) -> HookId {
        self.id
    }

    /// The implementation that was in place before this hook
    pub fn original(&self) -> Original {
        self.original
    }

    /// Start routing calls through the replacement
    pub fn hook(&self, compositor: &mut Compositor) -> bool {
        compositor.hooks.enable(self.id)
    }

    pub fn unhook(&self, compositor: &mut Compositor) -> bool {
        compositor.hooks.disable(self.id)
    }
}

struct HookEntry {
    id: HookId,
    owner: PluginHandle,
    replacement: Replacement,
    enabled: bool,
}

/// Published symbols plus the installed hooks
pub struct HookTable {
    symbols: Vec<Symbol>,
    entries: Vec<HookEntry>,
    next_id: u64,
}

impl HookTable {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols,
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Every published function called `name`
    pub fn find_functions_by_name(&self, name: &str) -> Vec<FunctionMatch> {
        self.symbols
            .iter()
            .filter(|symbol| symbol.name == name)
            .map(|symbol| FunctionMatch {
                address: symbol.address,
                signature: symbol.name.clone(),
                demangled: symbol.demangled.clone(),
            })
            .collect()
    }

    /// Withdraw published functions called `name`; returns how many went away
    pub fn unpublish(&mut self, name: &str) -> usize {
        let before = self.symbols.len();
        self.symbols.retain(|symbol| symbol.name != name);
        before - self.symbols.len()
    }

    /// Create a disabled hook on the function at `address`
    pub fn create(&mut self, owner: PluginHandle, address: FunctionAddress, replacement: Replacement) -> Result<FunctionHook> {
        let symbol = self
            .symbols
            .iter()
            .find(|symbol| symbol.address == address)
            .ok_or_else(|| anyhow!("No function at {}", address))?;

        let original = symbol
            .original
            .ok_or_else(|| anyhow!("{} is not hookable", symbol.demangled))?;

        if original.point() != replacement.point() {
            bail!(
                "Hook signature mismatch for {}: expected {:?}, got {:?}",
                symbol.demangled,
                original.point(),
                replacement.point()
            );
        }

        self.next_id += 1;
        let id = HookId(self.next_id);
        debug!("Created hook {:?} on {} ({})", id, symbol.demangled, address);

        self.entries.push(HookEntry {
            id,
            owner,
            replacement,
            enabled: false,
        });

        Ok(FunctionHook { id, original })
    }

    pub fn enable(&mut self, id: HookId) -> bool {
        let Some(point) = self.entries.iter().find(|e| e.id == id).map(|e| e.replacement.point()) else {
            return false;
        };

        let taken = self
            .entries
            .iter()
            .any(|e| e.enabled && e.id != id && e.replacement.point() == point);
        if taken {
            warn!("{:?} is already hooked, refusing hook {:?}", point, id);
            return false;
        }

        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.enabled = true;
                true
            }
            None => false,
        }
    }

    pub fn disable(&mut self, id: HookId) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) if entry.enabled => {
                entry.enabled = false;
                true
            }
            _ => false,
        }
    }

    /// Remove every hook owned by `owner`
    pub fn remove_owner(&mut self, owner: PluginHandle) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.owner != owner);
        before - self.entries.len()
    }

    pub fn count_for(&self, owner: PluginHandle) -> usize {
        self.entries.iter().filter(|entry| entry.owner == owner).count()
    }

    pub fn is_hooked(&self, point: HookPoint) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.enabled && entry.replacement.point() == point)
    }

    pub fn window_commit(&self) -> Option<WindowCommitHook> {
        self.entries.iter().filter(|e| e.enabled).find_map(|e| match &e.replacement {
            Replacement::WindowCommit(hook) => Some(Rc::clone(hook)),
            _ => None,
        })
    }

    pub fn subsurface_commit(&self) -> Option<SubsurfaceCommitHook> {
        self.entries.iter().filter(|e| e.enabled).find_map(|e| match &e.replacement {
            Replacement::SubsurfaceCommit(hook) => Some(Rc::clone(hook)),
            _ => None,
        })
    }
}
