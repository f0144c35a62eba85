//! Per-output blur cache
//!
//! The blurred background of an output is expensive to compute, so it is kept
//! until something marks the output dirty. The renderer consumes the flag when
//! it refreshes the cache at the start of a frame.

use log::trace;
use std::collections::{HashMap, HashSet};

use crate::output::OutputId;

#[derive(Debug, Default)]
pub struct BlurCache {
    dirty: HashSet<OutputId>,
    all_dirty: bool,
    /// How many times each output's cache was recomputed
    refreshes: HashMap<OutputId, u64>,
}

impl BlurCache {
    /// Invalidate the cached blur of `output`
    pub fn mark_dirty(&mut self, output: OutputId) {
        trace!("Blur marked dirty for {}", output);
        self.dirty.insert(output);
    }

    pub fn mark_all_dirty(&mut self) {
        self.all_dirty = true;
    }

    pub fn is_dirty(&self, output: OutputId) -> bool {
        self.all_dirty || self.dirty.contains(&output)
    }

    /// Refresh the cache of `output` if needed; returns whether a refresh happened
    pub fn refresh(&mut self, output: OutputId, enabled: bool) -> bool {
        if !self.is_dirty(output) {
            return false;
        }

        self.dirty.remove(&output);
        if self.all_dirty {
            // Every output still has to refresh once; keep the others marked.
            self.all_dirty = false;
            let others: Vec<OutputId> = self.refreshes.keys().copied().filter(|&o| o != output).collect();
            self.dirty.extend(others);
        }

        if !enabled {
            return false;
        }

        *self.refreshes.entry(output).or_insert(0) += 1;
        true
    }

    /// Make `output` known to the cache; new outputs start dirty
    pub fn add_output(&mut self, output: OutputId) {
        self.refreshes.entry(output).or_insert(0);
        self.dirty.insert(output);
    }

    pub fn remove_output(&mut self, output: OutputId) {
        self.refreshes.remove(&output);
        self.dirty.remove(&output);
    }

    pub fn refresh_count(&self, output: OutputId) -> u64 {
        self.refreshes.get(&output).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_output_starts_dirty() {
        let mut cache = BlurCache::default();
        cache.add_output(OutputId(1));
        assert!(cache.is_dirty(OutputId(1)));

        assert!(cache.refresh(OutputId(1), true));
        assert!(!cache.is_dirty(OutputId(1)));
        assert!(!cache.refresh(OutputId(1), true));
        assert_eq!(cache.refresh_count(OutputId(1)), 1);
    }

    #[test]
    fn test_mark_dirty_is_per_output() {
        let mut cache = BlurCache::default();
        cache.add_output(OutputId(1));
        cache.add_output(OutputId(2));
        cache.refresh(OutputId(1), true);
        cache.refresh(OutputId(2), true);

        cache.mark_dirty(OutputId(2));
        assert!(!cache.is_dirty(OutputId(1)));
        assert!(cache.is_dirty(OutputId(2)));
    }

    #[test]
    fn test_mark_all_dirty_reaches_every_output() {
        let mut cache = BlurCache::default();
        cache.add_output(OutputId(1));
        cache.add_output(OutputId(2));
        cache.refresh(OutputId(1), true);
        cache.refresh(OutputId(2), true);

        cache.mark_all_dirty();
        assert!(cache.refresh(OutputId(1), true));
        assert!(cache.refresh(OutputId(2), true));
        assert!(!cache.is_dirty(OutputId(1)));
        assert!(!cache.is_dirty(OutputId(2)));
    }

    #[test]
    fn test_disabled_blur_clears_flag_without_refreshing() {
        let mut cache = BlurCache::default();
        cache.add_output(OutputId(1));

        assert!(!cache.refresh(OutputId(1), false));
        assert!(!cache.is_dirty(OutputId(1)));
        assert_eq!(cache.refresh_count(OutputId(1)), 0);
    }
}
