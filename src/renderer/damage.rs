//! Damage tracking for efficient compositor rendering
//!
//! Visible windows that commit new content damage the area they cover on
//! every output they intersect. An output with no pending damage does not need
//! to be repainted.
//!
//! # Example
//!
//! ```
//! use winwrap::geometry::Rectangle;
//! use winwrap::output::OutputId;
//! use winwrap::renderer::damage::DamageTracker;
//!
//! let mut damage = DamageTracker::new();
//! damage.add(OutputId(1), Rectangle::new(10.0, 10.0, 50.0, 50.0));
//!
//! assert!(damage.has_damage(OutputId(1)));
//! assert!(!damage.has_damage(OutputId(2)));
//! ```

use std::collections::HashMap;

use crate::geometry::Rectangle;
use crate::output::OutputId;

/// Maximum number of damage regions per output before coalescing to full damage
const MAX_DAMAGE_REGIONS: usize = 16;

/// Pending damage of a single output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputDamage {
    /// Damaged regions in layout coordinates
    pub regions: Vec<Rectangle>,
    /// Whole output must be repainted
    pub full: bool,
}

impl OutputDamage {
    pub fn has_damage(&self) -> bool {
        self.full || !self.regions.is_empty()
    }
}

/// Collects damage per output between frames
#[derive(Debug, Default)]
pub struct DamageTracker {
    outputs: HashMap<OutputId, OutputDamage>,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record damage for `output`
    pub fn add(&mut self, output: OutputId, region: Rectangle) {
        let damage = self.outputs.entry(output).or_default();
        if damage.full {
            return;
        }

        if damage.regions.len() >= MAX_DAMAGE_REGIONS {
            damage.regions.clear();
            damage.full = true;
        } else {
            damage.regions.push(region);
        }
    }

    /// Force a full repaint of `output`
    pub fn add_full(&mut self, output: OutputId) {
        let damage = self.outputs.entry(output).or_default();
        damage.regions.clear();
        damage.full = true;
    }

    pub fn has_damage(&self, output: OutputId) -> bool {
        self.outputs.get(&output).is_some_and(OutputDamage::has_damage)
    }

    pub fn get(&self, output: OutputId) -> Option<&OutputDamage> {
        self.outputs.get(&output)
    }

    /// Consume the pending damage of `output`
    pub fn take(&mut self, output: OutputId) -> OutputDamage {
        self.outputs.remove(&output).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_is_per_output() {
        let mut damage = DamageTracker::new();
        damage.add(OutputId(1), Rectangle::new(0.0, 0.0, 10.0, 10.0));

        assert!(damage.has_damage(OutputId(1)));
        assert!(!damage.has_damage(OutputId(2)));
        assert_eq!(damage.get(OutputId(1)).map(|d| d.regions.len()), Some(1));
    }

    #[test]
    fn test_take_consumes_damage() {
        let mut damage = DamageTracker::new();
        damage.add(OutputId(1), Rectangle::new(0.0, 0.0, 10.0, 10.0));

        let taken = damage.take(OutputId(1));
        assert_eq!(taken.regions.len(), 1);
        assert!(!damage.has_damage(OutputId(1)));
        assert!(!damage.take(OutputId(1)).has_damage());
    }

    #[test]
    fn test_too_many_regions_coalesce_to_full() {
        let mut damage = DamageTracker::new();
        for i in 0..=MAX_DAMAGE_REGIONS {
            damage.add(OutputId(1), Rectangle::new(i as f64, 0.0, 1.0, 1.0));
        }

        let output = damage.get(OutputId(1)).unwrap();
        assert!(output.full);
        assert!(output.regions.is_empty());
    }

    #[test]
    fn test_full_damage_absorbs_regions() {
        let mut damage = DamageTracker::new();
        damage.add_full(OutputId(3));
        damage.add(OutputId(3), Rectangle::new(0.0, 0.0, 5.0, 5.0));

        let output = damage.get(OutputId(3)).unwrap();
        assert!(output.full);
        assert!(output.regions.is_empty());
    }
}
