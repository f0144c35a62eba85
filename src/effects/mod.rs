//! Visual effects state
//!
//! Effects computed over a whole output (currently blur) are cached per output
//! and recomputed only after something on that output marks them dirty.

pub mod blur;

use crate::config::EffectsConfig;

pub use blur::BlurCache;

/// Effects bookkeeping for every output
#[derive(Debug)]
pub struct EffectsEngine {
    config: EffectsConfig,
    pub blur: BlurCache,
}

impl EffectsEngine {
    pub fn new(config: &EffectsConfig) -> Self {
        Self {
            config: config.clone(),
            blur: BlurCache::default(),
        }
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: &EffectsConfig) {
        if self.config != *config {
            self.config = config.clone();
            // Radius or pass changes invalidate everything
            self.blur.mark_all_dirty();
        }
    }
}
