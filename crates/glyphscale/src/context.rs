//! The per-thread home of every scratch buffer
//!
//! A [`ScaleContext`] is created once per rendering session and lent to each
//! [`Scaler`] built from it. Glyph after glyph, the same outline arena, edge
//! table and mask buffers are cleared and refilled; nothing is cached between
//! glyphs, and nothing is shared between threads.

use glyphscale_core::{ColorLayer, GlyphProvider, Outline, Result};
use glyphscale_raster::{Mask, ScaledOutline, Scratch};

use crate::scaler::{Scaler, ScalerBuilder, ScalerConfig};

/// Reusable state for scaling and rendering glyphs
#[derive(Debug, Default)]
pub struct ScaleContext {
    pub(crate) outline: Outline,
    pub(crate) scaled: ScaledOutline,
    pub(crate) scratch: Scratch,
    pub(crate) layers: Vec<ColorLayer>,
    pub(crate) layer_masks: Vec<Mask>,
}

impl ScaleContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start configuring a scaler for `provider`.
    pub fn builder<P: GlyphProvider>(&mut self, provider: P) -> ScalerBuilder<'_, P> {
        ScalerBuilder::new(self, provider)
    }

    /// Build a scaler straight from a prepared configuration.
    pub fn scaler<P: GlyphProvider>(
        &mut self,
        provider: P,
        config: &ScalerConfig,
    ) -> Result<Scaler<'_, P>> {
        ScalerBuilder::new(self, provider)
            .config(config.clone())
            .build()
    }

    /// Drop the previous outline, keeping every allocation.
    pub(crate) fn reset(&mut self) {
        self.outline.clear();
        self.scaled.clear();
        self.scratch.reset();
    }
}
