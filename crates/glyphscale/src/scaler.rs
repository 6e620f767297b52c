//! Scaling sessions bound to one font, size and design-space location
//!
//! ```ignore
//! let mut context = ScaleContext::new();
//! let mut scaler = context
//!     .builder(&font)
//!     .size(14.0)
//!     .hint(true)
//!     .build()?;
//! let outline = scaler.scale_outline(glyph_id)?;
//! ```

use glyphscale_core::{
    Format, FontMetrics, GlyphId, GlyphMetrics, GlyphProvider, Placement, Result, ScaleError,
};
use glyphscale_raster::{hint, rasterize_into, scale_into, HintSettings, ScaleOptions, ScaledOutline};
use log::{debug, trace};

use crate::context::ScaleContext;

/// Everything that identifies a scaling session apart from the font
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerConfig {
    /// Pixels per em
    pub size: f32,
    /// Fit outlines to the pixel grid
    pub hint: bool,
    /// Normalized variation coordinates, one per axis, passed to the provider
    pub coords: Vec<f32>,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            size: 16.0,
            hint: false,
            coords: Vec::new(),
        }
    }
}

/// Fluent configuration for a [`Scaler`]
pub struct ScalerBuilder<'a, P> {
    context: &'a mut ScaleContext,
    provider: P,
    config: ScalerConfig,
}

impl<'a, P: GlyphProvider> ScalerBuilder<'a, P> {
    pub fn new(context: &'a mut ScaleContext, provider: P) -> Self {
        Self {
            context,
            provider,
            config: ScalerConfig::default(),
        }
    }

    /// Target size in pixels per em
    pub fn size(mut self, size: f32) -> Self {
        self.config.size = size;
        self
    }

    /// Enable or disable grid fitting (default: disabled)
    pub fn hint(mut self, enabled: bool) -> Self {
        self.config.hint = enabled;
        self
    }

    /// Position in a variable font's design space
    pub fn normalized_coords<I>(mut self, coords: I) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        self.config.coords.clear();
        self.config.coords.extend(coords);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ScalerConfig) -> Self {
        self.config = config;
        self
    }

    /// Finish the session setup.
    ///
    /// Fails with [`ScaleError::InvalidSize`] for sizes that are not finite
    /// and positive.
    pub fn build(self) -> Result<Scaler<'a, P>> {
        let size = self.config.size;
        if !(size.is_finite() && size > 0.0) {
            return Err(ScaleError::InvalidSize(size));
        }
        let metrics = self.provider.metrics(&self.config.coords);
        let hint_settings = if self.config.hint {
            HintSettings::from_metrics(&metrics, size)
        } else {
            HintSettings::new()
        };
        debug!(
            "Scaler ready: {}px, upem {}, hinting {}, {} coords",
            size,
            metrics.units_per_em,
            self.config.hint,
            self.config.coords.len()
        );
        Ok(Scaler {
            context: self.context,
            provider: self.provider,
            config: self.config,
            metrics,
            hint_settings,
        })
    }
}

/// A session that turns glyph ids into scaled outlines and masks
///
/// Each request is independent; the only state carried between requests is
/// the borrowed context's scratch memory.
pub struct Scaler<'a, P> {
    pub(crate) context: &'a mut ScaleContext,
    provider: P,
    config: ScalerConfig,
    metrics: FontMetrics,
    hint_settings: HintSettings,
}

impl<P: GlyphProvider> Scaler<'_, P> {
    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.config.size
    }

    #[inline]
    pub fn has_hinting(&self) -> bool {
        self.config.hint
    }

    #[inline]
    pub fn units_per_em(&self) -> u16 {
        self.metrics.units_per_em
    }

    pub fn font_metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Pixels per font unit
    pub fn scale(&self) -> f32 {
        if self.metrics.units_per_em == 0 {
            return 0.0;
        }
        self.config.size / f32::from(self.metrics.units_per_em)
    }

    /// Advance and bounds of a glyph in font units.
    pub fn glyph_metrics(&mut self, glyph_id: GlyphId) -> Result<GlyphMetrics> {
        let advance = self.provider.advance_width(glyph_id, &self.config.coords);
        let outline = &mut self.context.outline;
        outline.clear();
        let has_outline = self
            .provider
            .load_outline(glyph_id, &self.config.coords, outline)?;
        if advance.is_none() && !has_outline {
            return Err(ScaleError::GlyphNotFound(glyph_id));
        }
        Ok(GlyphMetrics {
            units_per_em: self.metrics.units_per_em,
            advance_width: advance.unwrap_or(0.0),
            bounds: outline.bounds(),
            font_bounds: self.metrics.bounds,
        })
    }

    /// The glyph outline in device pixels, grid fitted when hinting is on.
    pub fn scale_outline(&mut self, glyph_id: GlyphId) -> Result<ScaledOutline> {
        let mut out = ScaledOutline::new();
        self.scale_outline_into(glyph_id, &mut out)?;
        Ok(out)
    }

    /// Like [`Scaler::scale_outline`], writing into a reused outline.
    pub fn scale_outline_into(&mut self, glyph_id: GlyphId, out: &mut ScaledOutline) -> Result<()> {
        if !self.load_scaled(glyph_id, &ScaleOptions::default())? {
            return Err(ScaleError::GlyphNotFound(glyph_id));
        }
        out.clone_from(&self.context.scaled);
        Ok(())
    }

    /// Load, scale and optionally fit `glyph_id` into the context's scaled
    /// outline. `Ok(false)` when the provider has no outline for it.
    pub(crate) fn load_scaled(&mut self, glyph_id: GlyphId, options: &ScaleOptions) -> Result<bool> {
        let upem = self.metrics.units_per_em;
        let ctx = &mut *self.context;
        ctx.reset();
        if !self
            .provider
            .load_outline(glyph_id, &self.config.coords, &mut ctx.outline)?
        {
            return Ok(false);
        }
        ctx.outline.validate()?;
        scale_into(
            &ctx.outline,
            self.config.size,
            upem,
            options,
            &mut ctx.scaled,
            &mut ctx.scratch,
        )?;
        if self.config.hint {
            let scaled = std::mem::take(&mut ctx.scaled);
            ctx.scaled = hint(scaled, &self.hint_settings, &mut ctx.scratch).into_inner();
        }
        trace!(
            "Glyph {} scaled: {} contours at {}px",
            glyph_id,
            ctx.scaled.contour_count(),
            self.config.size
        );
        Ok(true)
    }

    /// Rasterize `glyph_id` into `out`. `Ok(None)` when there is no outline.
    pub(crate) fn outline_mask(
        &mut self,
        glyph_id: GlyphId,
        options: &ScaleOptions,
        format: Format,
        out: &mut Vec<u8>,
    ) -> Result<Option<Placement>> {
        if !self.load_scaled(glyph_id, options)? {
            out.clear();
            return Ok(None);
        }
        let ctx = &mut *self.context;
        Ok(Some(rasterize_into(&ctx.scaled, format, &mut ctx.scratch, out)))
    }
}
