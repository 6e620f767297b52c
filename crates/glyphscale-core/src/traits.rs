//! The contract between the scaler and whatever reads font tables
//!
//! Glyphscale never parses font bytes. A [`GlyphProvider`] hands over
//! already-decoded outlines, metrics, color layers and embedded bitmaps;
//! the scaler turns them into pixels.

use crate::error::Result;
use crate::image::BitmapFormat;
use crate::outline::{FontMetrics, Outline};
use crate::types::{Color, GlyphId};
use crate::StrikeWith;

/// One layer of a layered color glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorLayer {
    /// Outline glyph that gives the layer its shape
    pub glyph_id: GlyphId,
    /// `None` paints with the caller's foreground color
    pub color: Option<Color>,
}

/// Which embedded bitmaps a request is after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitmapKind {
    /// Monochrome or grayscale coverage strikes
    Alpha,
    /// Color strikes (PNG or BGRA payloads)
    Color,
}

/// Parameters for an embedded bitmap lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapRequest {
    /// Target size in pixels per em
    pub ppem: f32,
    pub strike: StrikeWith,
    pub kind: BitmapKind,
}

/// A bitmap as stored in the font
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedBitmap {
    pub width: u32,
    pub height: u32,
    /// Offset from the glyph origin to the left edge, in pixels at `ppem`
    pub left: i32,
    /// Offset from the baseline up to the top edge, in pixels at `ppem`
    pub top: i32,
    /// Size the strike was designed for
    pub ppem: f32,
    pub format: BitmapFormat,
    pub data: Vec<u8>,
}

/// Source of decoded glyph data
///
/// Implementations must be shareable across threads; all scratch state lives
/// in the caller's scale context, never in the provider.
///
/// `Ok(false)` / `Ok(None)` mean "this glyph has no data of that kind", which
/// lets the render pipeline move on to the next source. Errors are reported
/// to the caller unchanged.
pub trait GlyphProvider: Send + Sync {
    /// Metrics at the given normalized variation coordinates
    fn metrics(&self, coords: &[f32]) -> FontMetrics;

    /// Design units per em, always greater than zero
    fn units_per_em(&self) -> u16 {
        self.metrics(&[]).units_per_em
    }

    /// Horizontal advance in design units
    fn advance_width(&self, glyph_id: GlyphId, coords: &[f32]) -> Option<f32>;

    /// Write the unscaled outline of `glyph_id` into `outline`.
    ///
    /// `outline` arrives cleared. Coordinates are font design units at the
    /// given normalized variation coordinates.
    fn load_outline(&self, glyph_id: GlyphId, coords: &[f32], outline: &mut Outline)
        -> Result<bool>;

    /// Append the layers of a layered color glyph to `layers`.
    fn load_color_layers(
        &self,
        _glyph_id: GlyphId,
        _palette: u16,
        _layers: &mut Vec<ColorLayer>,
    ) -> Result<bool> {
        Ok(false)
    }

    /// Look up an embedded bitmap.
    fn load_bitmap(
        &self,
        _glyph_id: GlyphId,
        _request: &BitmapRequest,
    ) -> Result<Option<EmbeddedBitmap>> {
        Ok(None)
    }
}

impl<T: GlyphProvider + ?Sized> GlyphProvider for &T {
    fn metrics(&self, coords: &[f32]) -> FontMetrics {
        (**self).metrics(coords)
    }

    fn units_per_em(&self) -> u16 {
        (**self).units_per_em()
    }

    fn advance_width(&self, glyph_id: GlyphId, coords: &[f32]) -> Option<f32> {
        (**self).advance_width(glyph_id, coords)
    }

    fn load_outline(
        &self,
        glyph_id: GlyphId,
        coords: &[f32],
        outline: &mut Outline,
    ) -> Result<bool> {
        (**self).load_outline(glyph_id, coords, outline)
    }

    fn load_color_layers(
        &self,
        glyph_id: GlyphId,
        palette: u16,
        layers: &mut Vec<ColorLayer>,
    ) -> Result<bool> {
        (**self).load_color_layers(glyph_id, palette, layers)
    }

    fn load_bitmap(
        &self,
        glyph_id: GlyphId,
        request: &BitmapRequest,
    ) -> Result<Option<EmbeddedBitmap>> {
        (**self).load_bitmap(glyph_id, request)
    }
}
