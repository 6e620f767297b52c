// this_file: crates/glyphscale-fontdb/src/lib.rs

//! Real font files as glyph providers
//!
//! [`Font`] owns the font bytes and implements
//! [`GlyphProvider`](glyphscale_core::GlyphProvider) on top of skrifa:
//! outlines in design units at any variation location, font and glyph
//! metrics, COLRv0 layers colored from CPAL, and embedded bitmap strikes.
//!
//! ## Memory Management
//!
//! Fonts store their raw data and create a `FontRef` on demand for every
//! request. Nothing is cached, so a `Font` can be shared freely between
//! threads, and TTC collections work through the face index.

use std::fs;
use std::path::Path;

use glyphscale_core::{
    BitmapRequest, Bounds, ColorLayer, EmbeddedBitmap, FontMetrics, GlyphId, GlyphProvider,
    LoadError, Outline, Result,
};
use log::{debug, trace};
use read_fonts::TableProvider;
use skrifa::instance::{LocationRef, NormalizedCoord, Size};
use skrifa::outline::DrawSettings;
use skrifa::{FontRef, MetadataProvider};

mod layers;
mod pen;
mod strikes;

use pen::OutlineCollector;

/// A font face loaded into memory
#[derive(Debug, Clone)]
pub struct Font {
    data: Vec<u8>,
    face_index: u32,
    units_per_em: u16,
}

impl Font {
    /// Read a font file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, LoadError> {
        Self::from_file_index(path, 0)
    }

    /// Read one face of a font file (for TTC collections).
    pub fn from_file_index(
        path: impl AsRef<Path>,
        face_index: u32,
    ) -> std::result::Result<Self, LoadError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        debug!("Loaded {} ({} bytes)", path.display(), data.len());
        Self::from_data_index(data, face_index)
    }

    pub fn from_data(data: Vec<u8>) -> std::result::Result<Self, LoadError> {
        Self::from_data_index(data, 0)
    }

    /// Validate `data` and keep face `face_index` of it.
    ///
    /// Fails when the bytes are not a font, or the face has no usable
    /// `head` table.
    pub fn from_data_index(data: Vec<u8>, face_index: u32) -> std::result::Result<Self, LoadError> {
        let font = FontRef::from_index(&data, face_index)
            .map_err(|e| LoadError::InvalidFont(e.to_string()))?;
        let units_per_em = font
            .head()
            .map_err(|e| LoadError::Table(format!("head: {e}")))?
            .units_per_em();
        if units_per_em == 0 {
            return Err(LoadError::InvalidFont("units per em is zero".into()));
        }
        Ok(Self {
            data,
            face_index,
            units_per_em,
        })
    }

    /// Face index inside a collection (0 for single fonts)
    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn font_ref(&self) -> std::result::Result<FontRef<'_>, LoadError> {
        FontRef::from_index(&self.data, self.face_index)
            .map_err(|e| LoadError::InvalidFont(e.to_string()))
    }

    /// Glyph for a character, through the charmap
    pub fn glyph_id(&self, ch: char) -> Option<GlyphId> {
        let font = self.font_ref().ok()?;
        font.charmap().map(ch).map(|gid| gid.to_u32())
    }

    pub fn glyph_count(&self) -> Option<u32> {
        let font = self.font_ref().ok()?;
        font.maxp().ok().map(|maxp| u32::from(maxp.num_glyphs()))
    }

    /// Ppem of every embedded bitmap strike
    pub fn strike_sizes(&self) -> Vec<f32> {
        self.font_ref()
            .map(|font| strikes::strike_sizes(&font))
            .unwrap_or_default()
    }

    /// Normalized coordinates for user-space axis settings such as
    /// `("wght", 700.0)`. Axes that are not mentioned stay at their default.
    pub fn normalized_coords(&self, settings: &[(&str, f32)]) -> Vec<f32> {
        let Ok(font) = self.font_ref() else {
            return Vec::new();
        };
        let location = font.axes().location(settings.iter().copied());
        location.coords().iter().map(|c| c.to_f32()).collect()
    }
}

fn to_normalized(coords: &[f32]) -> Vec<NormalizedCoord> {
    coords.iter().map(|&c| NormalizedCoord::from_f32(c)).collect()
}

impl GlyphProvider for Font {
    fn metrics(&self, coords: &[f32]) -> FontMetrics {
        let Ok(font) = self.font_ref() else {
            return FontMetrics {
                units_per_em: self.units_per_em,
                ..FontMetrics::default()
            };
        };
        let coords = to_normalized(coords);
        let metrics = font.metrics(Size::unscaled(), LocationRef::new(&coords));
        FontMetrics {
            units_per_em: self.units_per_em,
            bounds: metrics.bounds.map(|b| Bounds {
                x_min: b.x_min.floor() as i32,
                y_min: b.y_min.floor() as i32,
                x_max: b.x_max.ceil() as i32,
                y_max: b.y_max.ceil() as i32,
            }),
            ascender: metrics.ascent,
            descender: metrics.descent,
            cap_height: metrics.cap_height,
            x_height: metrics.x_height,
        }
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn advance_width(&self, glyph_id: GlyphId, coords: &[f32]) -> Option<f32> {
        let font = self.font_ref().ok()?;
        let coords = to_normalized(coords);
        font.glyph_metrics(Size::unscaled(), LocationRef::new(&coords))
            .advance_width(skrifa::GlyphId::new(glyph_id))
    }

    fn load_outline(&self, glyph_id: GlyphId, coords: &[f32], outline: &mut Outline) -> Result<bool> {
        let font = self.font_ref()?;
        let Some(glyph) = font.outline_glyphs().get(skrifa::GlyphId::new(glyph_id)) else {
            return Ok(false);
        };
        let coords = to_normalized(coords);
        let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::new(&coords));
        let mut pen = OutlineCollector::new(outline);
        glyph
            .draw(settings, &mut pen)
            .map_err(|e| LoadError::Outline(format!("glyph {glyph_id}: {e}")))?;
        pen.finish();
        trace!(
            "Glyph {} outline: {} contours, {} points",
            glyph_id,
            outline.contour_count(),
            outline.point_count()
        );
        Ok(true)
    }

    fn load_color_layers(
        &self,
        glyph_id: GlyphId,
        palette: u16,
        layers: &mut Vec<ColorLayer>,
    ) -> Result<bool> {
        let font = self.font_ref()?;
        Ok(layers::load_layers(&font, glyph_id, palette, layers)?)
    }

    fn load_bitmap(
        &self,
        glyph_id: GlyphId,
        request: &BitmapRequest,
    ) -> Result<Option<EmbeddedBitmap>> {
        let font = self.font_ref()?;
        Ok(strikes::load_bitmap(&font, self.units_per_em, glyph_id, request))
    }
}
