//! The render pipeline: pick the first source that yields an image
//!
//! A glyph can reach the screen several ways. Color fonts may carry layered
//! color outlines or pre-rendered images, bitmap fonts carry strikes, and
//! nearly everything carries a plain outline. [`Render`] tries the sources
//! in the order it was given and returns the first image produced. Sources
//! are never blended, and there is no implicit fallback glyph.

use glyphscale_core::{
    BitmapKind, BitmapRequest, Color, Content, Format, GlyphId, GlyphProvider, Image, Result,
    ScaleError, Source, SourcePreference, StrikeWith,
};
use glyphscale_raster::{Mask, ScaleOptions};
use log::{debug, trace, warn};

use crate::bitmap;
use crate::color;
use crate::scaler::Scaler;

/// Color for layers that ask for the foreground when none is configured
const DEFAULT_LAYER_COLOR: Color = Color::rgba(128, 128, 128, 255);

/// Source order plus the options that shape the rendered image
#[derive(Debug, Clone, PartialEq)]
pub struct Render {
    sources: Vec<Source>,
    format: Format,
    options: ScaleOptions,
    default_color: Color,
}

impl Default for Render {
    fn default() -> Self {
        Self::from_preference(&SourcePreference::default())
    }
}

impl Render {
    /// Try `sources` in this exact order.
    pub fn new(sources: &[Source]) -> Self {
        Self {
            sources: sources.to_vec(),
            format: Format::Alpha,
            options: ScaleOptions::default(),
            default_color: DEFAULT_LAYER_COLOR,
        }
    }

    /// Try the sources a caller ranked, minus the ones they denied.
    pub fn from_preference(preference: &SourcePreference) -> Self {
        Self::new(preference.sources())
    }

    /// Coverage format for outline sources (default: [`Format::Alpha`])
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Fractional pen position; each component is wrapped into `[0, 1)`.
    pub fn offset(mut self, x: f32, y: f32) -> Self {
        self.options = self.options.offset(x, y);
        self
    }

    /// Synthetic bold, in device pixels per side
    pub fn embolden(mut self, strength: f32) -> Self {
        self.options = self.options.embolden(strength);
        self
    }

    /// Synthetic oblique angle in degrees
    pub fn skew(mut self, degrees: f32) -> Self {
        self.options = self.options.skew(degrees);
        self
    }

    /// Color for color-outline layers that use the foreground
    pub fn default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Render `glyph_id` into a new image.
    pub fn render<P: GlyphProvider>(
        &self,
        scaler: &mut Scaler<'_, P>,
        glyph_id: GlyphId,
    ) -> Result<Image> {
        let mut image = Image::new();
        self.render_into(scaler, glyph_id, &mut image)?;
        Ok(image)
    }

    /// Render `glyph_id` into `image`, reusing its buffer.
    ///
    /// Fails with [`ScaleError::SourceUnavailable`] when no source produced
    /// an image. Provider errors stop the search and are returned as is.
    pub fn render_into<P: GlyphProvider>(
        &self,
        scaler: &mut Scaler<'_, P>,
        glyph_id: GlyphId,
        image: &mut Image,
    ) -> Result<()> {
        for &source in &self.sources {
            image.clear();
            let produced = match source {
                Source::Outline => self.render_outline(scaler, glyph_id, image)?,
                Source::ColorOutline(palette) => {
                    self.render_color_outline(scaler, glyph_id, palette, image)?
                }
                Source::Bitmap(strike) => {
                    self.render_bitmap(scaler, glyph_id, strike, BitmapKind::Alpha, image)?
                }
                Source::EmbeddedImage(strike) => {
                    self.render_bitmap(scaler, glyph_id, strike, BitmapKind::Color, image)?
                }
            };
            if produced {
                image.source = source;
                debug!(
                    "Glyph {} rendered from {:?} ({}x{})",
                    glyph_id,
                    source,
                    image.width(),
                    image.height()
                );
                return Ok(());
            }
            trace!("Glyph {}: {:?} has nothing", glyph_id, source);
        }
        image.clear();
        Err(ScaleError::SourceUnavailable(glyph_id))
    }

    /// Render a sequence of glyphs lazily, one image per glyph.
    pub fn render_iter<'r, 's, 'a, P, I>(
        &'r self,
        scaler: &'s mut Scaler<'a, P>,
        glyphs: I,
    ) -> RenderIter<'r, 's, 'a, P, I::IntoIter>
    where
        P: GlyphProvider,
        I: IntoIterator<Item = GlyphId>,
    {
        RenderIter {
            render: self,
            scaler,
            glyphs: glyphs.into_iter(),
        }
    }

    fn render_outline<P: GlyphProvider>(
        &self,
        scaler: &mut Scaler<'_, P>,
        glyph_id: GlyphId,
        image: &mut Image,
    ) -> Result<bool> {
        let Some(placement) =
            scaler.outline_mask(glyph_id, &self.options, self.format, &mut image.data)?
        else {
            return Ok(false);
        };
        image.content = match self.format {
            Format::Alpha => Content::Mask,
            Format::Subpixel => Content::SubpixelMask,
        };
        image.placement = placement;
        Ok(true)
    }

    fn render_color_outline<P: GlyphProvider>(
        &self,
        scaler: &mut Scaler<'_, P>,
        glyph_id: GlyphId,
        palette: u16,
        image: &mut Image,
    ) -> Result<bool> {
        // Layer buffers leave the context while the scaler renders each layer
        let mut layers = std::mem::take(&mut scaler.context.layers);
        let mut masks = std::mem::take(&mut scaler.context.layer_masks);
        layers.clear();
        let result = self.composite_layers(scaler, glyph_id, palette, &mut layers, &mut masks, image);
        scaler.context.layers = layers;
        scaler.context.layer_masks = masks;
        result
    }

    fn composite_layers<P: GlyphProvider>(
        &self,
        scaler: &mut Scaler<'_, P>,
        glyph_id: GlyphId,
        palette: u16,
        layers: &mut Vec<glyphscale_core::ColorLayer>,
        masks: &mut Vec<Mask>,
        image: &mut Image,
    ) -> Result<bool> {
        if !scaler.provider().load_color_layers(glyph_id, palette, layers)? || layers.is_empty() {
            return Ok(false);
        }
        if masks.len() < layers.len() {
            masks.resize_with(layers.len(), Mask::default);
        }
        let masks = &mut masks[..layers.len()];
        for (layer, mask) in layers.iter().zip(masks.iter_mut()) {
            mask.format = Format::Alpha;
            mask.placement = scaler
                .outline_mask(layer.glyph_id, &self.options, Format::Alpha, &mut mask.data)?
                .unwrap_or_default();
        }

        let colors = layers
            .iter()
            .map(|layer| layer.color.unwrap_or(self.default_color));
        image.placement = color::composite(masks.iter().zip(colors), &mut image.data);
        image.content = Content::Color;
        trace!("Glyph {} composited from {} layers", glyph_id, layers.len());
        Ok(true)
    }

    fn render_bitmap<P: GlyphProvider>(
        &self,
        scaler: &mut Scaler<'_, P>,
        glyph_id: GlyphId,
        strike: StrikeWith,
        kind: BitmapKind,
        image: &mut Image,
    ) -> Result<bool> {
        let request = BitmapRequest {
            ppem: scaler.size(),
            strike,
            kind,
        };
        let Some(embedded) = scaler.provider().load_bitmap(glyph_id, &request)? else {
            return Ok(false);
        };
        let decoded = match bitmap::decode(&embedded) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Glyph {glyph_id}: embedded bitmap unusable ({e}), trying the next source");
                return Ok(false);
            }
        };
        let decoded = match strike {
            StrikeWith::ExactSize => decoded,
            _ => bitmap::resize(decoded, embedded.ppem, request.ppem),
        };
        image.content = decoded.content;
        image.placement = decoded.placement;
        image.data.extend_from_slice(&decoded.data);
        Ok(true)
    }
}

/// Iterator returned by [`Render::render_iter`]
pub struct RenderIter<'r, 's, 'a, P, I> {
    render: &'r Render,
    scaler: &'s mut Scaler<'a, P>,
    glyphs: I,
}

impl<P, I> Iterator for RenderIter<'_, '_, '_, P, I>
where
    P: GlyphProvider,
    I: Iterator<Item = GlyphId>,
{
    type Item = Result<Image>;

    fn next(&mut self) -> Option<Result<Image>> {
        let glyph_id = self.glyphs.next()?;
        Some(self.render.render(&mut *self.scaler, glyph_id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.glyphs.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_options() {
        let render = Render::new(&[Source::Outline])
            .format(Format::Subpixel)
            .offset(0.25, 0.5)
            .embolden(0.5)
            .skew(10.0)
            .default_color(Color::black());
        assert_eq!(render.sources(), &[Source::Outline]);
        assert_eq!(render.format, Format::Subpixel);
        assert_eq!(render.options.offset, (0.25, 0.5));
        assert_eq!(render.options.embolden, Some(0.5));
        assert_eq!(render.options.skew, Some(10.0));
        assert_eq!(render.default_color, Color::black());
    }

    #[test]
    fn test_default_order_is_color_first() {
        assert_eq!(
            Render::default().sources(),
            &[
                Source::ColorOutline(0),
                Source::EmbeddedImage(StrikeWith::BestFit),
                Source::Outline
            ]
        );
    }

    #[test]
    fn test_preference_deny_is_applied() {
        let preference = SourcePreference::from_parts(
            vec![Source::Outline, Source::Bitmap(StrikeWith::ExactSize)],
            [Source::Outline],
        );
        assert_eq!(
            Render::from_preference(&preference).sources(),
            &[Source::Bitmap(StrikeWith::ExactSize)]
        );
    }
}
