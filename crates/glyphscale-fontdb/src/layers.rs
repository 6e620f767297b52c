//! COLRv0 layer lookup with CPAL colors

use glyphscale_core::{Color, ColorLayer, LoadError, FOREGROUND_PALETTE_INDEX};
use log::{debug, trace};
use read_fonts::types::GlyphId;
use read_fonts::TableProvider;
use skrifa::color::ColorPalettes;
use skrifa::FontRef;

/// Append the layers of `glyph_id` to `layers`.
///
/// `Ok(false)` when the font has no COLR table or the glyph is not a COLRv0
/// base glyph. Layers whose palette entry is the foreground index, or is
/// missing from the palette, get no color.
pub(crate) fn load_layers(
    font: &FontRef<'_>,
    glyph_id: u32,
    palette: u16,
    layers: &mut Vec<ColorLayer>,
) -> Result<bool, LoadError> {
    let Ok(colr) = font.colr() else {
        return Ok(false);
    };
    let range = colr
        .v0_base_glyph(GlyphId::new(glyph_id))
        .map_err(|e| LoadError::Table(format!("COLR base glyph {glyph_id}: {e}")))?;
    let Some(range) = range else {
        return Ok(false);
    };

    let colors = palette_colors(font, palette);
    let start = layers.len();
    for index in range {
        let (layer_glyph, entry) = colr
            .v0_layer(index)
            .map_err(|e| LoadError::Table(format!("COLR layer {index}: {e}")))?;
        let color = if entry == FOREGROUND_PALETTE_INDEX {
            None
        } else {
            colors.get(entry as usize).copied()
        };
        layers.push(ColorLayer {
            glyph_id: layer_glyph.to_u32(),
            color,
        });
    }
    trace!(
        "Glyph {} has {} COLRv0 layers (palette {})",
        glyph_id,
        layers.len() - start,
        palette
    );
    Ok(true)
}

/// Colors of `palette`, falling back to the first palette.
fn palette_colors(font: &FontRef<'_>, palette: u16) -> Vec<Color> {
    let palettes = ColorPalettes::new(font);
    let chosen = palettes.get(palette).or_else(|| {
        debug!("Palette {palette} not found, using palette 0");
        palettes.get(0)
    });
    chosen
        .map(|p| {
            p.colors()
                .iter()
                .map(|c| Color::rgba(c.red, c.green, c.blue, c.alpha))
                .collect()
        })
        .unwrap_or_default()
}
