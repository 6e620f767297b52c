//! Embedded bitmap strikes (sbix, CBDT/CBLC, EBDT/EBLC)

use glyphscale_core::{BitmapFormat, BitmapKind, BitmapRequest, EmbeddedBitmap, StrikeWith};
use log::trace;
use skrifa::bitmap::{BitmapData, BitmapGlyph, BitmapStrikes, Origin};
use skrifa::instance::Size;
use skrifa::{FontRef, GlyphId};

/// Strike sizes in ppem, in table order
pub(crate) fn strike_sizes(font: &FontRef<'_>) -> Vec<f32> {
    BitmapStrikes::new(font).iter().map(|s| s.ppem()).collect()
}

/// Look up the bitmap for `glyph_id` matching `request`.
pub(crate) fn load_bitmap(
    font: &FontRef<'_>,
    units_per_em: u16,
    glyph_id: u32,
    request: &BitmapRequest,
) -> Option<EmbeddedBitmap> {
    let strikes = BitmapStrikes::new(font);
    if strikes.is_empty() {
        return None;
    }
    let gid = GlyphId::new(glyph_id);
    let glyph = match request.strike {
        StrikeWith::BestFit => strikes.glyph_for_size(Size::new(request.ppem), gid),
        StrikeWith::ExactSize => strikes
            .iter()
            .find(|s| (s.ppem() - request.ppem).abs() < 1.0 / 64.0)
            .and_then(|s| s.get(gid)),
        StrikeWith::LargestSize => strikes
            .iter()
            .filter_map(|s| s.get(gid))
            .max_by(|a, b| a.ppem_y.total_cmp(&b.ppem_y)),
        StrikeWith::Index(index) => strikes.iter().nth(index as usize).and_then(|s| s.get(gid)),
    }?;

    let bitmap = convert(&glyph, units_per_em);
    let kind = match bitmap.format {
        BitmapFormat::Alpha { .. } => BitmapKind::Alpha,
        _ => BitmapKind::Color,
    };
    if kind != request.kind {
        trace!("Glyph {glyph_id}: strike holds {kind:?} data, {:?} requested", request.kind);
        return None;
    }
    Some(bitmap)
}

/// Map a skrifa bitmap glyph to the provider's bitmap description.
///
/// Outer bearings are in font units and are scaled to the strike's ppem;
/// inner bearings are already pixels. Bottom-left origins (sbix) are moved
/// to the top edge.
fn convert(glyph: &BitmapGlyph<'_>, units_per_em: u16) -> EmbeddedBitmap {
    let (format, data) = match &glyph.data {
        BitmapData::Png(data) => (BitmapFormat::Png, data.to_vec()),
        BitmapData::Bgra(data) => (BitmapFormat::Bgra8Premultiplied, data.to_vec()),
        BitmapData::Mask(mask) => (
            BitmapFormat::Alpha {
                bits: mask.bpp,
                packed: mask.is_packed,
            },
            mask.data.to_vec(),
        ),
    };
    let upem = f32::from(units_per_em.max(1));
    let left = glyph.bearing_x * glyph.ppem_x / upem + glyph.inner_bearing_x;
    let mut top = glyph.bearing_y * glyph.ppem_y / upem + glyph.inner_bearing_y;
    if matches!(glyph.placement_origin, Origin::BottomLeft) {
        top += glyph.height as f32;
    }
    EmbeddedBitmap {
        width: glyph.width,
        height: glyph.height,
        left: left.round() as i32,
        top: top.round() as i32,
        ppem: glyph.ppem_y,
        format,
        data,
    }
}
