//! Layered color glyphs
//!
//! A COLR-style glyph is a stack of ordinary outline glyphs, each painted in
//! one flat color. Layers are rasterized as coverage masks and composited
//! bottom to top, source-over, into one premultiplied RGBA canvas that spans
//! every layer.

use glyphscale_core::image::mul_div255;
use glyphscale_core::{Color, Placement};
use glyphscale_raster::Mask;

/// Composite coverage masks painted in the given colors.
///
/// `out` is resized to `width * height * 4` premultiplied RGBA bytes; the
/// returned placement spans the union of all non-empty layers.
pub fn composite<'a, I>(layers: I, out: &mut Vec<u8>) -> Placement
where
    I: IntoIterator<Item = (&'a Mask, Color)>,
    I::IntoIter: Clone,
{
    let layers = layers.into_iter();
    out.clear();
    let Some(canvas) = union(layers.clone().map(|(mask, _)| mask.placement)) else {
        return Placement::default();
    };
    out.resize(canvas.width as usize * canvas.height as usize * 4, 0);

    for (mask, color) in layers {
        let p = mask.placement;
        if p.width == 0 || p.height == 0 {
            continue;
        }
        let dx = (p.left - canvas.left) as usize;
        let dy = (canvas.top - p.top) as usize;
        for (row, coverage) in mask.data.chunks_exact(p.width as usize).enumerate() {
            let start = ((dy + row) * canvas.width as usize + dx) * 4;
            let line = &mut out[start..start + p.width as usize * 4];
            for (dst, &c) in line.chunks_exact_mut(4).zip(coverage) {
                blend(dst, color, c);
            }
        }
    }
    canvas
}

/// Source-over of `color` at `coverage` onto a premultiplied pixel
#[inline]
fn blend(dst: &mut [u8], color: Color, coverage: u8) {
    let alpha = mul_div255(coverage, color.a);
    if alpha == 0 {
        return;
    }
    let keep = 255 - alpha;
    let src = [
        mul_div255(color.r, alpha),
        mul_div255(color.g, alpha),
        mul_div255(color.b, alpha),
        alpha,
    ];
    for (d, s) in dst.iter_mut().zip(src) {
        *d = s.saturating_add(mul_div255(*d, keep));
    }
}

fn union(placements: impl Iterator<Item = Placement>) -> Option<Placement> {
    let mut bounds: Option<(i32, i32, i32, i32)> = None;
    for p in placements.filter(|p| p.width > 0 && p.height > 0) {
        let right = p.left + p.width as i32;
        let bottom = p.top - p.height as i32;
        bounds = Some(match bounds {
            None => (p.left, p.top, right, bottom),
            Some((l, t, r, b)) => (l.min(p.left), t.max(p.top), r.max(right), b.min(bottom)),
        });
    }
    bounds.map(|(left, top, right, bottom)| Placement {
        left,
        top,
        width: (right - left) as u32,
        height: (top - bottom) as u32,
    })
}
