//! From design units to device pixels
//!
//! Scaling multiplies every coordinate by `size_px / units_per_em` and keeps
//! the result in 26.6. Two synthetic styles ride along: a horizontal shear
//! for oblique faces and an outward offset of every contour for emboldening.
//! Embolden happens after scaling so the extra stroke weight is the same
//! number of pixels at every size.

use glyphscale_core::outline::contour_ranges;
use glyphscale_core::{LoadError, Outline, Result, ScaleError};
use log::trace;

use crate::context::Scratch;
use crate::fixed::F26Dot6;
use crate::scaled::{ScaledOutline, ScaledPoint};

/// Smallest `1 + cos(angle)` used in the miter formula; caps the offset of
/// sharp corners at four times the embolden strength.
const MITER_FLOOR: f32 = 0.125;

/// Synthetic styling and positioning applied while scaling
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScaleOptions {
    /// Oblique angle in degrees, positive leans right
    pub skew: Option<f32>,
    /// Outward offset of every contour in device pixels
    pub embolden: Option<f32>,
    /// Fractional pen position, wrapped into `[0, 1)` per axis
    pub offset: (f32, f32),
}

impl ScaleOptions {
    pub fn skew(mut self, degrees: f32) -> Self {
        self.skew = Some(degrees);
        self
    }

    pub fn embolden(mut self, strength_px: f32) -> Self {
        self.embolden = Some(strength_px);
        self
    }

    pub fn offset(mut self, dx: f32, dy: f32) -> Self {
        self.offset = (dx, dy);
        self
    }
}

/// Scale `outline` to `size_px` pixels per em.
///
/// Fails with [`ScaleError::InvalidSize`] unless `size_px` is finite and
/// positive, and with [`LoadError::InvalidFont`] when `units_per_em` is zero.
pub fn scale(
    outline: &Outline,
    size_px: f32,
    units_per_em: u16,
    options: &ScaleOptions,
) -> Result<ScaledOutline> {
    let mut out = ScaledOutline::new();
    scale_into(
        outline,
        size_px,
        units_per_em,
        options,
        &mut out,
        &mut Scratch::new(),
    )?;
    Ok(out)
}

/// Like [`scale`], writing into a reused outline.
pub fn scale_into(
    outline: &Outline,
    size_px: f32,
    units_per_em: u16,
    options: &ScaleOptions,
    out: &mut ScaledOutline,
    scratch: &mut Scratch,
) -> Result<()> {
    if !(size_px.is_finite() && size_px > 0.0) {
        return Err(ScaleError::InvalidSize(size_px));
    }
    if units_per_em == 0 {
        return Err(LoadError::InvalidFont("units per em is zero".into()).into());
    }

    out.clear();
    let factor = size_px * 64.0 / units_per_em as f32;
    let shear = options
        .skew
        .map(|degrees| degrees.to_radians().tan())
        .filter(|t| t.is_finite())
        .unwrap_or(0.0);

    let (points, ends) = out.parts_mut();
    points.extend(outline.points().iter().map(|p| {
        let x = p.x as f32 * factor;
        let y = p.y as f32 * factor;
        ScaledPoint::new(
            F26Dot6::from_raw((x + y * shear).round() as i32),
            F26Dot6::from_raw(y.round() as i32),
            p.kind,
        )
    }));
    ends.extend_from_slice(outline.contour_ends());

    if let Some(strength) = options.embolden.filter(|s| s.is_finite() && *s != 0.0) {
        embolden(out, strength, scratch);
    }
    out.set_offset(options.offset.0, options.offset.1);

    trace!(
        "Scaled {} contours / {} points at {}px (upem {})",
        out.contour_count(),
        out.point_count(),
        size_px,
        units_per_em
    );
    Ok(())
}

/// Push every contour outward by `strength_px` pixels.
///
/// Ink sides are found from the orientation of the whole outline, so outer
/// contours grow and counters shrink. Each point moves along the bisector of
/// its neighbouring edge normals, far enough that both adjacent edges end up
/// exactly `strength_px` away. Negative strengths thin the glyph.
pub fn embolden(outline: &mut ScaledOutline, strength_px: f32, scratch: &mut Scratch) {
    let total: i64 = contour_ranges(outline.contour_ends())
        .map(|range| ScaledOutline::contour_area(&outline.points()[range]))
        .sum();
    if total == 0 {
        return;
    }
    let sign = if total > 0 { 1.0 } else { -1.0 };
    let strength = strength_px * 64.0;

    let displacement = &mut scratch.displacement;
    displacement.clear();
    displacement.resize(outline.point_count(), [0.0; 2]);

    for range in contour_ranges(outline.contour_ends()) {
        let contour = &outline.points()[range.clone()];
        let n = contour.len();
        for (i, &p) in contour.iter().enumerate() {
            let distinct = |q: &ScaledPoint| q.x != p.x || q.y != p.y;
            let prev = (1..n).map(|k| contour[(i + n - k) % n]).find(distinct);
            let next = (1..n).map(|k| contour[(i + k) % n]).find(distinct);
            let (Some(prev), Some(next)) = (prev, next) else {
                continue;
            };
            let n_in = outward_normal(prev, p, sign);
            let n_out = outward_normal(p, next, sign);
            let cos = n_in[0] * n_out[0] + n_in[1] * n_out[1];
            let k = strength / (1.0 + cos).max(MITER_FLOOR);
            displacement[range.start + i] = [(n_in[0] + n_out[0]) * k, (n_in[1] + n_out[1]) * k];
        }
    }

    for (p, d) in outline.points_mut().iter_mut().zip(displacement.iter()) {
        p.x += F26Dot6::from_raw(d[0].round() as i32);
        p.y += F26Dot6::from_raw(d[1].round() as i32);
    }
}

fn outward_normal(from: ScaledPoint, to: ScaledPoint, sign: f32) -> [f32; 2] {
    let dx = (to.x - from.x).raw() as f32;
    let dy = (to.y - from.y).raw() as f32;
    let len = (dx * dx + dy * dy).sqrt();
    [sign * dy / len, -sign * dx / len]
}
