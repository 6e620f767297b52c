//! Outlines in device space
//!
//! A [`ScaledOutline`] mirrors the font-unit [`Outline`] point for point: the
//! same contours, the same point kinds, coordinates in 26.6 pixels. The
//! subpixel offset a caller asked for travels alongside the points instead of
//! being added to them, so grid fitting sees the glyph at its true origin
//! and the rasterizer accounts for the shift in the mask placement.
//!
//! [`Outline`]: glyphscale_core::Outline

use std::ops::Deref;

use glyphscale_core::outline::{contour_ranges, ContourPoint, PointKind};
use glyphscale_core::{Result, ScaleError};

use crate::fixed::F26Dot6;

/// A point in device space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaledPoint {
    pub x: F26Dot6,
    pub y: F26Dot6,
    pub kind: PointKind,
}

impl ScaledPoint {
    pub fn new(x: F26Dot6, y: F26Dot6, kind: PointKind) -> Self {
        Self { x, y, kind }
    }
}

impl ContourPoint for ScaledPoint {
    #[inline]
    fn kind(&self) -> PointKind {
        self.kind
    }

    #[inline]
    fn midpoint(a: Self, b: Self) -> Self {
        ScaledPoint::new(a.x.midpoint(b.x), a.y.midpoint(b.y), PointKind::OnCurve)
    }
}

/// Control box in 26.6 pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedBounds {
    pub x_min: F26Dot6,
    pub y_min: F26Dot6,
    pub x_max: F26Dot6,
    pub y_max: F26Dot6,
}

/// An outline scaled to device pixels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaledOutline {
    points: Vec<ScaledPoint>,
    contour_ends: Vec<usize>,
    offset: (F26Dot6, F26Dot6),
}

impl ScaledOutline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the outline, keeping allocations.
    pub fn clear(&mut self) {
        self.points.clear();
        self.contour_ends.clear();
        self.offset = (F26Dot6::ZERO, F26Dot6::ZERO);
    }

    /// Build from raw parts; `contour_ends` holds inclusive end indices.
    pub fn from_parts(points: Vec<ScaledPoint>, contour_ends: Vec<usize>) -> Self {
        Self {
            points,
            contour_ends,
            offset: (F26Dot6::ZERO, F26Dot6::ZERO),
        }
    }

    #[inline]
    pub fn points(&self) -> &[ScaledPoint] {
        &self.points
    }

    #[inline]
    pub(crate) fn points_mut(&mut self) -> &mut [ScaledPoint] {
        &mut self.points
    }

    #[inline]
    pub(crate) fn parts_mut(&mut self) -> (&mut Vec<ScaledPoint>, &mut Vec<usize>) {
        (&mut self.points, &mut self.contour_ends)
    }

    #[inline]
    pub fn contour_ends(&self) -> &[usize] {
        &self.contour_ends
    }

    #[inline]
    pub fn contour_count(&self) -> usize {
        self.contour_ends.len()
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contour_ends.is_empty()
    }

    pub fn contours(&self) -> impl Iterator<Item = &[ScaledPoint]> + '_ {
        contour_ranges(&self.contour_ends).map(move |range| &self.points[range])
    }

    /// Subpixel offset applied at rasterization time.
    #[inline]
    pub fn offset(&self) -> (F26Dot6, F26Dot6) {
        self.offset
    }

    /// Record a fractional pen offset.
    ///
    /// Each component is wrapped into `[0, 1)` and kept to whole 1/64ths.
    pub fn set_offset(&mut self, dx: f32, dy: f32) {
        self.offset = (wrap_offset(dx), wrap_offset(dy));
    }

    /// Control box of all points, offset not included.
    pub fn bounds(&self) -> Option<FixedBounds> {
        let first = self.points.first()?;
        let mut b = FixedBounds {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };
        for p in &self.points[1..] {
            b.x_min = b.x_min.min(p.x);
            b.y_min = b.y_min.min(p.y);
            b.x_max = b.x_max.max(p.x);
            b.y_max = b.y_max.max(p.y);
        }
        Some(b)
    }

    /// Rescale an already scaled outline by `factor`.
    pub fn rescale(&self, factor: f32) -> Result<ScaledOutline> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ScaleError::InvalidSize(factor));
        }
        let points = self
            .points
            .iter()
            .map(|p| {
                ScaledPoint::new(
                    F26Dot6::from_raw((p.x.raw() as f32 * factor).round() as i32),
                    F26Dot6::from_raw((p.y.raw() as f32 * factor).round() as i32),
                    p.kind,
                )
            })
            .collect();
        Ok(ScaledOutline {
            points,
            contour_ends: self.contour_ends.clone(),
            offset: self.offset,
        })
    }

    /// Twice the signed area of a contour's control polygon, raw units.
    ///
    /// Positive for counter-clockwise contours (y up).
    pub(crate) fn contour_area(points: &[ScaledPoint]) -> i64 {
        polygon_area(points.iter().map(|p| (p.x.raw(), p.y.raw())), points.len())
    }
}

/// Twice the signed shoelace area of a closed polygon.
pub(crate) fn polygon_area(coords: impl Iterator<Item = (i32, i32)> + Clone, len: usize) -> i64 {
    if len < 3 {
        return 0;
    }
    let next = coords.clone().cycle().skip(1);
    coords
        .zip(next)
        .map(|((x0, y0), (x1, y1))| x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64)
        .sum()
}

fn wrap_offset(v: f32) -> F26Dot6 {
    if !v.is_finite() {
        return F26Dot6::ZERO;
    }
    let frac = v.rem_euclid(1.0);
    F26Dot6::from_raw(((frac * 64.0).floor() as i32).clamp(0, 63))
}

/// A scaled outline that went through grid fitting
///
/// Only coordinates differ from the [`ScaledOutline`] it came from; the
/// point and contour structure is untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintedOutline(ScaledOutline);

impl HintedOutline {
    pub(crate) fn new(outline: ScaledOutline) -> Self {
        Self(outline)
    }

    pub fn into_inner(self) -> ScaledOutline {
        self.0
    }
}

impl Deref for HintedOutline {
    type Target = ScaledOutline;

    fn deref(&self) -> &ScaledOutline {
        &self.0
    }
}
