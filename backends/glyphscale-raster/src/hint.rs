//! Grid fitting that never changes topology
//!
//! Small glyphs look crisp when their flat edges sit on pixel boundaries.
//! The fitter works one axis at a time:
//!
//! 1. Reference lines (baseline, x-height, cap height, ascender) are rounded
//!    to whole pixels first.
//! 2. Near-horizontal edges between two on-curve points snap to a reference
//!    line when they are within half a pixel of one, otherwise to the nearest
//!    whole pixel. Near-vertical edges snap to the nearest whole pixel.
//!    Opposite edges of a stem thinner than two pixels never collapse onto
//!    each other; the stem keeps at least one pixel.
//! 3. On-curve vertical extrema near a reference line (round overshoots)
//!    snap onto it.
//! 4. Every point not touched above is interpolated between its touched
//!    neighbours in the same contour, so curves and their control points
//!    follow the edges they hang from.
//!
//! Only coordinates change. A contour whose winding would flip or collapse
//! is restored to its unfitted shape.

use glyphscale_core::outline::contour_ranges;
use glyphscale_core::FontMetrics;
use log::{trace, warn};

use crate::context::Scratch;
use crate::fixed::F26Dot6;
use crate::scaled::{polygon_area, HintedOutline, ScaledOutline, ScaledPoint};

/// Distance within which an edge is pulled onto a reference line (1/2 px)
const ZONE_REACH: i32 = 32;

/// An edge counts as horizontal (or vertical) when its run is at least this
/// many times its rise
const SLOPE_RATIO: i32 = 8;

/// Stems narrower than this get the one-pixel minimum
const THIN_STEM: i32 = 128;

const PIXEL: i32 = 64;

/// Reference lines the fitter aligns to, in device space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintSettings {
    reference_lines: Vec<F26Dot6>,
}

impl Default for HintSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl HintSettings {
    /// Baseline only.
    pub fn new() -> Self {
        Self {
            reference_lines: vec![F26Dot6::ZERO],
        }
    }

    /// Baseline plus the vertical metrics of a font at `size_px`: x-height,
    /// cap height, ascender and descender.
    pub fn from_metrics(metrics: &FontMetrics, size_px: f32) -> Self {
        let mut settings = Self::new();
        if metrics.units_per_em == 0 {
            return settings;
        }
        let scale = size_px / metrics.units_per_em as f32;
        let lines = [
            metrics.x_height,
            metrics.cap_height,
            Some(metrics.ascender),
            Some(metrics.descender),
        ];
        for line in lines.into_iter().flatten() {
            let y = line * scale;
            if y.is_finite() && y != 0.0 {
                settings = settings.with_line(F26Dot6::from_float(y));
            }
        }
        settings
    }

    /// Add a reference line; duplicates are ignored.
    pub fn with_line(mut self, y: F26Dot6) -> Self {
        if !self.reference_lines.contains(&y) {
            self.reference_lines.push(y);
        }
        self
    }

    pub fn reference_lines(&self) -> &[F26Dot6] {
        &self.reference_lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    #[inline]
    fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    #[inline]
    fn of(self, p: &ScaledPoint) -> i32 {
        match self {
            Axis::X => p.x.raw(),
            Axis::Y => p.y.raw(),
        }
    }

    #[inline]
    fn set(self, p: &mut ScaledPoint, value: i32) {
        match self {
            Axis::X => p.x = F26Dot6::from_raw(value),
            Axis::Y => p.y = F26Dot6::from_raw(value),
        }
    }
}

/// An axis-aligned edge between two consecutive on-curve points
#[derive(Debug, Clone, Copy)]
struct Stem {
    first: usize,
    second: usize,
    pos: i32,
    target: i32,
    lo: i32,
    hi: i32,
    direction: i8,
}

/// Buffers for [`hint`], owned by [`Scratch`]
#[derive(Debug, Clone, Default)]
pub(crate) struct HintScratch {
    original: Vec<ScaledPoint>,
    touched: Vec<[bool; 2]>,
    stems: Vec<Stem>,
    zones: Vec<(i32, i32)>,
}

impl HintScratch {
    pub(crate) fn clear(&mut self) {
        self.original.clear();
        self.touched.clear();
        self.stems.clear();
        self.zones.clear();
    }
}

/// Fit a scaled outline to the pixel grid.
pub fn hint(
    mut outline: ScaledOutline,
    settings: &HintSettings,
    scratch: &mut Scratch,
) -> HintedOutline {
    hint_in_place(&mut outline, settings, scratch);
    HintedOutline::new(outline)
}

fn hint_in_place(outline: &mut ScaledOutline, settings: &HintSettings, scratch: &mut Scratch) {
    let s = &mut scratch.hint;
    s.clear();
    if outline.is_empty() {
        return;
    }

    let contours = outline.contour_count();
    let points = outline.point_count();

    s.original.extend_from_slice(outline.points());
    s.touched.resize(points, [false; 2]);
    s.zones.extend(
        settings
            .reference_lines
            .iter()
            .map(|line| (line.raw(), line.round().raw())),
    );

    for axis in [Axis::Y, Axis::X] {
        fit_edges(outline, axis, s);
        if axis == Axis::Y {
            snap_extrema(outline, s);
        }
        interpolate(outline, axis, s);
    }
    restore_flipped_contours(outline, s);

    assert_eq!(outline.contour_count(), contours, "grid fitting changed contours");
    assert_eq!(outline.point_count(), points, "grid fitting changed points");
    trace!(
        "Grid fitted {} contours, {} stems on the last axis",
        contours,
        s.stems.len()
    );
}

#[inline]
fn round_px(raw: i32) -> i32 {
    F26Dot6::from_raw(raw).round().raw()
}

fn zone_target(pos: i32, zones: &[(i32, i32)]) -> Option<i32> {
    zones
        .iter()
        .map(|&(line, snapped)| ((pos - line).abs(), snapped))
        .filter(|&(distance, _)| distance <= ZONE_REACH)
        .min_by_key(|&(distance, _)| distance)
        .map(|(_, snapped)| snapped)
}

fn fit_edges(outline: &mut ScaledOutline, axis: Axis, s: &mut HintScratch) {
    let along = axis.other();
    s.stems.clear();

    for range in contour_ranges(outline.contour_ends()) {
        if range.len() < 2 {
            continue;
        }
        for i in range.clone() {
            let j = if i + 1 == range.end { range.start } else { i + 1 };
            let (a, b) = (s.original[i], s.original[j]);
            if !a.kind.is_on_curve() || !b.kind.is_on_curve() {
                continue;
            }
            let rise = axis.of(&b) - axis.of(&a);
            let run = along.of(&b) - along.of(&a);
            if run == 0 || rise.abs().saturating_mul(SLOPE_RATIO) > run.abs() {
                continue;
            }
            let pos = ((axis.of(&a) as i64 + axis.of(&b) as i64) >> 1) as i32;
            let target = match axis {
                Axis::Y => zone_target(pos, &s.zones).unwrap_or_else(|| round_px(pos)),
                Axis::X => round_px(pos),
            };
            s.stems.push(Stem {
                first: i,
                second: j,
                pos,
                target,
                lo: along.of(&a).min(along.of(&b)),
                hi: along.of(&a).max(along.of(&b)),
                direction: run.signum() as i8,
            });
        }
    }

    keep_stems_open(&mut s.stems);

    let ax = axis.index();
    let points = outline.points_mut();
    for stem in &s.stems {
        let delta = stem.target - stem.pos;
        for index in [stem.first, stem.second] {
            if !s.touched[index][ax] {
                axis.set(&mut points[index], axis.of(&s.original[index]) + delta);
                s.touched[index][ax] = true;
            }
        }
    }
}

/// Give thin stems at least one pixel when both sides rounded together.
fn keep_stems_open(stems: &mut [Stem]) {
    stems.sort_by_key(|stem| (stem.pos, stem.first));
    for i in 0..stems.len() {
        for j in i + 1..stems.len() {
            let (a, b) = (stems[i], stems[j]);
            let width = b.pos - a.pos;
            if width >= THIN_STEM {
                break;
            }
            let opposite = a.direction == -b.direction;
            let overlap = a.lo < b.hi && b.lo < a.hi;
            if opposite && overlap && width > 0 && b.target <= a.target {
                stems[j].target = a.target + PIXEL;
            }
        }
    }
}

fn snap_extrema(outline: &mut ScaledOutline, s: &mut HintScratch) {
    let ax = Axis::Y.index();
    let (points, ends) = outline.parts_mut();
    for range in contour_ranges(ends) {
        let n = range.len();
        if n < 3 {
            continue;
        }
        for local in 0..n {
            let index = range.start + local;
            let p = s.original[index];
            if s.touched[index][ax] || !p.kind.is_on_curve() {
                continue;
            }
            let prev = s.original[range.start + (local + n - 1) % n].y;
            let next = s.original[range.start + (local + 1) % n].y;
            let top = p.y >= prev && p.y >= next;
            let bottom = p.y <= prev && p.y <= next;
            if !(top || bottom) || (p.y == prev && p.y == next) {
                continue;
            }
            if let Some(target) = zone_target(p.y.raw(), &s.zones) {
                points[index].y = F26Dot6::from_raw(target);
                s.touched[index][ax] = true;
            }
        }
    }
}

/// Move untouched points along with their touched neighbours.
///
/// Points between two touched points keep their relative position when they
/// lie between them on this axis, and follow the nearer one otherwise.
/// Contours without touched points shift so their minimum lands on the grid;
/// when nothing at all was touched the whole outline shifts by the rounding
/// of its overall minimum.
fn interpolate(outline: &mut ScaledOutline, axis: Axis, s: &HintScratch) {
    let ax = axis.index();
    let (points, ends) = outline.parts_mut();

    if !s.touched.iter().any(|t| t[ax]) {
        if let Some(min) = s.original.iter().map(|p| axis.of(p)).min() {
            let delta = round_px(min) - min;
            for (p, o) in points.iter_mut().zip(&s.original) {
                axis.set(p, axis.of(o) + delta);
            }
        }
        return;
    }

    for range in contour_ranges(ends) {
        let n = range.len();
        let Some(first) = (0..n).find(|&k| s.touched[range.start + k][ax]) else {
            let min = s.original[range.clone()]
                .iter()
                .map(|p| axis.of(p))
                .min()
                .unwrap_or(0);
            let delta = round_px(min) - min;
            for index in range.clone() {
                axis.set(&mut points[index], axis.of(&s.original[index]) + delta);
            }
            continue;
        };

        let mut anchor = first;
        for step in 1..=n {
            let local = (first + step) % n;
            if !s.touched[range.start + local][ax] {
                continue;
            }
            let (a, b) = (range.start + anchor, range.start + local);
            let mut k = (anchor + 1) % n;
            while k != local {
                let index = range.start + k;
                let value = interpolate_one(
                    axis.of(&s.original[index]),
                    (axis.of(&s.original[a]), axis.of(&points[a])),
                    (axis.of(&s.original[b]), axis.of(&points[b])),
                );
                axis.set(&mut points[index], value);
                k = (k + 1) % n;
            }
            anchor = local;
        }
    }
}

/// New coordinate of a point with original coordinate `o` between two
/// anchors given as `(original, fitted)`.
fn interpolate_one(o: i32, a: (i32, i32), b: (i32, i32)) -> i32 {
    let (lo, hi) = if a.0 <= b.0 { (a, b) } else { (b, a) };
    if o <= lo.0 || lo.0 == hi.0 {
        return o + lo.1 - lo.0;
    }
    if o >= hi.0 {
        return o + hi.1 - hi.0;
    }
    let span = (hi.0 - lo.0) as i64;
    let num = (o - lo.0) as i64 * (hi.1 - lo.1) as i64;
    lo.1 + (num + span / 2).div_euclid(span) as i32
}

fn restore_flipped_contours(outline: &mut ScaledOutline, s: &HintScratch) {
    let (points, ends) = outline.parts_mut();
    for (contour, range) in contour_ranges(ends).enumerate() {
        let before = polygon_area(
            s.original[range.clone()]
                .iter()
                .map(|p| (p.x.raw(), p.y.raw())),
            range.len(),
        );
        if before == 0 {
            continue;
        }
        let after = ScaledOutline::contour_area(&points[range.clone()]);
        if after.signum() != before.signum() {
            warn!("Grid fitting would flip contour {contour}; keeping it unfitted");
            points[range.clone()].copy_from_slice(&s.original[range]);
        }
    }
}
