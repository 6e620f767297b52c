//! Curve flattening by recursive de Casteljau subdivision
//!
//! The scan converter only understands straight lines. Quadratic and cubic
//! Béziers are split in half until their control polygon hugs the chord,
//! then replaced by that chord. Everything runs in 26.6 integers, so the
//! same curve always yields the same polyline.

use crate::fixed::F26Dot6;

/// Largest accepted control-point deviation from the chord, Manhattan metric
///
/// Four units is 1/16 px. The curve itself strays at most half as far from
/// its control polygon, so the flattened path stays within 1/32 px.
pub const FLATNESS_THRESHOLD: F26Dot6 = F26Dot6::from_raw(4);

/// Recursion cap for degenerate or enormous curves
pub const MAX_DEPTH: u32 = 16;

/// A point in 26.6 device space
pub type FixedPoint = (F26Dot6, F26Dot6);

#[inline]
fn mid(a: FixedPoint, b: FixedPoint) -> FixedPoint {
    (a.0.midpoint(b.0), a.1.midpoint(b.1))
}

#[inline]
fn manhattan(a: FixedPoint, bx: i64, by: i64) -> i64 {
    (a.0.raw() as i64 - bx).abs() + (a.1.raw() as i64 - by).abs()
}

/// How far the control point of a quadratic pulls away from the chord.
pub fn quadratic_flatness(p0: FixedPoint, p1: FixedPoint, p2: FixedPoint) -> F26Dot6 {
    let mx = (p0.0.raw() as i64 + p2.0.raw() as i64) / 2;
    let my = (p0.1.raw() as i64 + p2.1.raw() as i64) / 2;
    F26Dot6::from_raw(manhattan(p1, mx, my).min(i32::MAX as i64) as i32)
}

/// How far the control points of a cubic stray from the chord's thirds.
///
/// A straight cubic with evenly spaced control points measures zero.
pub fn cubic_flatness(
    p0: FixedPoint,
    p1: FixedPoint,
    p2: FixedPoint,
    p3: FixedPoint,
) -> F26Dot6 {
    let (x0, y0) = (p0.0.raw() as i64, p0.1.raw() as i64);
    let (x3, y3) = (p3.0.raw() as i64, p3.1.raw() as i64);
    let d1 = manhattan(p1, (2 * x0 + x3) / 3, (2 * y0 + y3) / 3);
    let d2 = manhattan(p2, (x0 + 2 * x3) / 3, (y0 + 2 * y3) / 3);
    F26Dot6::from_raw(d1.max(d2).min(i32::MAX as i64) as i32)
}

/// Flatten a quadratic, emitting every polyline vertex after `p0`.
pub fn flatten_quadratic<F>(p0: FixedPoint, p1: FixedPoint, p2: FixedPoint, output: &mut F)
where
    F: FnMut(FixedPoint),
{
    subdivide_quadratic(p0, p1, p2, output, 0);
}

fn subdivide_quadratic<F>(
    p0: FixedPoint,
    p1: FixedPoint,
    p2: FixedPoint,
    output: &mut F,
    depth: u32,
) where
    F: FnMut(FixedPoint),
{
    if depth >= MAX_DEPTH || quadratic_flatness(p0, p1, p2) <= FLATNESS_THRESHOLD {
        output(p2);
        return;
    }

    let m01 = mid(p0, p1);
    let m12 = mid(p1, p2);
    let m012 = mid(m01, m12);

    subdivide_quadratic(p0, m01, m012, output, depth + 1);
    subdivide_quadratic(m012, m12, p2, output, depth + 1);
}

/// Flatten a cubic, emitting every polyline vertex after `p0`.
pub fn flatten_cubic<F>(
    p0: FixedPoint,
    p1: FixedPoint,
    p2: FixedPoint,
    p3: FixedPoint,
    output: &mut F,
) where
    F: FnMut(FixedPoint),
{
    subdivide_cubic(p0, p1, p2, p3, output, 0);
}

fn subdivide_cubic<F>(
    p0: FixedPoint,
    p1: FixedPoint,
    p2: FixedPoint,
    p3: FixedPoint,
    output: &mut F,
    depth: u32,
) where
    F: FnMut(FixedPoint),
{
    if depth >= MAX_DEPTH || cubic_flatness(p0, p1, p2, p3) <= FLATNESS_THRESHOLD {
        output(p3);
        return;
    }

    let m01 = mid(p0, p1);
    let m12 = mid(p1, p2);
    let m23 = mid(p2, p3);
    let m012 = mid(m01, m12);
    let m123 = mid(m12, m23);
    let m0123 = mid(m012, m123);

    subdivide_cubic(p0, m01, m012, m0123, output, depth + 1);
    subdivide_cubic(m0123, m123, m23, p3, output, depth + 1);
}
