//! Outlines in font design units
//!
//! A glyph arrives from the font-table layer as a flat run of points plus the
//! index of the last point of every contour. Keeping one point arena per glyph
//! lets the scaler reuse the same buffers for thousands of glyphs in a row.
//!
//! Contours follow the TrueType conventions: on-curve points sit on the final
//! path, quadratic control points between them bend it, and two quadratic
//! control points in a row imply an on-curve point halfway between them.
//! Cubic control points (CFF flavoured outlines) always come in pairs.

use crate::error::OutlineError;

/// Role of a point inside a contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    /// Lies on the rendered path
    OnCurve,
    /// Quadratic Bézier control point
    OffCurveQuadratic,
    /// One of the two control points of a cubic Bézier
    OffCurveCubic,
}

impl PointKind {
    #[inline]
    pub fn is_on_curve(self) -> bool {
        matches!(self, PointKind::OnCurve)
    }
}

/// A point in font design units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub kind: PointKind,
}

impl Point {
    pub const fn on(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            kind: PointKind::OnCurve,
        }
    }

    pub const fn off(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            kind: PointKind::OffCurveQuadratic,
        }
    }

    pub const fn cubic(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            kind: PointKind::OffCurveCubic,
        }
    }
}

/// Integer bounding box, `x_min..=x_max` by `y_min..=y_max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl Bounds {
    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }

    /// Bounds of a set of coordinates, `None` when the iterator is empty.
    pub fn from_coords(coords: impl IntoIterator<Item = (i32, i32)>) -> Option<Self> {
        let mut coords = coords.into_iter();
        let (x, y) = coords.next()?;
        let mut bounds = Bounds {
            x_min: x,
            y_min: y,
            x_max: x,
            y_max: y,
        };
        for (x, y) in coords {
            bounds.x_min = bounds.x_min.min(x);
            bounds.y_min = bounds.y_min.min(y);
            bounds.x_max = bounds.x_max.max(x);
            bounds.y_max = bounds.y_max.max(y);
        }
        Some(bounds)
    }
}

/// A glyph outline in font design units
///
/// Built either contour by contour:
///
/// ```rust
/// use glyphscale_core::outline::{Outline, Point};
///
/// let mut outline = Outline::new();
/// outline.begin_contour();
/// outline.push_point(Point::on(0, 0));
/// outline.push_point(Point::on(0, 100));
/// outline.push_point(Point::on(100, 100));
/// outline.end_contour();
/// assert_eq!(outline.contour_count(), 1);
/// ```
///
/// or in one go with [`Outline::push_contour`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    points: Vec<Point>,
    contour_ends: Vec<usize>,
    contour_start: usize,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the outline while keeping its allocations.
    pub fn clear(&mut self) {
        self.points.clear();
        self.contour_ends.clear();
        self.contour_start = 0;
    }

    pub fn begin_contour(&mut self) {
        self.contour_start = self.points.len();
    }

    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Close the contour opened by the last [`Outline::begin_contour`].
    ///
    /// A contour without points is dropped.
    pub fn end_contour(&mut self) {
        if self.points.len() > self.contour_start {
            self.contour_ends.push(self.points.len() - 1);
        }
        self.contour_start = self.points.len();
    }

    pub fn push_contour(&mut self, points: impl IntoIterator<Item = Point>) {
        self.begin_contour();
        self.points.extend(points);
        self.end_contour();
    }

    /// Replace the content with raw point and contour-end arrays.
    ///
    /// Nothing is checked here; call [`Outline::validate`] afterwards when the
    /// data comes from an untrusted source.
    pub fn set_raw(&mut self, points: &[Point], contour_ends: &[usize]) {
        self.clear();
        self.points.extend_from_slice(points);
        self.contour_ends.extend_from_slice(contour_ends);
        self.contour_start = self.points.len();
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
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

    /// Iterate over the contours as point slices.
    pub fn contours(&self) -> impl Iterator<Item = &[Point]> + '_ {
        contour_ranges(&self.contour_ends).map(move |range| &self.points[range])
    }

    /// Control box of every point, including off-curve ones.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_coords(self.points.iter().map(|p| (p.x, p.y)))
    }

    /// Check the structural rules every consumer of an outline relies on.
    pub fn validate(&self) -> Result<(), OutlineError> {
        let points = self.points.len();
        let mut start = 0usize;
        for (contour, &end) in self.contour_ends.iter().enumerate() {
            if end >= points {
                return Err(OutlineError::EndOutOfRange { end, points });
            }
            if end < start {
                return Err(OutlineError::UnorderedEnds { contour });
            }
            let slice = &self.points[start..=end];
            if !slice.iter().any(|p| p.kind.is_on_curve()) {
                return Err(OutlineError::NoOnCurvePoint { contour });
            }
            if !cubic_runs_paired(slice) {
                return Err(OutlineError::UnpairedCubic { contour });
            }
            start = end + 1;
        }
        if start < points {
            return Err(OutlineError::TrailingPoints {
                count: points - start,
            });
        }
        Ok(())
    }
}

/// Point index ranges of each contour, given the inclusive end indices.
pub fn contour_ranges(ends: &[usize]) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
    let mut start = 0;
    ends.iter().map(move |&end| {
        let range = start..end + 1;
        start = end + 1;
        range
    })
}

fn cubic_runs_paired(contour: &[Point]) -> bool {
    // Rotate so the walk starts just after an on-curve point; runs then
    // never wrap around the end of the slice.
    let Some(first_on) = contour.iter().position(|p| p.kind.is_on_curve()) else {
        return false;
    };
    let n = contour.len();
    let mut run = 0;
    for i in 1..=n {
        match contour[(first_on + i) % n].kind {
            PointKind::OffCurveCubic => run += 1,
            _ => {
                if run != 0 && run != 2 {
                    return false;
                }
                run = 0;
            }
        }
    }
    true
}

/// Anything a contour walk can treat as a point
pub trait ContourPoint: Copy + PartialEq {
    fn kind(&self) -> PointKind;

    /// The implied on-curve point between two quadratic control points.
    fn midpoint(a: Self, b: Self) -> Self;
}

impl ContourPoint for Point {
    #[inline]
    fn kind(&self) -> PointKind {
        self.kind
    }

    #[inline]
    fn midpoint(a: Self, b: Self) -> Self {
        Point::on((a.x + b.x).div_euclid(2), (a.y + b.y).div_euclid(2))
    }
}

/// One piece of a contour with implied points resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<P> {
    Line(P, P),
    Quad(P, P, P),
    Cubic(P, P, P, P),
}

/// Walk a closed contour as lines and curves.
///
/// The walk starts at the first on-curve point. A contour made only of
/// quadratic control points starts at the implied midpoint between its last
/// and first point. The closing line back to the start is emitted only when
/// the last segment does not already end there.
pub fn segments<P: ContourPoint>(contour: &[P]) -> Segments<'_, P> {
    let n = contour.len();
    let (start, begin, total) = match contour.iter().position(|p| p.kind().is_on_curve()) {
        Some(i) => (Some(contour[i]), i + 1, n.saturating_sub(1)),
        None if n > 0 => (Some(P::midpoint(contour[n - 1], contour[0])), 0, n),
        None => (None, 0, 0),
    };
    Segments {
        points: contour,
        start,
        current: start,
        begin,
        consumed: 0,
        total,
    }
}

/// Iterator returned by [`segments`]
#[derive(Debug, Clone)]
pub struct Segments<'a, P> {
    points: &'a [P],
    start: Option<P>,
    current: Option<P>,
    begin: usize,
    consumed: usize,
    total: usize,
}

impl<P: ContourPoint> Segments<'_, P> {
    fn peek(&self) -> Option<P> {
        if self.consumed < self.total {
            Some(self.points[(self.begin + self.consumed) % self.points.len()])
        } else {
            None
        }
    }

    fn take(&mut self) -> Option<P> {
        let p = self.peek()?;
        self.consumed += 1;
        Some(p)
    }

    /// Next on-curve end point after a control point, consuming it when it is
    /// explicit. Past the last point the contour wraps to its start.
    fn end_after(&mut self, control: P, start: P) -> P {
        match self.peek() {
            Some(next) if next.kind().is_on_curve() => {
                self.consumed += 1;
                next
            }
            Some(next) => P::midpoint(control, next),
            None => start,
        }
    }
}

impl<P: ContourPoint> Iterator for Segments<'_, P> {
    type Item = Segment<P>;

    fn next(&mut self) -> Option<Segment<P>> {
        let start = self.start?;
        let from = self.current?;
        let Some(p) = self.take() else {
            self.current = None;
            return (from != start).then_some(Segment::Line(from, start));
        };
        let segment = match p.kind() {
            PointKind::OnCurve => Segment::Line(from, p),
            PointKind::OffCurveQuadratic => {
                let to = self.end_after(p, start);
                Segment::Quad(from, p, to)
            }
            PointKind::OffCurveCubic => {
                let c2 = self.take().unwrap_or(p);
                let to = self.end_after(c2, start);
                Segment::Cubic(from, p, c2, to)
            }
        };
        self.current = Some(match segment {
            Segment::Line(_, to) | Segment::Quad(_, _, to) | Segment::Cubic(_, _, _, to) => to,
        });
        Some(segment)
    }
}

/// Font-wide metrics in design units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
    pub units_per_em: u16,
    /// Union of all glyph bounds, when the font records one
    pub bounds: Option<Bounds>,
    pub ascender: f32,
    pub descender: f32,
    pub cap_height: Option<f32>,
    pub x_height: Option<f32>,
}

/// Metrics of a single glyph in design units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    pub units_per_em: u16,
    pub advance_width: f32,
    /// Control box of the glyph outline, `None` for empty glyphs
    pub bounds: Option<Bounds>,
    pub font_bounds: Option<Bounds>,
}

impl GlyphMetrics {
    /// Advance width in pixels for a given size.
    pub fn scaled_advance(&self, size_px: f32) -> f32 {
        if self.units_per_em == 0 {
            return 0.0;
        }
        self.advance_width * size_px / self.units_per_em as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Outline {
        let mut outline = Outline::new();
        outline.push_contour([
            Point::on(0, 0),
            Point::on(0, 100),
            Point::on(100, 100),
            Point::on(100, 0),
        ]);
        outline
    }

    #[test]
    fn test_builder_records_contour_ends() {
        let mut outline = square();
        outline.push_contour([Point::on(10, 10), Point::off(20, 30), Point::on(30, 10)]);
        assert_eq!(outline.contour_ends(), &[3, 6]);
        assert_eq!(outline.point_count(), 7);
        assert_eq!(outline.contours().count(), 2);
    }

    #[test]
    fn test_empty_contour_is_dropped() {
        let mut outline = Outline::new();
        outline.begin_contour();
        outline.end_contour();
        assert!(outline.is_empty());
        assert_eq!(outline.bounds(), None);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut outline = square();
        let capacity = outline.points.capacity();
        outline.clear();
        assert!(outline.is_empty());
        assert_eq!(outline.point_count(), 0);
        assert_eq!(outline.points.capacity(), capacity);
    }

    #[test]
    fn test_bounds_include_control_points() {
        let mut outline = Outline::new();
        outline.push_contour([Point::on(0, 0), Point::off(50, 120), Point::on(100, 0)]);
        assert_eq!(
            outline.bounds(),
            Some(Bounds {
                x_min: 0,
                y_min: 0,
                x_max: 100,
                y_max: 120
            })
        );
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert_eq!(square().validate(), Ok(()));
        let mut cubic = Outline::new();
        cubic.push_contour([
            Point::on(0, 0),
            Point::cubic(0, 50),
            Point::cubic(50, 100),
            Point::on(100, 100),
        ]);
        assert_eq!(cubic.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_structure() {
        let mut outline = Outline::new();
        outline.set_raw(&[Point::on(0, 0)], &[3]);
        assert_eq!(
            outline.validate(),
            Err(OutlineError::EndOutOfRange { end: 3, points: 1 })
        );

        outline.set_raw(&[Point::off(0, 0), Point::off(5, 5)], &[1]);
        assert_eq!(
            outline.validate(),
            Err(OutlineError::NoOnCurvePoint { contour: 0 })
        );

        outline.set_raw(
            &[Point::on(0, 0), Point::cubic(5, 5), Point::on(10, 0)],
            &[2],
        );
        assert_eq!(
            outline.validate(),
            Err(OutlineError::UnpairedCubic { contour: 0 })
        );

        outline.set_raw(&[Point::on(0, 0), Point::on(5, 5)], &[0]);
        assert_eq!(
            outline.validate(),
            Err(OutlineError::TrailingPoints { count: 1 })
        );
    }

    #[test]
    fn test_segments_polygon_closes() {
        let outline = square();
        let contour = outline.contours().next().unwrap_or_default();
        let segs: Vec<_> = segments(contour).collect();
        assert_eq!(segs.len(), 4);
        assert_eq!(
            segs[3],
            Segment::Line(Point::on(100, 0), Point::on(0, 0))
        );
    }

    #[test]
    fn test_segments_implied_midpoint() {
        let contour = [
            Point::on(0, 0),
            Point::off(0, 100),
            Point::off(100, 100),
            Point::on(100, 0),
        ];
        let segs: Vec<_> = segments(&contour).collect();
        assert_eq!(
            segs,
            vec![
                Segment::Quad(Point::on(0, 0), Point::off(0, 100), Point::on(50, 100)),
                Segment::Quad(Point::on(50, 100), Point::off(100, 100), Point::on(100, 0)),
                Segment::Line(Point::on(100, 0), Point::on(0, 0)),
            ]
        );
    }

    #[test]
    fn test_segments_start_at_first_on_curve() {
        // Leading control point wraps around to close the contour.
        let contour = [Point::off(50, 100), Point::on(100, 0), Point::on(0, 0)];
        let segs: Vec<_> = segments(&contour).collect();
        assert_eq!(
            segs,
            vec![
                Segment::Line(Point::on(100, 0), Point::on(0, 0)),
                Segment::Quad(Point::on(0, 0), Point::off(50, 100), Point::on(100, 0)),
            ]
        );
    }

    #[test]
    fn test_segments_all_off_curve() {
        let contour = [
            Point::off(0, 0),
            Point::off(0, 100),
            Point::off(100, 100),
            Point::off(100, 0),
        ];
        let segs: Vec<_> = segments(&contour).collect();
        assert_eq!(segs.len(), 4);
        assert!(segs.iter().all(|s| matches!(s, Segment::Quad(..))));
        assert_eq!(segs[0], Segment::Quad(Point::on(50, 0), Point::off(0, 0), Point::on(0, 50)));
    }

    #[test]
    fn test_segments_cubic() {
        let contour = [
            Point::on(0, 0),
            Point::cubic(0, 50),
            Point::cubic(50, 100),
            Point::on(100, 100),
        ];
        let segs: Vec<_> = segments(&contour).collect();
        assert_eq!(segs.len(), 2);
        assert!(matches!(segs[0], Segment::Cubic(..)));
        assert_eq!(
            segs[1],
            Segment::Line(Point::on(100, 100), Point::on(0, 0))
        );
    }

    #[test]
    fn test_segments_empty_contour() {
        let contour: [Point; 0] = [];
        assert_eq!(segments(&contour).count(), 0);
    }

    #[test]
    fn test_scaled_advance() {
        let metrics = GlyphMetrics {
            units_per_em: 1000,
            advance_width: 500.0,
            ..Default::default()
        };
        assert!((metrics.scaled_advance(14.0) - 7.0).abs() < 1e-6);
    }
}
