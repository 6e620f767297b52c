//! Scan conversion: scaled outlines become coverage masks
//!
//! Curves are flattened into line segments, segments become edges, and the
//! mask is swept one row at a time. Each edge deposits the signed area it
//! covers inside the row into an accumulation buffer; a running sum along the
//! row then yields exact coverage for every pixel. Coverage uses the nonzero
//! rule: overlapping contours never darken beyond full ink, and counters
//! wound the other way cancel out.
//!
//! Subpixel masks run the sweep three times with the outline nudged by a
//! third of a pixel, once per color channel.

use glyphscale_core::outline::{segments, Segment};
use glyphscale_core::{Format, Placement};
use log::trace;

use crate::context::Scratch;
use crate::curves::{flatten_cubic, flatten_quadratic, FixedPoint};
use crate::edge::EdgeTable;
use crate::fixed::F26Dot6;
use crate::scaled::{ScaledOutline, ScaledPoint};

/// One third of a pixel in 26.6
const SUBPIXEL_PHASE: i32 = 21;

/// Horizontal shift per channel of a subpixel mask, in raw 26.6 units
const CHANNEL_SHIFTS: [i32; 3] = [SUBPIXEL_PHASE, 0, -SUBPIXEL_PHASE];

/// A coverage mask plus where it sits
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask {
    pub format: Format,
    pub placement: Placement,
    /// Rows top to bottom, `format.bytes_per_pixel()` bytes per pixel
    pub data: Vec<u8>,
}

impl Mask {
    #[inline]
    pub fn width(&self) -> u32 {
        self.placement.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.placement.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Render `outline` into a freshly allocated mask.
pub fn rasterize(outline: &ScaledOutline, format: Format) -> Mask {
    let mut data = Vec::new();
    let placement = rasterize_into(outline, format, &mut Scratch::new(), &mut data);
    Mask {
        format,
        placement,
        data,
    }
}

/// Render `outline` into `out`, reusing its allocation.
///
/// The mask covers the outline's control box, shifted by the outline's
/// subpixel offset, rounded outward to whole pixels. An outline that
/// covers no pixel at all, whether its box is flat or its contours cancel,
/// leaves `out` empty and returns a zero placement.
///
/// # Panics
///
/// When the outline's last contour end does not match its point count.
pub fn rasterize_into(
    outline: &ScaledOutline,
    format: Format,
    scratch: &mut Scratch,
    out: &mut Vec<u8>,
) -> Placement {
    out.clear();
    if let Some(&last) = outline.contour_ends().last() {
        assert_eq!(
            last + 1,
            outline.point_count(),
            "contour ends do not cover the outline"
        );
    }
    let Some(bounds) = outline.bounds() else {
        return Placement::default();
    };

    let (dx, dy) = outline.offset();
    let pad = match format {
        Format::Alpha => F26Dot6::ZERO,
        Format::Subpixel => F26Dot6::from_raw(SUBPIXEL_PHASE),
    };
    let left = (bounds.x_min + dx - pad).to_int();
    let right = (bounds.x_max + dx + pad).to_int_ceil();
    let bottom = (bounds.y_min + dy).to_int();
    let top = (bounds.y_max + dy).to_int_ceil();
    if right <= left || top <= bottom {
        return Placement::default();
    }

    let width = (right - left) as usize;
    let height = (top - bottom) as usize;
    let channels = format.bytes_per_pixel();
    out.resize(width * height * channels, 0);

    let shifts: &[i32] = match format {
        Format::Alpha => &[0],
        Format::Subpixel => &CHANNEL_SHIFTS,
    };
    for (channel, &shift) in shifts.iter().enumerate() {
        let origin = Origin {
            x: dx + F26Dot6::from_raw(shift) - F26Dot6::from_int(left),
            y: F26Dot6::from_int(top) - dy,
        };
        build_edges(outline, origin, &mut scratch.edges);
        sweep(
            &mut scratch.edges,
            &mut scratch.row,
            width,
            height,
            channel,
            channels,
            out,
        );
    }

    // Collinear contours and windings that cancel leave no ink
    if out.iter().all(|&c| c == 0) {
        out.clear();
        trace!("Outline has no ink in its {}x{} box", width, height);
        return Placement::default();
    }

    trace!(
        "Rasterized {} edges into {}x{} {:?} mask",
        scratch.edges.len(),
        width,
        height,
        format
    );
    Placement {
        left,
        top,
        width: width as u32,
        height: height as u32,
    }
}

/// Maps outline space (y up) to mask space (y down, origin at the top-left
/// corner of the mask)
#[derive(Clone, Copy)]
struct Origin {
    x: F26Dot6,
    y: F26Dot6,
}

impl Origin {
    #[inline]
    fn map(self, p: ScaledPoint) -> FixedPoint {
        (p.x + self.x, self.y - p.y)
    }
}

fn build_edges(outline: &ScaledOutline, origin: Origin, edges: &mut EdgeTable) {
    edges.clear();
    for contour in outline.contours() {
        for segment in segments(contour) {
            match segment {
                Segment::Line(a, b) => {
                    let (a, b) = (origin.map(a), origin.map(b));
                    edges.push_line(a.0, a.1, b.0, b.1);
                }
                Segment::Quad(a, c, b) => {
                    let mut last = origin.map(a);
                    flatten_quadratic(last, origin.map(c), origin.map(b), &mut |p: FixedPoint| {
                        edges.push_line(last.0, last.1, p.0, p.1);
                        last = p;
                    });
                }
                Segment::Cubic(a, c1, c2, b) => {
                    let mut last = origin.map(a);
                    flatten_cubic(
                        last,
                        origin.map(c1),
                        origin.map(c2),
                        origin.map(b),
                        &mut |p: FixedPoint| {
                            edges.push_line(last.0, last.1, p.0, p.1);
                            last = p;
                        },
                    );
                }
            }
        }
    }
    edges.finish();
}

fn sweep(
    edges: &mut EdgeTable,
    row: &mut Vec<f32>,
    width: usize,
    height: usize,
    channel: usize,
    channels: usize,
    out: &mut [u8],
) {
    row.clear();
    row.resize(width + 2, 0.0);
    let limit = width as f32;

    for y in 0..height {
        edges.advance_to(y as i32);
        for edge in edges.active() {
            if let Some((xa, ya, xb, yb)) = edge.clip_to_row(y as i32) {
                let d = (yb - ya) * f32::from(edge.direction);
                deposit(row, xa.clamp(0.0, limit), xb.clamp(0.0, limit), d);
            }
        }

        let line = &mut out[y * width * channels..(y + 1) * width * channels];
        let mut acc = 0.0f32;
        for (x, cell) in row[..width].iter().enumerate() {
            acc += cell;
            line[x * channels + channel] = (acc.abs().min(1.0) * 255.0 + 0.5) as u8;
        }
        row.fill(0.0);
    }
}

/// Add the signed area of one segment piece inside a single row.
///
/// `xa` is where the piece enters the row, `xb` where it leaves, `d` its
/// signed height. Cells right of the piece receive the full height through
/// the running sum.
fn deposit(row: &mut [f32], xa: f32, xb: f32, d: f32) {
    let (x0, x1) = if xa < xb { (xa, xb) } else { (xb, xa) };
    let x0floor = x0.floor();
    let x0i = x0floor as usize;
    let x1ceil = x1.ceil();
    let x1i = x1ceil as usize;

    if x1i <= x0i + 1 {
        let xmf = 0.5 * (xa + xb) - x0floor;
        row[x0i] += d - d * xmf;
        row[x0i + 1] += d * xmf;
        return;
    }

    let s = (x1 - x0).recip();
    let x0f = x0 - x0floor;
    let a0 = 0.5 * s * (1.0 - x0f) * (1.0 - x0f);
    let x1f = x1 - x1ceil + 1.0;
    let am = 0.5 * s * x1f * x1f;
    row[x0i] += d * a0;
    if x1i == x0i + 2 {
        row[x0i + 1] += d * (1.0 - a0 - am);
    } else {
        let a1 = s * (1.5 - x0f);
        row[x0i + 1] += d * (a1 - a0);
        for cell in &mut row[x0i + 2..x1i - 1] {
            *cell += d * s;
        }
        let a2 = a1 + (x1i - x0i - 3) as f32 * s;
        row[x1i - 1] += d * (1.0 - a2 - am);
    }
    row[x1i] += d * am;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphscale_core::PointKind;

    fn on(x: i32, y: i32) -> ScaledPoint {
        ScaledPoint::new(F26Dot6::from_raw(x), F26Dot6::from_raw(y), PointKind::OnCurve)
    }

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<ScaledPoint> {
        vec![on(x0, y0), on(x0, y1), on(x1, y1), on(x1, y0)]
    }

    fn outline(contours: Vec<Vec<ScaledPoint>>) -> ScaledOutline {
        let mut points = Vec::new();
        let mut ends = Vec::new();
        for contour in contours {
            points.extend(contour);
            ends.push(points.len() - 1);
        }
        ScaledOutline::from_parts(points, ends)
    }

    #[test]
    fn test_unit_square_is_one_full_pixel() {
        let mask = rasterize(&outline(vec![rect(0, 0, 64, 64)]), Format::Alpha);
        assert_eq!(
            mask.placement,
            Placement {
                left: 0,
                top: 1,
                width: 1,
                height: 1
            }
        );
        assert_eq!(mask.data, vec![255]);
    }

    #[test]
    fn test_half_pixel_offset_splits_coverage() {
        let mut square = outline(vec![rect(0, 0, 64, 64)]);
        square.set_offset(0.5, 0.0);
        let mask = rasterize(&square, Format::Alpha);
        assert_eq!(mask.width(), 2);
        assert_eq!(mask.height(), 1);
        assert_eq!(mask.data, vec![128, 128]);
    }

    #[test]
    fn test_counter_is_left_empty() {
        let mut inner = rect(64, 64, 128, 128);
        inner.reverse();
        let mask = rasterize(
            &outline(vec![rect(0, 0, 192, 192), inner]),
            Format::Alpha,
        );
        assert_eq!(mask.width(), 3);
        assert_eq!(mask.data, vec![255, 255, 255, 255, 0, 255, 255, 255, 255]);
    }

    #[test]
    fn test_overlap_saturates() {
        let mask = rasterize(
            &outline(vec![rect(0, 0, 64, 64), rect(0, 0, 64, 64)]),
            Format::Alpha,
        );
        assert_eq!(mask.data, vec![255]);
    }

    #[test]
    fn test_triangle_covers_half() {
        let triangle = outline(vec![vec![on(0, 0), on(0, 128), on(128, 0)]]);
        let mask = rasterize(&triangle, Format::Alpha);
        let total: u32 = mask.data.iter().map(|&c| u32::from(c)).sum();
        // 2 px^2 of ink in a 2x2 mask
        assert!((total as f32 / 255.0 - 2.0).abs() < 0.02, "total {total}");
        // Hypotenuse runs through the corners of the upper-right pixel
        assert_eq!(mask.data, vec![128, 0, 255, 128]);
    }

    #[test]
    fn test_quadratic_bump() {
        let arch = outline(vec![vec![
            on(0, 0),
            ScaledPoint::new(
                F26Dot6::from_int(2),
                F26Dot6::from_int(4),
                PointKind::OffCurveQuadratic,
            ),
            on(256, 0),
        ]]);
        let mask = rasterize(&arch, Format::Alpha);
        assert_eq!(mask.placement.top, 4);
        let total: f32 = mask.data.iter().map(|&c| f32::from(c)).sum::<f32>() / 255.0;
        // Parabolic segment area: 2/3 * base * height of the control triangle
        let expected = 2.0 / 3.0 * 4.0 * 2.0;
        assert!((total - expected).abs() / expected < 0.02, "area {total}");
    }

    #[test]
    fn test_empty_and_degenerate_outlines() {
        let mut data = vec![1, 2, 3];
        let placement = rasterize_into(
            &ScaledOutline::new(),
            Format::Alpha,
            &mut Scratch::new(),
            &mut data,
        );
        assert_eq!(placement, Placement::default());
        assert!(data.is_empty());

        let flat = outline(vec![vec![on(0, 64), on(128, 64)]]);
        let mask = rasterize(&flat, Format::Alpha);
        assert!(mask.is_empty());
        assert_eq!(mask.placement, Placement::default());
    }

    #[test]
    fn test_zero_area_contours_give_empty_mask() {
        // Points on a diagonal span a 4x4 box but enclose nothing
        let diagonal = outline(vec![vec![on(0, 0), on(128, 128), on(256, 256)]]);
        let mask = rasterize(&diagonal, Format::Alpha);
        assert!(mask.is_empty());
        assert_eq!(mask.placement, Placement::default());

        // The same square wound both ways cancels under the nonzero rule
        let mut reversed = rect(0, 0, 128, 128);
        reversed.reverse();
        let cancelled = outline(vec![rect(0, 0, 128, 128), reversed]);
        let mut scratch = Scratch::new();
        let mut data = vec![9; 4];
        for format in [Format::Alpha, Format::Subpixel] {
            let placement = rasterize_into(&cancelled, format, &mut scratch, &mut data);
            assert_eq!(placement, Placement::default());
            assert!(data.is_empty());
        }
    }

    #[test]
    fn test_bow_tie_keeps_its_ink() {
        // Self-intersecting: the lobes have opposite signed areas that sum
        // to zero, but both are inside under the nonzero rule
        let bow_tie = outline(vec![vec![on(0, 0), on(128, 128), on(128, 0), on(0, 128)]]);
        let mask = rasterize(&bow_tie, Format::Alpha);
        assert_eq!((mask.width(), mask.height()), (2, 2));
        let total: u32 = mask.data.iter().map(|&c| u32::from(c)).sum();
        assert!((total as f32 / 255.0 - 2.0).abs() < 0.05, "total {total}");
    }

    #[test]
    fn test_negative_placement() {
        let mask = rasterize(&outline(vec![rect(-64, -128, 0, -64)]), Format::Alpha);
        assert_eq!(mask.placement.left, -1);
        assert_eq!(mask.placement.top, -1);
        assert_eq!(mask.data, vec![255]);
    }

    #[test]
    fn test_subpixel_channels_are_shifted() {
        let mask = rasterize(&outline(vec![rect(0, 0, 64, 64)]), Format::Subpixel);
        assert_eq!(mask.placement.left, -1);
        assert_eq!(mask.width(), 3);
        assert_eq!(mask.data.len(), 9);
        let channel = |x: usize, c: usize| mask.data[x * 3 + c];
        assert_eq!(channel(1, 1), 255);
        assert_eq!(channel(0, 1), 0);
        assert_eq!(channel(2, 1), 0);
        // Red samples a third of a pixel to the right of green, blue to the left
        assert_eq!(channel(0, 0), 0);
        assert_eq!(channel(2, 2), 0);
        assert_eq!(channel(1, 0), channel(1, 2));
        assert_eq!(channel(2, 0), channel(0, 2));
        assert!(channel(2, 0) > 0);
    }

    #[test]
    #[should_panic(expected = "contour ends")]
    fn test_mismatched_contour_ends_panic() {
        let broken = ScaledOutline::from_parts(vec![on(0, 0), on(64, 0), on(0, 64)], vec![1]);
        let _ = rasterize(&broken, Format::Alpha);
    }

    #[test]
    fn test_scratch_reuse_matches_fresh() {
        let mut scratch = Scratch::new();
        let mut data = Vec::new();
        let big = outline(vec![rect(0, 0, 640, 640)]);
        let small = outline(vec![vec![on(0, 0), on(0, 128), on(128, 0)]]);
        rasterize_into(&big, Format::Alpha, &mut scratch, &mut data);
        let placement = rasterize_into(&small, Format::Alpha, &mut scratch, &mut data);
        let fresh = rasterize(&small, Format::Alpha);
        assert_eq!(placement, fresh.placement);
        assert_eq!(data, fresh.data);
    }
}
