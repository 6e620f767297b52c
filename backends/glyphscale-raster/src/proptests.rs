use super::*;
use glyphscale_core::{Format, Outline, Point, PointKind};
use proptest::prelude::*;

fn raw_point(x: i32, y: i32) -> ScaledPoint {
    ScaledPoint::new(F26Dot6::from_raw(x), F26Dot6::from_raw(y), PointKind::OnCurve)
}

fn raw_rect(x: i32, y: i32, w: i32, h: i32) -> ScaledOutline {
    ScaledOutline::from_parts(
        vec![
            raw_point(x, y),
            raw_point(x, y + h),
            raw_point(x + w, y + h),
            raw_point(x + w, y),
        ],
        vec![3],
    )
}

fn ink(mask: &Mask) -> f32 {
    mask.data.iter().map(|&c| f32::from(c)).sum::<f32>() / 255.0
}

/// Closed polygon in font units, one to eight points per contour
fn font_outline() -> impl Strategy<Value = Outline> {
    proptest::collection::vec(
        proptest::collection::vec((-2000i32..2000, -2000i32..2000, any::<bool>()), 3..8),
        1..4,
    )
    .prop_map(|contours| {
        let mut outline = Outline::new();
        for contour in contours {
            outline.push_contour(contour.into_iter().enumerate().map(|(i, (x, y, on))| {
                if on || i == 0 {
                    Point::on(x, y)
                } else {
                    Point::off(x, y)
                }
            }));
        }
        outline
    })
}

// Property: scaling keeps structure and every coordinate within rounding
proptest! {
    #[test]
    fn prop_scale_rounds_each_coordinate(outline in font_outline(), size in 4.0f32..200.0, upem in 256u16..4096) {
        let scaled = scale(&outline, size, upem, &ScaleOptions::default()).unwrap();
        prop_assert_eq!(scaled.contour_ends(), outline.contour_ends());
        let factor = size * 64.0 / f32::from(upem);
        for (s, p) in scaled.points().iter().zip(outline.points()) {
            prop_assert_eq!(s.kind, p.kind);
            prop_assert!((s.x.raw() as f32 - p.x as f32 * factor).abs() <= 0.51);
            prop_assert!((s.y.raw() as f32 - p.y as f32 * factor).abs() <= 0.51);
        }
    }
}

// Property: rescaling twice lands within a few 64ths of rescaling once
proptest! {
    #[test]
    fn prop_rescale_composes(outline in font_outline(), a in 0.25f32..4.0, b in 0.25f32..4.0) {
        let scaled = scale(&outline, 16.0, 1000, &ScaleOptions::default()).unwrap();
        let twice = scaled.rescale(a).unwrap().rescale(b).unwrap();
        let once = scaled.rescale(a * b).unwrap();
        for (p, q) in twice.points().iter().zip(once.points()) {
            prop_assert!((p.x - q.x).raw().abs() <= 3);
            prop_assert!((p.y - q.y).raw().abs() <= 3);
        }
    }
}

// Property: scaling to one size then rescaling matches scaling straight to
// the second size, up to the rounding of both steps
proptest! {
    #[test]
    fn prop_scale_then_rescale_matches_direct(outline in font_outline(), first in 8.0f32..64.0, ratio in 0.25f32..4.0) {
        let second = first * ratio;
        let options = ScaleOptions::default();
        let via = scale(&outline, first, 1000, &options).unwrap().rescale(ratio).unwrap();
        let direct = scale(&outline, second, 1000, &options).unwrap();
        prop_assert_eq!(via.contour_ends(), direct.contour_ends());
        // Half a 64th from the first rounding, stretched by the ratio, plus
        // one rounding on each side
        let tolerance = 0.5 * ratio + 1.0;
        for (p, q) in via.points().iter().zip(direct.points()) {
            prop_assert!(((p.x - q.x).raw() as f32).abs() <= tolerance);
            prop_assert!(((p.y - q.y).raw() as f32).abs() <= tolerance);
        }
    }
}

// Property: grid fitting moves coordinates only and never flips a contour
proptest! {
    #[test]
    fn prop_hint_preserves_topology(outline in font_outline(), size in 6.0f32..40.0) {
        let scaled = scale(&outline, size, 1000, &ScaleOptions::default()).unwrap();
        let hinted = hint(scaled.clone(), &HintSettings::new(), &mut Scratch::new());
        prop_assert_eq!(hinted.contour_ends(), scaled.contour_ends());
        prop_assert_eq!(hinted.point_count(), scaled.point_count());
        for (h, s) in hinted.points().iter().zip(scaled.points()) {
            prop_assert_eq!(h.kind, s.kind);
        }
        for (h, s) in hinted.contours().zip(scaled.contours()) {
            let before = ScaledOutline::contour_area(s).signum();
            if before != 0 {
                prop_assert_eq!(ScaledOutline::contour_area(h).signum(), before);
            }
        }
    }
}

// Property: rectangles get exactly their area in ink
proptest! {
    #[test]
    fn prop_rectangle_coverage_matches_area(x in -640i32..640, y in -640i32..640, w in 1i32..640, h in 1i32..640) {
        let mask = rasterize(&raw_rect(x, y, w, h), Format::Alpha);
        let area = (w * h) as f32 / 4096.0;
        // Pixels the rectangle touches, even if all of them round to zero
        let columns = F26Dot6::from_raw(x + w).to_int_ceil() - F26Dot6::from_raw(x).to_int();
        let rows = F26Dot6::from_raw(y + h).to_int_ceil() - F26Dot6::from_raw(y).to_int();
        let cells = (columns * rows) as f32;
        prop_assert_eq!(mask.data.len() as u32, mask.width() * mask.height());
        prop_assert!((ink(&mask) - area).abs() <= cells * 0.5 / 255.0 + 1e-3);
    }
}

// Property: a subpixel offset moves ink around without changing its amount
proptest! {
    #[test]
    fn prop_offset_preserves_ink(w in 16i32..640, h in 16i32..640, dx in 0.0f32..1.0, dy in 0.0f32..1.0) {
        let plain = rasterize(&raw_rect(0, 0, w, h), Format::Alpha);
        let mut shifted = raw_rect(0, 0, w, h);
        shifted.set_offset(dx, dy);
        let moved = rasterize(&shifted, Format::Alpha);
        let cells = (moved.width() * moved.height()) as f32;
        prop_assert!((ink(&plain) - ink(&moved)).abs() <= cells / 255.0 + 1e-3);
    }
}
