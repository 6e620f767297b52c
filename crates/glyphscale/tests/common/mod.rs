//! A synthetic font for end-to-end tests
//!
//! | glyph | contents                                                 |
//! |-------|----------------------------------------------------------|
//! | 1     | "Q": elliptical ring plus a detached tail                |
//! | 2     | square 100..600 x 0..500                                 |
//! | 3     | color glyph: layer 2 in red, layer 4 in the foreground   |
//! | 4     | small square 200..400 x 100..300                         |
//! | 5     | 2x2 alpha strike at 14 ppem, no outline                  |
//! | 6     | corrupt PNG strike, square outline                       |
//! | 7     | valid 2x1 PNG strike at 14 ppem, no outline              |
//! | 8     | color glyph whose first layer has no outline             |
//! | 9     | outline loading fails                                    |

#![allow(dead_code)]

use std::f64::consts::PI;

use glyphscale::{
    BitmapFormat, BitmapKind, BitmapRequest, Color, ColorLayer, EmbeddedBitmap, FontMetrics,
    GlyphId, GlyphProvider, LoadError, Outline, Point, Result, StrikeWith,
};

pub const Q: GlyphId = 1;
pub const SQUARE: GlyphId = 2;
pub const LAYERED: GlyphId = 3;
pub const SMALL_SQUARE: GlyphId = 4;
pub const ALPHA_STRIKE: GlyphId = 5;
pub const CORRUPT_PNG: GlyphId = 6;
pub const PNG_STRIKE: GlyphId = 7;
pub const LAYER_MISSING: GlyphId = 8;
pub const BROKEN: GlyphId = 9;

pub const STRIKE_PPEM: f32 = 14.0;
pub const RED: Color = Color::rgba(255, 0, 0, 255);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Ellipse from eight quadratic arcs, starting at the top.
///
/// On-curve points sit on the ellipse every 45 degrees; each control point
/// lies on the bisecting ray, pushed out by `1 / cos(22.5)` so the arcs are
/// tangent at their ends.
pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64, clockwise: bool) -> Vec<Point> {
    let step = if clockwise { -PI / 4.0 } else { PI / 4.0 };
    let reach = 1.0 / (PI / 8.0).cos();
    let at = |angle: f64, r: f64| {
        (
            (cx + rx * r * angle.cos()).round() as i32,
            (cy + ry * r * angle.sin()).round() as i32,
        )
    };
    let mut points = Vec::with_capacity(16);
    for k in 0..8 {
        let angle = PI / 2.0 + step * k as f64;
        let (x, y) = at(angle, 1.0);
        points.push(Point::on(x, y));
        let (x, y) = at(angle + step / 2.0, reach);
        points.push(Point::off(x, y));
    }
    points
}

/// Area enclosed by the "Q" in square font units
pub fn q_area() -> f64 {
    PI * (310.0 * 360.0 - 190.0 * 240.0) + 90.0 * 130.0
}

fn rect(outline: &mut Outline, x0: i32, y0: i32, x1: i32, y1: i32) {
    outline.push_contour([
        Point::on(x0, y0),
        Point::on(x0, y1),
        Point::on(x1, y1),
        Point::on(x1, y0),
    ]);
}

pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(rgba).unwrap();
    }
    out
}

pub struct TestFont;

impl TestFont {
    fn strike(&self, request: &BitmapRequest) -> bool {
        match request.strike {
            StrikeWith::ExactSize => (request.ppem - STRIKE_PPEM).abs() < 0.01,
            StrikeWith::Index(i) => i == 0,
            StrikeWith::BestFit | StrikeWith::LargestSize => true,
        }
    }
}

impl GlyphProvider for TestFont {
    fn metrics(&self, _coords: &[f32]) -> FontMetrics {
        FontMetrics {
            units_per_em: 1000,
            ascender: 800.0,
            descender: -200.0,
            cap_height: Some(700.0),
            x_height: Some(500.0),
            ..FontMetrics::default()
        }
    }

    fn advance_width(&self, glyph_id: GlyphId, _coords: &[f32]) -> Option<f32> {
        (1..=9).contains(&glyph_id).then_some(700.0)
    }

    fn load_outline(&self, glyph_id: GlyphId, _coords: &[f32], outline: &mut Outline) -> Result<bool> {
        match glyph_id {
            Q => {
                outline.push_contour(ellipse(350.0, 360.0, 310.0, 360.0, true));
                outline.push_contour(ellipse(350.0, 360.0, 190.0, 240.0, false));
                outline.push_contour([
                    Point::on(430, -20),
                    Point::on(520, -20),
                    Point::on(640, -150),
                    Point::on(550, -150),
                ]);
            }
            SQUARE | LAYERED | CORRUPT_PNG => rect(outline, 100, 0, 600, 500),
            SMALL_SQUARE => rect(outline, 200, 100, 400, 300),
            BROKEN => return Err(LoadError::Outline("glyf offset past end of table".into()).into()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn load_color_layers(
        &self,
        glyph_id: GlyphId,
        _palette: u16,
        layers: &mut Vec<ColorLayer>,
    ) -> Result<bool> {
        let found: &[ColorLayer] = match glyph_id {
            LAYERED => &[
                ColorLayer {
                    glyph_id: SQUARE,
                    color: Some(RED),
                },
                ColorLayer {
                    glyph_id: SMALL_SQUARE,
                    color: None,
                },
            ],
            LAYER_MISSING => &[
                ColorLayer {
                    glyph_id: 50,
                    color: Some(RED),
                },
                ColorLayer {
                    glyph_id: SMALL_SQUARE,
                    color: Some(RED),
                },
            ],
            _ => return Ok(false),
        };
        layers.extend_from_slice(found);
        Ok(true)
    }

    fn load_bitmap(&self, glyph_id: GlyphId, request: &BitmapRequest) -> Result<Option<EmbeddedBitmap>> {
        if !self.strike(request) {
            return Ok(None);
        }
        let (kind, width, height, format, data) = match glyph_id {
            ALPHA_STRIKE => (
                BitmapKind::Alpha,
                2,
                2,
                BitmapFormat::Alpha {
                    bits: 8,
                    packed: false,
                },
                vec![255, 0, 0, 255],
            ),
            CORRUPT_PNG => (
                BitmapKind::Color,
                2,
                2,
                BitmapFormat::Png,
                b"\x89PNG\r\n\x1a\nnot really".to_vec(),
            ),
            PNG_STRIKE => (
                BitmapKind::Color,
                2,
                1,
                BitmapFormat::Png,
                encode_png(2, 1, &[255, 0, 0, 255, 0, 0, 255, 128]),
            ),
            _ => return Ok(None),
        };
        if kind != request.kind {
            return Ok(None);
        }
        Ok(Some(EmbeddedBitmap {
            width,
            height,
            left: 1,
            top: 2,
            ppem: STRIKE_PPEM,
            format,
            data,
        }))
    }
}
