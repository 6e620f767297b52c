//! Embedded bitmap glyph support
//!
//! Fonts may carry pre-rendered glyphs in strikes designed for specific
//! pixel sizes: grayscale or monochrome coverage (EBDT), or color images as
//! PNG or BGRA payloads (CBDT, sbix). This module turns whatever the provider
//! hands over into image data the caller can composite.
//!
//! # Scaling
//!
//! When the strike was designed for a different size than requested, the
//! bitmap is resized with bilinear interpolation and its bearings scaled to
//! match, unless the caller asked for an exact size match.

use glyphscale_core::image::{expand_alpha, mul_div255};
use glyphscale_core::{BitmapFormat, Content, EmbeddedBitmap, LoadError, Placement};

/// Sizes closer than this count as the same strike size
const SIZE_EPSILON: f32 = 1.0 / 64.0;

/// A bitmap ready to be wrapped in an [`Image`](glyphscale_core::Image)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBitmap {
    pub content: Content,
    pub placement: Placement,
    pub data: Vec<u8>,
}

/// Decode an embedded bitmap into directly addressable pixels.
///
/// - alpha strikes become 8-bit coverage (`Content::Mask`)
/// - PNG payloads become straight RGBA (`Content::Bitmap(Rgba8)`)
/// - RGBA and BGRA payloads are kept as they are
pub fn decode(bitmap: &EmbeddedBitmap) -> Result<DecodedBitmap, LoadError> {
    let mut placement = Placement {
        left: bitmap.left,
        top: bitmap.top,
        width: bitmap.width,
        height: bitmap.height,
    };
    let pixels = bitmap.width as usize * bitmap.height as usize;

    let (content, data) = match bitmap.format {
        BitmapFormat::Alpha { bits, packed } => {
            let coverage = expand_alpha(&bitmap.data, bitmap.width, bitmap.height, bits, packed)
                .map_err(|e| LoadError::Bitmap(e.to_string()))?;
            (Content::Mask, coverage)
        }
        BitmapFormat::Rgba8 | BitmapFormat::Bgra8Premultiplied => {
            if bitmap.data.len() < pixels * 4 {
                return Err(LoadError::Bitmap(format!(
                    "{}x{} bitmap needs {} bytes, got {}",
                    bitmap.width,
                    bitmap.height,
                    pixels * 4,
                    bitmap.data.len()
                )));
            }
            (
                Content::Bitmap(bitmap.format),
                bitmap.data[..pixels * 4].to_vec(),
            )
        }
        BitmapFormat::Png => {
            let (width, height, rgba) = decode_png(&bitmap.data)?;
            placement.width = width;
            placement.height = height;
            (Content::Bitmap(BitmapFormat::Rgba8), rgba)
        }
    };

    Ok(DecodedBitmap {
        content,
        placement,
        data,
    })
}

/// Resize a decoded bitmap designed for `strike_ppem` to `ppem`.
///
/// Bitmaps already at the right size are returned untouched.
pub fn resize(decoded: DecodedBitmap, strike_ppem: f32, ppem: f32) -> DecodedBitmap {
    if !(strike_ppem > 0.0 && ppem > 0.0) || (strike_ppem - ppem).abs() < SIZE_EPSILON {
        return decoded;
    }
    let Some(channels) = decoded.content.bytes_per_pixel() else {
        return decoded;
    };
    let factor = ppem / strike_ppem;
    let src = decoded.placement;
    if src.width == 0 || src.height == 0 {
        return decoded;
    }
    let width = ((src.width as f32 * factor).round() as u32).max(1);
    let height = ((src.height as f32 * factor).round() as u32).max(1);

    // Straight alpha is interpolated premultiplied so transparent pixels do
    // not bleed their color into the edges.
    let straight = decoded.content == Content::Bitmap(BitmapFormat::Rgba8);
    let mut source = decoded.data;
    if straight {
        premultiply_in_place(&mut source);
    }
    let mut data = scale_bilinear(&source, src.width, src.height, channels, width, height);
    if straight {
        unpremultiply_in_place(&mut data);
    }

    DecodedBitmap {
        content: decoded.content,
        placement: Placement {
            left: (src.left as f32 * factor).round() as i32,
            top: (src.top as f32 * factor).round() as i32,
            width,
            height,
        },
        data,
    }
}

/// Decode PNG data to straight RGBA8
fn decode_png(png_data: &[u8]) -> Result<(u32, u32, Vec<u8>), LoadError> {
    let mut decoder = png::Decoder::new(png_data);
    // Palette and low bit depths expand to 8-bit channels, 16-bit is stripped
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| LoadError::Bitmap(format!("PNG header: {e}")))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| LoadError::Bitmap(format!("PNG data: {e}")))?;
    let buf = &buf[..info.buffer_size()];
    let pixels = info.width as usize * info.height as usize;

    let mut rgba = Vec::with_capacity(pixels * 4);
    match info.color_type {
        png::ColorType::Rgba => rgba.extend_from_slice(buf),
        png::ColorType::Rgb => {
            for chunk in buf.chunks_exact(3) {
                rgba.extend_from_slice(chunk);
                rgba.push(255);
            }
        }
        png::ColorType::Grayscale => {
            for &gray in buf {
                rgba.extend_from_slice(&[gray, gray, gray, 255]);
            }
        }
        png::ColorType::GrayscaleAlpha => {
            for chunk in buf.chunks_exact(2) {
                rgba.extend_from_slice(&[chunk[0], chunk[0], chunk[0], chunk[1]]);
            }
        }
        png::ColorType::Indexed => {
            return Err(LoadError::Bitmap("PNG palette was not expanded".into()));
        }
    }

    if rgba.len() != pixels * 4 {
        return Err(LoadError::Bitmap(format!(
            "PNG decoded to {} bytes, expected {}",
            rgba.len(),
            pixels * 4
        )));
    }
    Ok((info.width, info.height, rgba))
}

/// Scale a pixel buffer using bilinear interpolation
fn scale_bilinear(
    src: &[u8],
    src_width: u32,
    src_height: u32,
    channels: usize,
    dst_width: u32,
    dst_height: u32,
) -> Vec<u8> {
    let (src_width, src_height) = (src_width as usize, src_height as usize);
    let (dst_width, dst_height) = (dst_width as usize, dst_height as usize);
    let mut dst = vec![0u8; dst_width * dst_height * channels];

    let sx = src_width as f32 / dst_width as f32;
    let sy = src_height as f32 / dst_height as f32;
    for dst_y in 0..dst_height {
        let src_y = ((dst_y as f32 + 0.5) * sy - 0.5).max(0.0);
        let y0 = (src_y.floor() as usize).min(src_height - 1);
        let y1 = (y0 + 1).min(src_height - 1);
        let wy = src_y - src_y.floor();

        for dst_x in 0..dst_width {
            let src_x = ((dst_x as f32 + 0.5) * sx - 0.5).max(0.0);
            let x0 = (src_x.floor() as usize).min(src_width - 1);
            let x1 = (x0 + 1).min(src_width - 1);
            let wx = src_x - src_x.floor();

            let at = |x: usize, y: usize, c: usize| src[(y * src_width + x) * channels + c] as f32;
            let out = (dst_y * dst_width + dst_x) * channels;
            for c in 0..channels {
                let value = at(x0, y0, c) * (1.0 - wx) * (1.0 - wy)
                    + at(x1, y0, c) * wx * (1.0 - wy)
                    + at(x0, y1, c) * (1.0 - wx) * wy
                    + at(x1, y1, c) * wx * wy;
                dst[out + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    dst
}

fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = mul_div255(px[0], a);
        px[1] = mul_div255(px[1], a);
        px[2] = mul_div255(px[2], a);
    }
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
