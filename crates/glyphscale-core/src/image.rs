//! Rendered glyph images and their conversion to premultiplied RGBA
//!
//! Every render call ends here: a byte buffer, a tag saying how to read it,
//! and a placement telling the caller where the top-left pixel sits relative
//! to the glyph origin. [`to_rgba8`] turns any of these into the one format
//! compositors always accept: four bytes per pixel, premultiplied.

use crate::error::ConversionError;
use crate::types::{Color, Placement};
use crate::Source;

/// Pixel layout of an embedded bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitmapFormat {
    /// Coverage with 1, 2, 4 or 8 bits per pixel. Packed data runs rows
    /// together bit by bit, otherwise every row starts on a byte boundary.
    Alpha { bits: u8, packed: bool },
    /// Straight (non-premultiplied) RGBA, 4 bytes per pixel
    Rgba8,
    /// Premultiplied BGRA, 4 bytes per pixel
    Bgra8Premultiplied,
    /// Still-encoded PNG payload
    Png,
}

/// What the bytes of an [`Image`] mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Content {
    /// One coverage byte per pixel
    Mask,
    /// Three coverage bytes per pixel (R, G, B)
    SubpixelMask,
    /// Premultiplied RGBA, 4 bytes per pixel
    Color,
    /// Embedded bitmap in its stored layout
    Bitmap(BitmapFormat),
}

impl Content {
    /// Bytes per pixel, `None` for layouts that are not byte-addressable.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Content::Mask => Some(1),
            Content::SubpixelMask => Some(3),
            Content::Color => Some(4),
            Content::Bitmap(BitmapFormat::Rgba8 | BitmapFormat::Bgra8Premultiplied) => Some(4),
            Content::Bitmap(BitmapFormat::Alpha { bits: 8, .. }) => Some(1),
            Content::Bitmap(_) => None,
        }
    }
}

/// The output of one render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Which source produced the image
    pub source: Source,
    pub content: Content,
    pub placement: Placement,
    pub data: Vec<u8>,
}

impl Default for Image {
    fn default() -> Self {
        Self::new()
    }
}

impl Image {
    pub fn new() -> Self {
        Self {
            source: Source::Outline,
            content: Content::Mask,
            placement: Placement::default(),
            data: Vec::new(),
        }
    }

    /// Reset to an empty mask while keeping the buffer allocation.
    pub fn clear(&mut self) {
        self.source = Source::Outline;
        self.content = Content::Mask;
        self.placement = Placement::default();
        self.data.clear();
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.placement.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.placement.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.placement.width == 0 || self.placement.height == 0
    }

    /// Convert to premultiplied RGBA8, tinting masks with `base`.
    pub fn to_rgba8(&self, base: Color) -> Result<Vec<u8>, ConversionError> {
        to_rgba8(self, base)
    }
}

/// Convert any image content to premultiplied RGBA8, 4 bytes per pixel.
///
/// - `Mask`: the base color with alpha `coverage * base.a / 255`
/// - `SubpixelMask`: each channel `coverage_c * base_c / 255`, alpha from the
///   strongest channel, then premultiplied
/// - `Color`: already premultiplied, copied through
/// - embedded bitmaps: straight alpha gets premultiplied, BGRA is swizzled,
///   alpha strikes are tinted like masks
///
/// Still-encoded PNG data and unknown bit depths fail with
/// [`ConversionError::Unsupported`].
pub fn to_rgba8(image: &Image, base: Color) -> Result<Vec<u8>, ConversionError> {
    let pixels = image.placement.width as usize * image.placement.height as usize;
    let mut out = Vec::with_capacity(pixels * 4);

    match image.content {
        Content::Mask => {
            check_len(&image.data, pixels)?;
            for &coverage in &image.data[..pixels] {
                push_tinted(&mut out, base, coverage);
            }
        }
        Content::SubpixelMask => {
            check_len(&image.data, pixels * 3)?;
            for rgb in image.data[..pixels * 3].chunks_exact(3) {
                let max = rgb[0].max(rgb[1]).max(rgb[2]);
                let alpha = mul_div255(max, base.a);
                out.extend_from_slice(&[
                    mul_div255(mul_div255(rgb[0], base.r), alpha),
                    mul_div255(mul_div255(rgb[1], base.g), alpha),
                    mul_div255(mul_div255(rgb[2], base.b), alpha),
                    alpha,
                ]);
            }
        }
        Content::Color => {
            check_len(&image.data, pixels * 4)?;
            out.extend_from_slice(&image.data[..pixels * 4]);
        }
        Content::Bitmap(BitmapFormat::Rgba8) => {
            check_len(&image.data, pixels * 4)?;
            for px in image.data[..pixels * 4].chunks_exact(4) {
                let a = px[3];
                out.extend_from_slice(&[
                    mul_div255(px[0], a),
                    mul_div255(px[1], a),
                    mul_div255(px[2], a),
                    a,
                ]);
            }
        }
        Content::Bitmap(BitmapFormat::Bgra8Premultiplied) => {
            check_len(&image.data, pixels * 4)?;
            for px in image.data[..pixels * 4].chunks_exact(4) {
                out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }
        Content::Bitmap(BitmapFormat::Alpha { bits, packed }) => {
            let coverage = expand_alpha(
                &image.data,
                image.placement.width,
                image.placement.height,
                bits,
                packed,
            )?;
            for c in coverage {
                push_tinted(&mut out, base, c);
            }
        }
        Content::Bitmap(BitmapFormat::Png) => {
            return Err(ConversionError::Unsupported("undecoded PNG bitmap"));
        }
    }

    Ok(out)
}

/// Expand 1/2/4/8-bit alpha rows to one coverage byte per pixel.
///
/// Levels are stretched so the maximum stored value becomes 255.
pub fn expand_alpha(
    data: &[u8],
    width: u32,
    height: u32,
    bits: u8,
    packed: bool,
) -> Result<Vec<u8>, ConversionError> {
    if !matches!(bits, 1 | 2 | 4 | 8) {
        return Err(ConversionError::Unsupported("alpha bit depth"));
    }
    let (width, height) = (width as usize, height as usize);
    let bits = bits as usize;
    let row_bits = width * bits;
    let stride_bits = if packed {
        row_bits
    } else {
        row_bits.div_ceil(8) * 8
    };
    let needed = (stride_bits * height).div_ceil(8);
    check_len(data, needed)?;

    let max = (1u16 << bits) - 1;
    let mut out = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let bit = row * stride_bits + col * bits;
            let byte = data[bit / 8];
            let shift = 8 - bits - (bit % 8);
            let value = (byte >> shift) as u16 & max;
            out.push(((value * 255 + max / 2) / max) as u8);
        }
    }
    Ok(out)
}

fn check_len(data: &[u8], expected: usize) -> Result<(), ConversionError> {
    if data.len() < expected {
        return Err(ConversionError::BufferSize {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

#[inline]
fn push_tinted(out: &mut Vec<u8>, base: Color, coverage: u8) {
    let alpha = mul_div255(coverage, base.a);
    out.extend_from_slice(&[
        mul_div255(base.r, alpha),
        mul_div255(base.g, alpha),
        mul_div255(base.b, alpha),
        alpha,
    ]);
}

/// `a * b / 255`, rounded
#[inline]
pub fn mul_div255(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 128;
    ((t + (t >> 8)) >> 8) as u8
}
