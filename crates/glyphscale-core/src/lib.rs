//! Glyphscale Core: the shared vocabulary of the scaling pipeline
//!
//! Glyphs travel from a font-table reader to finished pixels through a fixed
//! sequence of steps. This crate holds the types every step agrees on:
//!
//! 1. **Outline** - contours in font design units ([`outline`])
//! 2. **Provider** - the font-table layer that fills outlines ([`traits`])
//! 3. **Source** - where an image may come from, in preference order
//! 4. **Image** - the finished buffer plus placement ([`image`])
//!
//! Scaling, hinting and rasterization live in `glyphscale-raster`; the
//! session types that tie them together live in `glyphscale`.

pub mod error;
pub mod image;
pub mod outline;
pub mod traits;

pub use error::{ConversionError, LoadError, OutlineError, Result, ScaleError};
pub use image::{to_rgba8, BitmapFormat, Content, Image};
pub use outline::{Bounds, FontMetrics, GlyphMetrics, Outline, Point, PointKind};
pub use traits::{BitmapKind, BitmapRequest, ColorLayer, EmbeddedBitmap, GlyphProvider};

/// Small value types shared by every crate
pub mod types {
    /// Unique identifier for a glyph within a font
    pub type GlyphId = u32;

    /// Where a rendered image sits relative to the glyph origin
    ///
    /// `left` is the offset from the origin to the first column, `top` the
    /// offset from the baseline up to the first row (y grows upward in font
    /// space, downward inside the image).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Placement {
        pub left: i32,
        pub top: i32,
        pub width: u32,
        pub height: u32,
    }

    /// Rasterizer output flavor
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum Format {
        /// One coverage byte per pixel
        #[default]
        Alpha,
        /// Three coverage bytes per pixel for LCD subpixel rendering
        Subpixel,
    }

    impl Format {
        pub fn bytes_per_pixel(self) -> usize {
            match self {
                Format::Alpha => 1,
                Format::Subpixel => 3,
            }
        }
    }

    /// Simple RGBA color that works everywhere
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Color {
        pub r: u8,
        pub g: u8,
        pub b: u8,
        pub a: u8,
    }

    impl Color {
        pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
            Self { r, g, b, a }
        }

        pub const fn black() -> Self {
            Self::rgba(0, 0, 0, 255)
        }

        pub const fn white() -> Self {
            Self::rgba(255, 255, 255, 255)
        }
    }

    impl From<[u8; 4]> for Color {
        fn from([r, g, b, a]: [u8; 4]) -> Self {
            Self::rgba(r, g, b, a)
        }
    }
}

pub use types::{Color, Format, GlyphId, Placement};

/// How to choose among the bitmap strikes a font carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrikeWith {
    /// Only a strike with exactly the requested ppem
    ExactSize,
    /// The closest strike, preferring larger ones
    #[default]
    BestFit,
    /// The largest strike available
    LargestSize,
    /// A specific strike by index
    Index(u32),
}

/// Palette index that means "use the foreground color"
pub const FOREGROUND_PALETTE_INDEX: u16 = 0xFFFF;

/// Where a glyph image may come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Scale, optionally hint, and rasterize the glyph outline
    Outline,
    /// Layered color outline drawn with the given palette
    ColorOutline(u16),
    /// Embedded alpha bitmap strike
    Bitmap(StrikeWith),
    /// Embedded color image (PNG or BGRA strike)
    EmbeddedImage(StrikeWith),
}

/// Color outline first, then color images, then the plain outline
const DEFAULT_SOURCES: [Source; 3] = [
    Source::ColorOutline(0),
    Source::EmbeddedImage(StrikeWith::BestFit),
    Source::Outline,
];

/// A caller's ranking of render sources, already resolved into the order a
/// render pipeline should try them in
///
/// ```rust
/// use glyphscale_core::{Source, SourcePreference, StrikeWith};
///
/// let pref = SourcePreference::from_parts(Vec::new(), [Source::ColorOutline(0)]);
/// assert_eq!(
///     pref.sources(),
///     &[Source::EmbeddedImage(StrikeWith::BestFit), Source::Outline]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePreference {
    sources: Vec<Source>,
}

impl SourcePreference {
    /// Rank `prefer` and drop everything in `deny`.
    ///
    /// An empty ranking stands for the default order. A source listed twice
    /// keeps its first position. Strike variants count as distinct sources,
    /// so denying `Bitmap(ExactSize)` leaves `Bitmap(BestFit)` alone.
    pub fn from_parts(prefer: Vec<Source>, deny: impl IntoIterator<Item = Source>) -> Self {
        let denied: Vec<Source> = deny.into_iter().collect();
        let ranked = if prefer.is_empty() {
            DEFAULT_SOURCES.to_vec()
        } else {
            prefer
        };
        let mut sources: Vec<Source> = Vec::with_capacity(ranked.len());
        for source in ranked {
            if !denied.contains(&source) && !sources.contains(&source) {
                sources.push(source);
            }
        }
        Self { sources }
    }

    /// Sources in the order they should be tried
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourcePreference {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.to_vec(),
        }
    }
}

#[cfg(test)]
mod proptests;
