//! Error types for Glyphscale

use thiserror::Error;

use crate::types::GlyphId;

pub type Result<T> = std::result::Result<T, ScaleError>;

/// Main error type for Glyphscale
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("Invalid size: {0} (must be finite and greater than zero)")]
    InvalidSize(f32),

    #[error("Glyph {0} not found")]
    GlyphNotFound(GlyphId),

    #[error("Glyph data loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("Invalid outline: {0}")]
    InvalidOutline(#[from] OutlineError),

    #[error("No requested source produced an image for glyph {0}")]
    SourceUnavailable(GlyphId),

    #[error("Color conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}

/// Failures reported by a glyph provider or while decoding its payloads
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid font data: {0}")]
    InvalidFont(String),

    #[error("Font table error: {0}")]
    Table(String),

    #[error("Outline extraction failed: {0}")]
    Outline(String),

    #[error("Embedded bitmap could not be decoded: {0}")]
    Bitmap(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural problems in an outline handed over by a provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutlineError {
    #[error("contour end {end} is out of range for {points} points")]
    EndOutOfRange { end: usize, points: usize },

    #[error("contour ends are not increasing at contour {contour}")]
    UnorderedEnds { contour: usize },

    #[error("{count} points are not covered by any contour")]
    TrailingPoints { count: usize },

    #[error("contour {contour} has no on-curve point")]
    NoOnCurvePoint { contour: usize },

    #[error("contour {contour} has an unpaired cubic control point")]
    UnpairedCubic { contour: usize },
}

/// Color conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Unsupported content for RGBA conversion: {0}")]
    Unsupported(&'static str),

    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}
