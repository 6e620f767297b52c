// this_file: crates/glyphscale/src/lib.rs

//! Glyphscale - glyph images from font data.
//!
//! A rendering session is built in three steps:
//!
//! 1. A [`ScaleContext`] owns all scratch memory. Keep one per thread.
//! 2. A [`Scaler`] binds the context to one font (a [`GlyphProvider`]), a
//!    pixel size, a hinting switch and a variation location.
//! 3. A [`Render`] lists which sources to try (color outlines, embedded
//!    images, bitmap strikes, plain outlines) and how to style the result.
//!
//! ```ignore
//! use glyphscale::{Render, ScaleContext, Source};
//!
//! let mut context = ScaleContext::new();
//! let mut scaler = context.builder(&font).size(14.0).hint(true).build()?;
//! let image = Render::new(&[Source::Outline]).render(&mut scaler, glyph_id)?;
//! let rgba = image.to_rgba8(glyphscale::Color::black())?;
//! ```
//!
//! # Feature Flags
//!
//! - `fontdb`: re-export `glyphscale-fontdb`, a provider backed by skrifa
//! - `parallel`: batch rendering on rayon with one context per worker

pub mod bitmap;
pub mod color;
pub mod context;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod render;
pub mod scaler;

pub use context::ScaleContext;
pub use render::{Render, RenderIter};
pub use scaler::{Scaler, ScalerBuilder, ScalerConfig};

pub use glyphscale_core::{
    error, to_rgba8, BitmapFormat, BitmapKind, BitmapRequest, Bounds, Color, ColorLayer, Content,
    ConversionError, EmbeddedBitmap, FontMetrics, Format, GlyphId, GlyphMetrics, GlyphProvider,
    Image, LoadError, Outline, OutlineError, Placement, Point, PointKind, Result, ScaleError,
    Source, SourcePreference, StrikeWith, FOREGROUND_PALETTE_INDEX,
};
pub use glyphscale_raster::{F26Dot6, Mask, ScaleOptions, ScaledOutline, ScaledPoint};

#[cfg(feature = "fontdb")]
pub use glyphscale_fontdb as fontdb;

#[cfg(feature = "parallel")]
pub use parallel::{render_batch, render_batch_with_threads};
