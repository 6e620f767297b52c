// this_file: backends/glyphscale-raster/src/lib.rs

//! glyphscale-raster - from font-unit outlines to coverage masks.
//!
//! Three stages, each usable on its own:
//!
//! - [`transform`]: scale to device pixels in 26.6 fixed point, with optional
//!   skew and embolden
//! - [`hint`]: fit edges to the pixel grid without changing topology
//! - [`rasterizer`]: exact-area anti-aliased scan conversion, grayscale or
//!   subpixel
//!
//! Every stage has an `_into` form that takes a [`Scratch`] so a session can
//! render any number of glyphs without reallocating.
//!
//! ## Architecture
//!
//! - `fixed`: F26Dot6 arithmetic
//! - `scaled`: device-space outlines
//! - `curves`: Bézier flattening
//! - `edge`: edge table for the row sweep
//! - `context`: reusable buffers

pub mod context;
pub mod curves;
pub mod edge;
pub mod fixed;
pub mod hint;
pub mod rasterizer;
pub mod scaled;
pub mod transform;

pub use context::Scratch;
pub use fixed::F26Dot6;
pub use hint::{hint, HintSettings};
pub use rasterizer::{rasterize, rasterize_into, Mask};
pub use scaled::{FixedBounds, HintedOutline, ScaledOutline, ScaledPoint};
pub use transform::{embolden, scale, scale_into, ScaleOptions};

#[cfg(test)]
mod proptests;
