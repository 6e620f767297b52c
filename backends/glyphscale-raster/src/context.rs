//! Scratch memory shared by the scaling stages
//!
//! Scaling, grid fitting and scan conversion each need temporary buffers
//! sized by the glyph at hand. [`Scratch`] owns all of them. Buffers are
//! cleared, never freed, between glyphs, so after the first few glyphs a
//! session renders without touching the allocator.
//!
//! A `Scratch` is plain mutable state: one per thread.

use crate::edge::EdgeTable;
use crate::hint::HintScratch;

/// Reusable buffers for [`scale_into`], [`hint`] and [`rasterize_into`]
///
/// [`scale_into`]: crate::transform::scale_into
/// [`hint`]: crate::hint::hint
/// [`rasterize_into`]: crate::rasterizer::rasterize_into
#[derive(Debug, Default)]
pub struct Scratch {
    /// Per-point displacement while emboldening
    pub(crate) displacement: Vec<[f32; 2]>,
    pub(crate) hint: HintScratch,
    pub(crate) edges: EdgeTable,
    /// Signed-area accumulator for one mask row
    pub(crate) row: Vec<f32>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous glyph while keeping every allocation.
    pub fn reset(&mut self) {
        self.displacement.clear();
        self.hint.clear();
        self.edges.clear();
        self.row.clear();
    }

    /// Number of edge slots reserved so far.
    pub fn edge_capacity(&self) -> usize {
        self.edges.capacity()
    }
}
