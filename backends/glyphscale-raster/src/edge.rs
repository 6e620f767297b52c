//! Edge table and active-edge list for the scan converter
//!
//! Every flattened line segment that is not horizontal becomes an [`Edge`].
//! The table keeps them sorted by their top, and the scan converter walks
//! down the mask one row at a time, activating edges as their top is reached
//! and retiring them once the row is below their bottom. Active edges are
//! referenced by index into the table, so resetting the table between glyphs
//! keeps all allocations alive.

use crate::fixed::F26Dot6;

/// One line segment of a flattened outline, in mask-local y-down space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Topmost end of the segment
    pub x_top: F26Dot6,
    pub y_top: F26Dot6,
    /// Bottommost end of the segment
    pub x_bottom: F26Dot6,
    pub y_bottom: F26Dot6,
    /// +1 when the outline runs downward along this edge, -1 when upward
    pub direction: i8,
    /// Horizontal pixels travelled per pixel down
    pub dxdy: f32,
}

impl Edge {
    /// Build an edge from two points, `None` for horizontal segments.
    pub fn new(x1: F26Dot6, y1: F26Dot6, x2: F26Dot6, y2: F26Dot6) -> Option<Self> {
        if y1 == y2 {
            return None;
        }

        let (x_top, y_top, x_bottom, y_bottom, direction) = if y1 < y2 {
            (x1, y1, x2, y2, 1i8)
        } else {
            (x2, y2, x1, y1, -1i8)
        };

        let dxdy = (x_bottom - x_top).raw() as f32 / (y_bottom - y_top).raw() as f32;

        Some(Edge {
            x_top,
            y_top,
            x_bottom,
            y_bottom,
            direction,
            dxdy,
        })
    }

    /// Horizontal position at height `y` (pixels), clamped to the segment.
    #[inline]
    pub fn x_at(&self, y: f32) -> f32 {
        if y <= self.y_top.to_float() {
            return self.x_top.to_float();
        }
        if y >= self.y_bottom.to_float() {
            return self.x_bottom.to_float();
        }
        self.x_top.to_float() + (y - self.y_top.to_float()) * self.dxdy
    }

    /// The part of the edge inside the pixel row `row`, as
    /// `(x_start, y_start, x_end, y_end)` in pixels.
    #[inline]
    pub fn clip_to_row(&self, row: i32) -> Option<(f32, f32, f32, f32)> {
        let row_top = row as f32;
        let y0 = self.y_top.to_float().max(row_top);
        let y1 = self.y_bottom.to_float().min(row_top + 1.0);
        if y1 <= y0 {
            return None;
        }
        Some((self.x_at(y0), y0, self.x_at(y1), y1))
    }
}

/// All edges of a glyph plus the rows currently being scanned
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    edges: Vec<Edge>,
    active: Vec<u32>,
    next: usize,
}

impl EdgeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every edge; capacity is kept for the next glyph.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.active.clear();
        self.next = 0;
    }

    /// Add a segment, ignoring horizontal ones.
    pub fn push_line(&mut self, x1: F26Dot6, y1: F26Dot6, x2: F26Dot6, y2: F26Dot6) {
        if let Some(edge) = Edge::new(x1, y1, x2, y2) {
            self.edges.push(edge);
        }
    }

    /// Sort edges by their top and rewind the scan.
    pub fn finish(&mut self) {
        self.edges.sort_by(|a, b| a.y_top.cmp(&b.y_top));
        self.active.clear();
        self.next = 0;
    }

    /// Bring the active list up to date for pixel row `row`.
    ///
    /// Rows must be visited in increasing order after [`EdgeTable::finish`].
    pub fn advance_to(&mut self, row: i32) {
        let row_bottom = F26Dot6::from_int(row + 1);
        while self.next < self.edges.len() && self.edges[self.next].y_top < row_bottom {
            self.active.push(self.next as u32);
            self.next += 1;
        }
        let row_top = F26Dot6::from_int(row);
        let edges = &self.edges;
        self.active
            .retain(|&index| edges[index as usize].y_bottom > row_top);
    }

    /// Edges crossing the current row.
    pub fn active(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.active.iter().map(move |&index| &self.edges[index as usize])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.edges.capacity()
    }
}
