//! Collecting skrifa drawing commands into an [`Outline`]

use glyphscale_core::{Outline, Point};
use skrifa::outline::OutlinePen;

/// Pen that records contours in font units, rounded to integers
///
/// Each contour is buffered until it closes so that the closing point, which
/// skrifa repeats when the last segment ends on the start point, can be
/// dropped.
pub(crate) struct OutlineCollector<'a> {
    outline: &'a mut Outline,
    contour: Vec<Point>,
}

impl<'a> OutlineCollector<'a> {
    pub(crate) fn new(outline: &'a mut Outline) -> Self {
        Self {
            outline,
            contour: Vec::new(),
        }
    }

    /// Flush a contour left open by the last `move_to`.
    pub(crate) fn finish(mut self) {
        self.flush();
    }

    fn flush(&mut self) {
        if self.contour.len() > 1 {
            let first = self.contour[0];
            if self.contour.last() == Some(&first) {
                self.contour.pop();
            }
        }
        if !self.contour.is_empty() {
            self.outline.push_contour(self.contour.drain(..));
        }
    }
}

#[inline]
fn round(v: f32) -> i32 {
    v.round() as i32
}

impl OutlinePen for OutlineCollector<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.contour.push(Point::on(round(x), round(y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.contour.push(Point::on(round(x), round(y)));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.contour.push(Point::off(round(cx0), round(cy0)));
        self.contour.push(Point::on(round(x), round(y)));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.contour.push(Point::cubic(round(cx0), round(cy0)));
        self.contour.push(Point::cubic(round(cx1), round(cy1)));
        self.contour.push(Point::on(round(x), round(y)));
    }

    fn close(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphscale_core::PointKind;

    #[test]
    fn test_closing_point_is_dropped() {
        let mut outline = Outline::new();
        let mut pen = OutlineCollector::new(&mut outline);
        pen.move_to(0.0, 0.0);
        pen.line_to(0.0, 100.0);
        pen.quad_to(50.0, 150.0, 100.0, 100.0);
        pen.line_to(0.0, 0.0);
        pen.close();
        pen.finish();

        assert_eq!(outline.contour_ends(), &[3]);
        assert_eq!(outline.points()[2], Point::off(50, 150));
        assert!(outline.validate().is_ok());
    }

    #[test]
    fn test_cubic_and_open_contours() {
        let mut outline = Outline::new();
        let mut pen = OutlineCollector::new(&mut outline);
        pen.move_to(0.4, 0.6);
        pen.curve_to(10.0, 20.0, 30.0, 20.0, 40.0, 0.0);
        pen.move_to(100.0, 100.0);
        pen.line_to(120.0, 100.0);
        pen.line_to(110.0, 120.0);
        pen.finish();

        assert_eq!(outline.contour_ends(), &[3, 6]);
        assert_eq!(outline.points()[0], Point::on(0, 1));
        assert_eq!(outline.points()[1].kind, PointKind::OffCurveCubic);
        assert!(outline.validate().is_ok());
    }

    #[test]
    fn test_nothing_drawn() {
        let mut outline = Outline::new();
        OutlineCollector::new(&mut outline).finish();
        assert!(outline.is_empty());
    }
}
