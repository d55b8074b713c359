use crate::ir::Orientation;

use super::Point;

/// How branch tails converge back onto the main line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum JoinStyle {
    /// Quarter-circle corners joined by a straight run.
    Corner,
    /// One cubic curve per branch.
    Bezier,
}

// Axis primitives. The engine works in (main, cross) coordinates: main is
// the direction states follow each other in, cross is the direction
// sibling branches spread along.
impl Orientation {
    pub(super) fn point(self, main: f32, cross: f32) -> Point {
        match self {
            Orientation::Vertical => Point::new(cross, main),
            Orientation::Horizontal => Point::new(main, cross),
        }
    }

    pub(super) fn main_of(self, point: Point) -> f32 {
        match self {
            Orientation::Vertical => point.y,
            Orientation::Horizontal => point.x,
        }
    }

    pub(super) fn cross_of(self, point: Point) -> f32 {
        match self {
            Orientation::Vertical => point.x,
            Orientation::Horizontal => point.y,
        }
    }

    pub(super) fn main_extent(self, width: f32, height: f32) -> f32 {
        match self {
            Orientation::Vertical => height,
            Orientation::Horizontal => width,
        }
    }

    pub(super) fn cross_extent(self, width: f32, height: f32) -> f32 {
        match self {
            Orientation::Vertical => width,
            Orientation::Horizontal => height,
        }
    }

    /// Screen rectangle `(x, y, width, height)` of a box starting at `main`
    /// and centered on `cross`.
    pub(super) fn rect(
        self,
        main: f32,
        cross: f32,
        main_len: f32,
        cross_len: f32,
    ) -> (f32, f32, f32, f32) {
        let origin = self.point(main, cross - cross_len / 2.0);
        match self {
            Orientation::Vertical => (origin.x, origin.y, cross_len, main_len),
            Orientation::Horizontal => (origin.x, origin.y, main_len, cross_len),
        }
    }

    pub(super) fn join_style(self) -> JoinStyle {
        match self {
            Orientation::Vertical => JoinStyle::Corner,
            Orientation::Horizontal => JoinStyle::Bezier,
        }
    }
}
