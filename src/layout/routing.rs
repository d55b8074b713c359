use std::ops::Range;

use crate::ir::Orientation;

use super::axis::JoinStyle;
use super::{Connector, ConnectorKind, Point, Segment, StateLayout};

/// Cross-axis distance below which two points count as aligned and are
/// joined by a straight segment.
const ALIGN_EPS: f32 = 0.01;

/// Split of a branch group around its root: an odd group has a middle
/// branch that sits on the root's axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSides {
    pub left: Range<usize>,
    pub middle: Option<usize>,
    pub right: Range<usize>,
}

impl BranchSides {
    pub fn classify(count: usize) -> Self {
        let half = count / 2;
        if count % 2 == 0 {
            Self {
                left: 0..half,
                middle: None,
                right: half..count,
            }
        } else {
            Self {
                left: 0..half,
                middle: Some(half),
                right: half + 1..count,
            }
        }
    }
}

/// Endpoints of one laid out branch.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct BranchEnds {
    pub(super) start_id: String,
    pub(super) end_id: String,
    /// Where the fork connector lands.
    pub(super) entry: Point,
    /// Where the join connector leaves.
    pub(super) tail: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bend {
    /// Corners right after the start point, straight run into the target.
    Leading,
    /// Straight run out of the start point, corners right before the target.
    Trailing,
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectorRouter {
    orientation: Orientation,
    radius: f32,
}

impl ConnectorRouter {
    pub fn new(orientation: Orientation, radius: f32) -> Self {
        Self {
            orientation,
            radius: radius.max(0.0),
        }
    }

    pub fn entry_point(&self, state: &StateLayout) -> Point {
        state
            .anchors
            .map(|anchors| anchors.entry)
            .unwrap_or_else(|| state.leading_edge(self.orientation))
    }

    pub fn exit_point(&self, state: &StateLayout) -> Point {
        state
            .anchors
            .map(|anchors| anchors.exit)
            .unwrap_or_else(|| state.trailing_edge(self.orientation))
    }

    pub fn tie(&self, from_id: &str, to_id: &str, from: Point, to: Point) -> Connector {
        Connector {
            kind: ConnectorKind::Tie,
            from: from_id.to_string(),
            to: to_id.to_string(),
            segments: vec![Segment::Line { from, to }],
        }
    }

    /// Connectors from a Parallel root's exit anchor to every branch entry.
    pub(super) fn fork(&self, root_id: &str, root_exit: Point, branches: &[BranchEnds]) -> Vec<Connector> {
        let o = self.orientation;
        branches
            .iter()
            .map(|branch| {
                let aligned = (o.cross_of(branch.entry) - o.cross_of(root_exit)).abs() <= ALIGN_EPS;
                let segments = if aligned {
                    vec![Segment::Line {
                        from: root_exit,
                        to: branch.entry,
                    }]
                } else {
                    let run = o.main_of(branch.entry) - o.main_of(root_exit);
                    self.corner_route(root_exit, branch.entry, Bend::Leading, run)
                };
                Connector {
                    kind: ConnectorKind::Fork,
                    from: root_id.to_string(),
                    to: branch.start_id.clone(),
                    segments,
                }
            })
            .collect()
    }

    /// Connectors from every branch tail to the converge point below (or
    /// beside) the branch group. `group_end` is the main coordinate where
    /// the longest branch ends.
    pub(super) fn join(
        &self,
        root_id: &str,
        converge: Point,
        group_end: f32,
        branches: &[BranchEnds],
    ) -> Vec<Connector> {
        let o = self.orientation;
        let run = o.main_of(converge) - group_end;
        branches
            .iter()
            .map(|branch| {
                let aligned = (o.cross_of(branch.tail) - o.cross_of(converge)).abs() <= ALIGN_EPS;
                let segments = if aligned {
                    vec![Segment::Line {
                        from: branch.tail,
                        to: converge,
                    }]
                } else {
                    match o.join_style() {
                        JoinStyle::Corner => {
                            self.corner_route(branch.tail, converge, Bend::Trailing, run)
                        }
                        JoinStyle::Bezier => self.bezier_route(branch.tail, converge, group_end),
                    }
                };
                Connector {
                    kind: ConnectorKind::Join,
                    from: branch.end_id.clone(),
                    to: root_id.to_string(),
                    segments,
                }
            })
            .collect()
    }

    /// Corner, straight run, mirrored corner. `run` is the main-axis room
    /// the two corners may use.
    fn corner_route(&self, from: Point, to: Point, bend: Bend, run: f32) -> Vec<Segment> {
        let o = self.orientation;
        let (from_main, from_cross) = (o.main_of(from), o.cross_of(from));
        let (to_main, to_cross) = (o.main_of(to), o.cross_of(to));
        let delta = to_cross - from_cross;
        let sign = delta.signum();
        let radius = self
            .radius
            .min(run.max(0.0) / 2.0)
            .min(delta.abs() / 2.0);
        let bend_main = match bend {
            Bend::Leading => from_main,
            Bend::Trailing => to_main - 2.0 * radius,
        };

        let mut segments = Vec::new();
        let mut cursor = from;
        if bend_main - from_main > ALIGN_EPS {
            let next = o.point(bend_main, from_cross);
            segments.push(Segment::Line { from: cursor, to: next });
            cursor = next;
        }

        if radius <= ALIGN_EPS {
            let next = o.point(bend_main, to_cross);
            segments.push(Segment::Line { from: cursor, to: next });
            cursor = next;
        } else {
            let first = o.point(bend_main + radius, from_cross + sign * radius);
            segments.push(arc(
                cursor,
                first,
                o.point(bend_main, from_cross + sign * radius),
                radius,
            ));
            let second = o.point(bend_main + radius, to_cross - sign * radius);
            if delta.abs() - 2.0 * radius > ALIGN_EPS {
                segments.push(Segment::Line {
                    from: first,
                    to: second,
                });
            }
            let last = o.point(bend_main + 2.0 * radius, to_cross);
            segments.push(arc(
                second,
                last,
                o.point(bend_main + 2.0 * radius, to_cross - sign * radius),
                radius,
            ));
            cursor = last;
        }

        if to_main - o.main_of(cursor) > ALIGN_EPS {
            segments.push(Segment::Line { from: cursor, to });
        }
        segments
    }

    fn bezier_route(&self, from: Point, to: Point, bend_main: f32) -> Vec<Segment> {
        let o = self.orientation;
        let mut segments = Vec::new();
        let mut cursor = from;
        if bend_main - o.main_of(from) > ALIGN_EPS {
            let next = o.point(bend_main, o.cross_of(from));
            segments.push(Segment::Line { from: cursor, to: next });
            cursor = next;
        }
        let mid = (o.main_of(cursor) + o.main_of(to)) / 2.0;
        segments.push(Segment::Cubic {
            from: cursor,
            ctrl1: o.point(mid, o.cross_of(cursor)),
            ctrl2: o.point(mid, o.cross_of(to)),
            to,
        });
        segments
    }
}

fn arc(from: Point, to: Point, center: Point, radius: f32) -> Segment {
    // Screen coordinates grow downwards, so a positive cross product turns
    // clockwise on screen.
    let (ax, ay) = (from.x - center.x, from.y - center.y);
    let (bx, by) = (to.x - center.x, to.y - center.y);
    Segment::Arc {
        from,
        to,
        center,
        radius,
        clockwise: ax * by - ay * bx > 0.0,
    }
}
