use crate::ir::{Orientation, StateKind};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Cached attachment points of a state: where incoming tie lines end and
/// outgoing ones start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchors {
    pub entry: Point,
    pub exit: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateLayout {
    pub id: String,
    pub kind: StateKind,
    pub label: String,
    pub task_type: String,
    pub task_icon: Option<String>,
    pub comment: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// `None` for Pass states, which attach connectors to their own edges.
    pub anchors: Option<Anchors>,
    /// Owning Parallel state, `None` at the top level.
    pub parent: Option<String>,
    pub depth: usize,
}

impl StateLayout {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Center of the leading edge along the main axis.
    pub fn leading_edge(&self, orientation: Orientation) -> Point {
        let center = self.center();
        match orientation {
            Orientation::Vertical => Point::new(center.x, self.y),
            Orientation::Horizontal => Point::new(self.x, center.y),
        }
    }

    /// Center of the trailing edge along the main axis.
    pub fn trailing_edge(&self, orientation: Orientation) -> Point {
        let center = self.center();
        match orientation {
            Orientation::Vertical => Point::new(center.x, self.y + self.height),
            Orientation::Horizontal => Point::new(self.x + self.width, center.y),
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
        if let Some(anchors) = self.anchors.as_mut() {
            anchors.entry = anchors.entry.translated(dx, dy);
            anchors.exit = anchors.exit.translated(dx, dy);
        }
    }
}

/// Insertion point between two states. Dropping a state here moves it
/// right after `after`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropSlot {
    pub id: String,
    pub after: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DropSlot {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    /// Straight line between consecutive items of one scope.
    Tie,
    /// Parallel root to the entry of one branch.
    Fork,
    /// Tail of one branch back to the root's converge point.
    Join,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        from: Point,
        to: Point,
    },
    /// Quarter circle around `center`.
    Arc {
        from: Point,
        to: Point,
        center: Point,
        radius: f32,
        clockwise: bool,
    },
    Cubic {
        from: Point,
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
}

impl Segment {
    pub fn start(&self) -> Point {
        match self {
            Segment::Line { from, .. } | Segment::Arc { from, .. } | Segment::Cubic { from, .. } => {
                *from
            }
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Segment::Line { to, .. } | Segment::Arc { to, .. } | Segment::Cubic { to, .. } => *to,
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            Segment::Line { from, to } => {
                *from = from.translated(dx, dy);
                *to = to.translated(dx, dy);
            }
            Segment::Arc {
                from, to, center, ..
            } => {
                *from = from.translated(dx, dy);
                *to = to.translated(dx, dy);
                *center = center.translated(dx, dy);
            }
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                *from = from.translated(dx, dy);
                *ctrl1 = ctrl1.translated(dx, dy);
                *ctrl2 = ctrl2.translated(dx, dy);
                *to = to.translated(dx, dy);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub from: String,
    pub to: String,
    pub segments: Vec<Segment>,
}

impl Connector {
    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(Segment::start)
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(Segment::end)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for segment in &mut self.segments {
            segment.translate(dx, dy);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub orientation: Orientation,
    /// States in visiting order: each scope from start to end, a Parallel
    /// root followed by its branches.
    pub states: Vec<StateLayout>,
    pub connectors: Vec<Connector>,
    pub slots: Vec<DropSlot>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn state(&self, id: &str) -> Option<&StateLayout> {
        self.states.iter().find(|state| state.id == id)
    }

    /// Resolves a drop slot to the id of the state it follows.
    pub fn locate(&self, slot_id: &str) -> Option<&str> {
        self.slots
            .iter()
            .find(|slot| slot.id == slot_id)
            .map(|slot| slot.after.as_str())
    }

    pub fn slot_after(&self, state_id: &str) -> Option<&DropSlot> {
        self.slots.iter().find(|slot| slot.after == state_id)
    }

    /// Top-left and bottom-right corners of the box covering every state
    /// and slot.
    pub fn bounds(&self) -> (Point, Point) {
        let boxes = self
            .states
            .iter()
            .map(|state| (state.x, state.y, state.width, state.height))
            .chain(
                self.slots
                    .iter()
                    .map(|slot| (slot.x, slot.y, slot.width, slot.height)),
            );
        let mut min = Point::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for (x, y, width, height) in boxes {
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            max.x = max.x.max(x + width);
            max.y = max.y.max(y + height);
        }
        if min.x > max.x {
            return (Point::default(), Point::default());
        }
        (min, max)
    }
}
