mod axis;
pub mod routing;
mod text;
pub(crate) mod types;
pub use types::*;

use routing::{BranchEnds, BranchSides, ConnectorRouter};
use text::fit_label;

use crate::config::LayoutConfig;
use crate::ir::{Orientation, StateKind};
use crate::workflow::{State, WorkflowError, WorkflowGraph};
use tracing::trace;

/// Cross coordinate every scope is first placed on. Parents shift their
/// branch scopes into place afterwards.
const SCOPE_AXIS: f32 = 0.0;

/// Lays out the whole workflow so that its bounding box starts at
/// `config.padding` on both axes.
pub fn compute_layout(graph: &WorkflowGraph, config: &LayoutConfig) -> Result<Layout, WorkflowError> {
    let engine = LayoutEngine::new(config);
    let padding = engine.config.padding;
    let mut scope = engine.place_scope(graph, padding, 0)?;
    scope.shift_cross(engine.orientation(), padding - scope.cross_min);
    let mut layout = engine.finish(scope);
    let (_, max) = layout.bounds();
    layout.width = max.x + padding;
    layout.height = max.y + padding;
    Ok(layout)
}

/// Recursive placement of states, drop slots and connectors.
///
/// The engine is stateless between calls: the write cursor of each scope is
/// a local value and every scope hands its result back to its caller, so
/// laying out the same graph twice yields identical output. Each scope is
/// placed exactly once; branch groups are measured from the placed result
/// and then translated, so the cost stays linear in the number of states
/// per nesting level.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    router: ConnectorRouter,
}

/// Accumulated output of one scope.
#[derive(Debug, Clone, Default)]
struct ScopeLayout {
    states: Vec<StateLayout>,
    slots: Vec<DropSlot>,
    connectors: Vec<Connector>,
    start_id: String,
    end_id: String,
    entry: Point,
    exit: Point,
    /// Main coordinate where the last item ends, trailing margin excluded.
    main_end: f32,
    cross_min: f32,
    cross_max: f32,
}

impl ScopeLayout {
    fn include_cross(&mut self, cross: f32, cross_len: f32) {
        self.cross_min = self.cross_min.min(cross - cross_len / 2.0);
        self.cross_max = self.cross_max.max(cross + cross_len / 2.0);
    }

    fn absorb(&mut self, other: ScopeLayout) {
        self.cross_min = self.cross_min.min(other.cross_min);
        self.cross_max = self.cross_max.max(other.cross_max);
        self.states.extend(other.states);
        self.slots.extend(other.slots);
        self.connectors.extend(other.connectors);
    }

    /// Moves everything placed so far by `delta` along the cross axis.
    fn shift_cross(&mut self, orientation: Orientation, delta: f32) {
        if delta == 0.0 {
            return;
        }
        let Point { x: dx, y: dy } = orientation.point(0.0, delta);
        for state in &mut self.states {
            state.translate(dx, dy);
        }
        for slot in &mut self.slots {
            slot.translate(dx, dy);
        }
        for connector in &mut self.connectors {
            connector.translate(dx, dy);
        }
        self.entry = self.entry.translated(dx, dy);
        self.exit = self.exit.translated(dx, dy);
        self.cross_min += delta;
        self.cross_max += delta;
    }
}

/// Result of placing one item of a scope: a plain state or a Parallel root
/// together with its branch group.
struct Placement {
    entry: Point,
    exit: Point,
    item_end: f32,
    nested: ScopeLayout,
}

impl LayoutEngine {
    pub fn new(config: &LayoutConfig) -> Self {
        let config = config.sanitized();
        let router = ConnectorRouter::new(config.orientation, config.corner_radius);
        Self { config, router }
    }

    pub fn orientation(&self) -> Orientation {
        self.config.orientation
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out `graph` with its first state's leading edge centered on
    /// `origin`. Nested branches are placed recursively; `width` and
    /// `height` of the result cover every state and slot.
    pub fn layout_scope(&self, graph: &WorkflowGraph, origin: Point) -> Result<Layout, WorkflowError> {
        let o = self.orientation();
        let mut scope = self.place_scope(graph, o.main_of(origin), 0)?;
        scope.shift_cross(o, o.cross_of(origin) - SCOPE_AXIS);
        let mut layout = self.finish(scope);
        let (min, max) = layout.bounds();
        layout.width = max.x - min.x;
        layout.height = max.y - min.y;
        Ok(layout)
    }

    fn finish(&self, scope: ScopeLayout) -> Layout {
        trace!(
            states = scope.states.len(),
            slots = scope.slots.len(),
            connectors = scope.connectors.len(),
            "laid out workflow scope"
        );
        Layout {
            orientation: self.orientation(),
            states: scope.states,
            connectors: scope.connectors,
            slots: scope.slots,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Places one scope starting at `main`, centered on [`SCOPE_AXIS`].
    fn place_scope(
        &self,
        graph: &WorkflowGraph,
        main: f32,
        depth: usize,
    ) -> Result<ScopeLayout, WorkflowError> {
        let sequence = graph.sequence()?;
        let mut scope = ScopeLayout {
            start_id: graph.start_id().to_string(),
            end_id: graph.end_id().to_string(),
            main_end: main,
            cross_min: SCOPE_AXIS,
            cross_max: SCOPE_AXIS,
            ..ScopeLayout::default()
        };

        let mut cursor = main;
        let mut previous: Option<(&str, Point)> = None;
        for (idx, state) in sequence.iter().enumerate() {
            let placed = self.place_item(state, graph.parent(), cursor, depth)?;
            if idx == 0 {
                scope.entry = placed.entry;
            }
            if let Some((from_id, from)) = previous {
                scope
                    .connectors
                    .push(self.router.tie(from_id, &state.id, from, placed.entry));
            }
            let item_end = placed.item_end;
            let exit = placed.exit;
            scope.absorb(placed.nested);

            if state.is_branch_root() || !state.end {
                let slot = self.drop_slot(&state.id, item_end, SCOPE_AXIS);
                scope.include_cross(SCOPE_AXIS, self.config.drop_area_length);
                scope.slots.push(slot);
            }

            scope.exit = exit;
            scope.main_end = item_end;
            previous = Some((state.id.as_str(), exit));
            cursor = item_end + self.config.margin;
        }
        Ok(scope)
    }

    fn place_item(
        &self,
        state: &State,
        parent: Option<&str>,
        cursor: f32,
        depth: usize,
    ) -> Result<Placement, WorkflowError> {
        let o = self.orientation();
        let footprint_main = o.main_extent(self.config.state_width, self.config.state_height);
        let footprint_cross = o.cross_extent(self.config.state_width, self.config.state_height);

        let positioned = self.position_state(state, parent, cursor, SCOPE_AXIS, depth);
        let entry = self.router.entry_point(&positioned);
        let root_exit = self.router.exit_point(&positioned);

        let mut nested = ScopeLayout {
            cross_min: SCOPE_AXIS,
            cross_max: SCOPE_AXIS,
            ..ScopeLayout::default()
        };
        nested.include_cross(SCOPE_AXIS, footprint_cross);
        nested.states.push(positioned);

        let state_end = cursor + footprint_main;
        if !state.is_branch_root() {
            return Ok(Placement {
                entry,
                exit: root_exit,
                item_end: state_end,
                nested,
            });
        }

        let group_main = state_end + self.config.branch_margin;
        let (group, ends, group_end) = self.place_branches(state, group_main, depth + 1)?;
        nested.absorb(group);

        let item_end = group_end + self.config.branch_margin;
        let converge = o.point(item_end, SCOPE_AXIS);
        nested
            .connectors
            .extend(self.router.fork(&state.id, root_exit, &ends));
        nested
            .connectors
            .extend(self.router.join(&state.id, converge, group_end, &ends));

        Ok(Placement {
            entry,
            exit: converge,
            item_end,
            nested,
        })
    }

    /// Places every branch of a Parallel state once, on the scope axis, then
    /// spreads them along the cross axis. Even groups are centered as a
    /// whole; odd groups keep the middle branch on the root's axis with the
    /// left and right halves stacked outward from it.
    fn place_branches(
        &self,
        root: &State,
        main: f32,
        depth: usize,
    ) -> Result<(ScopeLayout, Vec<BranchEnds>, f32), WorkflowError> {
        let mut placed = Vec::with_capacity(root.branches.len());
        for branch in &root.branches {
            placed.push(self.place_scope(branch, main, depth)?);
        }
        let centers = self.branch_centers(&placed);

        let mut group = ScopeLayout {
            cross_min: SCOPE_AXIS,
            cross_max: SCOPE_AXIS,
            ..ScopeLayout::default()
        };
        let mut ends = Vec::with_capacity(placed.len());
        let mut group_end = main;
        for (mut scope, center) in placed.into_iter().zip(centers) {
            scope.shift_cross(self.orientation(), center - SCOPE_AXIS);
            group_end = group_end.max(scope.main_end);
            ends.push(BranchEnds {
                start_id: scope.start_id.clone(),
                end_id: scope.end_id.clone(),
                entry: scope.entry,
                tail: scope.exit,
            });
            group.absorb(scope);
        }
        Ok((group, ends, group_end))
    }

    /// Cross-axis center of each branch, given branches placed on the
    /// scope axis.
    fn branch_centers(&self, placed: &[ScopeLayout]) -> Vec<f32> {
        let gap = self.config.branch_gap;
        let before = |scope: &ScopeLayout| SCOPE_AXIS - scope.cross_min;
        let after = |scope: &ScopeLayout| scope.cross_max - SCOPE_AXIS;
        let sides = BranchSides::classify(placed.len());
        let mut centers = vec![SCOPE_AXIS; placed.len()];

        let Some(middle) = sides.middle else {
            let total: f32 = placed
                .iter()
                .map(|scope| before(scope) + after(scope))
                .sum::<f32>()
                + gap * placed.len().saturating_sub(1) as f32;
            let mut offset = SCOPE_AXIS - total / 2.0;
            for (center, scope) in centers.iter_mut().zip(placed) {
                *center = offset + before(scope);
                offset = *center + after(scope) + gap;
            }
            return centers;
        };

        let mut edge = SCOPE_AXIS - before(&placed[middle]) - gap;
        for idx in sides.left.rev() {
            centers[idx] = edge - after(&placed[idx]);
            edge = centers[idx] - before(&placed[idx]) - gap;
        }
        let mut edge = SCOPE_AXIS + after(&placed[middle]) + gap;
        for idx in sides.right {
            centers[idx] = edge + before(&placed[idx]);
            edge = centers[idx] + after(&placed[idx]) + gap;
        }
        centers
    }

    fn position_state(
        &self,
        state: &State,
        parent: Option<&str>,
        cursor: f32,
        cross: f32,
        depth: usize,
    ) -> StateLayout {
        let o = self.orientation();
        let (full_w, full_h) = (self.config.state_width, self.config.state_height);
        let footprint_main = o.main_extent(full_w, full_h);
        let (width, height) = match state.kind {
            StateKind::Pass => (self.config.pass_width, self.config.pass_height),
            StateKind::Task | StateKind::Parallel => (full_w, full_h),
        };
        let main_len = o.main_extent(width, height);
        let cross_len = o.cross_extent(width, height);
        let main = cursor + (footprint_main - main_len) / 2.0;
        let (x, y, width, height) = o.rect(main, cross, main_len, cross_len);

        let anchors = match state.kind {
            StateKind::Pass => None,
            StateKind::Task | StateKind::Parallel => Some(Anchors {
                entry: o.point(cursor, cross),
                exit: o.point(cursor + footprint_main, cross),
            }),
        };
        let label_room = width - self.config.label_padding * 2.0;

        StateLayout {
            id: state.id.clone(),
            kind: state.kind,
            label: fit_label(&state.id, label_room, self.config.font_size),
            task_type: state.parameters.task_type.clone(),
            task_icon: state.parameters.task_icon.clone(),
            comment: state.comment.clone(),
            x,
            y,
            width,
            height,
            anchors,
            parent: parent.map(str::to_string),
            depth,
        }
    }

    fn drop_slot(&self, after: &str, item_end: f32, cross: f32) -> DropSlot {
        let o = self.orientation();
        let thickness = self.config.drop_area_thickness;
        let center_main = item_end + self.config.margin / 2.0;
        let (x, y, width, height) = o.rect(
            center_main - thickness / 2.0,
            cross,
            thickness,
            self.config.drop_area_length,
        );
        DropSlot {
            id: format!("drop-after-{after}"),
            after: after.to_string(),
            x,
            y,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::fixtures::*;
    use std::collections::HashSet;

    fn vertical() -> LayoutConfig {
        LayoutConfig::default()
    }

    fn horizontal() -> LayoutConfig {
        LayoutConfig {
            orientation: Orientation::Horizontal,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn visits_every_state_once() {
        let graph = branching();
        let layout = compute_layout(&graph, &vertical()).unwrap();
        let ids: Vec<&str> = layout.states.iter().map(|state| state.id.as_str()).collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), graph.state_count());
        assert_eq!(unique.len(), ids.len());
        assert_eq!(ids.first(), Some(&"Start"));
        assert_eq!(ids.last(), Some(&"End"));
    }

    #[test]
    fn layout_is_idempotent() {
        let graph = branching();
        let engine = LayoutEngine::new(&vertical());
        let origin = Point::new(300.0, 10.0);
        let first = engine.layout_scope(&graph, origin).unwrap();
        let second = engine.layout_scope(&graph, origin).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn linear_states_share_one_column() {
        let graph = linear();
        let config = vertical();
        let layout = compute_layout(&graph, &config).unwrap();
        let start = layout.state("Start").unwrap();
        let a = layout.state("A").unwrap();
        assert_eq!(start.center().x, a.center().x);
        assert_eq!(a.y - start.y, config.state_height + config.margin);
        assert_eq!(start.y, config.padding);
    }

    #[test]
    fn pass_states_are_centered_in_the_full_footprint() {
        let graph = linear();
        let config = vertical();
        let layout = compute_layout(&graph, &config).unwrap();
        let a = layout.state("A").unwrap();
        let end = layout.state("End").unwrap();
        assert_eq!(end.width, config.pass_width);
        assert_eq!(end.height, config.pass_height);
        assert_eq!(end.center().x, a.center().x);
        let footprint_top = a.y + config.state_height + config.margin;
        assert_eq!(end.center().y, footprint_top + config.state_height / 2.0);
        assert!(end.anchors.is_none());
        assert!(a.anchors.is_some());

        // The tie into the Pass state ends on its own (smaller) box.
        let tie = layout
            .connectors
            .iter()
            .find(|connector| connector.to == "End")
            .unwrap();
        assert_eq!(tie.end(), Some(end.leading_edge(Orientation::Vertical)));
    }

    #[test]
    fn branches_are_symmetric_around_the_root() {
        let graph = branching();
        let config = vertical();
        let layout = compute_layout(&graph, &config).unwrap();
        let root = layout.state("Root").unwrap();
        let x = layout.state("X").unwrap();
        let y = layout.state("Y").unwrap();
        let axis = root.center().x;

        assert!(x.center().x < axis);
        assert!(y.center().x > axis);
        assert!((axis - x.center().x - (y.center().x - axis)).abs() < 0.001);
        assert_eq!(x.y, y.y);
        assert_eq!(x.y, root.y + config.state_height + config.branch_margin);
        assert_eq!(x.parent.as_deref(), Some("Root"));
        assert_eq!(x.depth, 1);
        assert!(x.x + x.width + config.branch_gap <= y.x + 0.001);

        let last = layout.state("Last").unwrap();
        let end1 = layout.state("End1").unwrap();
        assert_eq!(last.center().x, axis);
        let expected = end1.y
            + config.state_height
            + config.branch_margin
            + config.margin;
        assert_eq!(last.y, expected);
    }

    #[test]
    fn slots_follow_each_item() {
        let graph = branching();
        let config = vertical();
        let layout = compute_layout(&graph, &config).unwrap();
        let afters: HashSet<&str> = layout.slots.iter().map(|slot| slot.after.as_str()).collect();
        let expected: HashSet<&str> = ["Start", "Root", "Last", "X", "Y"].into_iter().collect();
        assert_eq!(afters, expected);

        let start = layout.state("Start").unwrap();
        let slot = layout.slot_after("Start").unwrap();
        assert_eq!(slot.center().x, start.center().x);
        assert_eq!(
            slot.center().y,
            start.y + config.state_height + config.margin / 2.0
        );
        assert_eq!(layout.locate(&slot.id), Some("Start"));
        assert_eq!(layout.locate("drop-after-nowhere"), None);

        // The slot of a Parallel root sits below its whole branch group.
        let root_slot = layout.slot_after("Root").unwrap();
        let end1 = layout.state("End1").unwrap();
        assert!(root_slot.y > end1.y + end1.height);
    }

    #[test]
    fn connectors_link_every_hop() {
        let graph = branching();
        let layout = compute_layout(&graph, &vertical()).unwrap();
        let count = |kind: ConnectorKind| {
            layout
                .connectors
                .iter()
                .filter(|connector| connector.kind == kind)
                .count()
        };
        // Start->Root, Root->Last, Last->End, X->End1, Y->End2.
        assert_eq!(count(ConnectorKind::Tie), 5);
        assert_eq!(count(ConnectorKind::Fork), 2);
        assert_eq!(count(ConnectorKind::Join), 2);

        let root = layout.state("Root").unwrap();
        let fork = layout
            .connectors
            .iter()
            .find(|connector| connector.kind == ConnectorKind::Fork && connector.to == "Y")
            .unwrap();
        assert_eq!(fork.start(), root.anchors.map(|anchors| anchors.exit));
        let y = layout.state("Y").unwrap();
        assert_eq!(fork.end(), y.anchors.map(|anchors| anchors.entry));

        let joins: Vec<&Connector> = layout
            .connectors
            .iter()
            .filter(|connector| connector.kind == ConnectorKind::Join)
            .collect();
        assert_eq!(joins[0].end(), joins[1].end());
        let after_group = layout
            .connectors
            .iter()
            .find(|connector| connector.from == "Root" && connector.to == "Last")
            .unwrap();
        assert_eq!(after_group.start(), joins[0].end());
    }

    #[test]
    fn odd_branch_groups_keep_the_middle_in_line() {
        let graph = fan_out(3);
        let layout = compute_layout(&graph, &vertical()).unwrap();
        let root = layout.state("Root").unwrap();
        let middle = layout.state("B1").unwrap();
        assert_eq!(middle.center().x, root.center().x);
        let fork = layout
            .connectors
            .iter()
            .find(|connector| connector.kind == ConnectorKind::Fork && connector.to == "B1")
            .unwrap();
        assert_eq!(fork.segments.len(), 1);
    }

    fn assert_axis_aligned(layout: &Layout) {
        for connector in &layout.connectors {
            for segment in &connector.segments {
                if let Segment::Line { from, to } = segment {
                    assert!(
                        (from.x - to.x).abs() < 0.01 || (from.y - to.y).abs() < 0.01,
                        "diagonal line in {} -> {}: {segment:?}",
                        connector.from,
                        connector.to
                    );
                }
            }
        }
    }

    #[test]
    fn odd_groups_keep_the_middle_on_the_root_axis_when_lopsided() {
        let graph = lopsided();
        for config in [vertical(), horizontal()] {
            let o = config.orientation;
            let layout = compute_layout(&graph, &config).unwrap();
            let root = layout.state("Root").unwrap();
            let wide = layout.state("Wide").unwrap();
            let mid = layout.state("Mid").unwrap();
            let right = layout.state("Right").unwrap();
            let axis = o.cross_of(root.center());

            assert_eq!(o.cross_of(mid.center()), axis);
            assert!(o.cross_of(wide.center()) < axis);
            assert!(o.cross_of(right.center()) > axis);
            let w3 = layout.state("W3").unwrap();
            let w3_edge = o.cross_of(w3.center()) + o.cross_extent(w3.width, w3.height) / 2.0;
            let mid_edge = axis - o.cross_extent(mid.width, mid.height) / 2.0;
            assert!(w3_edge + config.branch_gap <= mid_edge + 0.001, "{o:?}");

            let fork = layout
                .connectors
                .iter()
                .find(|connector| connector.kind == ConnectorKind::Fork && connector.to == "Mid")
                .unwrap();
            assert_eq!(fork.segments.len(), 1);
            let join = layout
                .connectors
                .iter()
                .find(|connector| connector.kind == ConnectorKind::Join && connector.from == "Mid")
                .unwrap();
            assert_eq!(join.segments.len(), 1);
            assert_axis_aligned(&layout);
        }
    }

    #[test]
    fn deep_nesting_is_laid_out_in_linear_time() {
        let depth = 20;
        let graph = nested_chain(depth);
        let started = std::time::Instant::now();
        let layout = compute_layout(&graph, &vertical()).unwrap();
        let elapsed = started.elapsed();
        assert_eq!(layout.states.len(), graph.state_count());
        assert_eq!(layout.state("Leaf").unwrap().depth, depth);
        assert!(
            elapsed < std::time::Duration::from_secs(2),
            "layout of {depth} nested groups took {elapsed:?}"
        );
        assert_axis_aligned(&layout);
    }

    #[test]
    fn nested_branches_widen_their_parent_group() {
        let graph = graph(
            r#"{
                "StartAt": "Root",
                "States": {
                    "Root": {
                        "Type": "Parallel",
                        "End": true,
                        "Branches": [
                            {
                                "StartAt": "Inner",
                                "States": {
                                    "Inner": {
                                        "Type": "Parallel",
                                        "End": true,
                                        "Branches": [
                                            { "StartAt": "D1", "States": { "D1": { "Type": "Task", "End": true } } },
                                            { "StartAt": "D2", "States": { "D2": { "Type": "Task", "End": true } } }
                                        ]
                                    }
                                }
                            },
                            { "StartAt": "Plain", "States": { "Plain": { "Type": "Task", "End": true } } }
                        ]
                    }
                }
            }"#,
        );
        let config = vertical();
        let layout = compute_layout(&graph, &config).unwrap();
        let d2 = layout.state("D2").unwrap();
        let plain = layout.state("Plain").unwrap();
        assert!(d2.x + d2.width + config.branch_gap <= plain.x + 0.001);
        assert_eq!(layout.state("D1").unwrap().depth, 2);

        // Root is the scope end but still gets a slot after its group.
        assert!(layout.slot_after("Root").is_some());
        assert!(layout.slot_after("Inner").is_some());
        assert!(layout.slot_after("D1").is_none());

        for state in &layout.states {
            assert!(state.x >= config.padding - 0.001, "{} is off canvas", state.id);
            assert!(state.x + state.width <= layout.width - config.padding + 0.001);
        }
    }

    #[test]
    fn horizontal_layout_runs_left_to_right() {
        let graph = branching();
        let config = horizontal();
        let layout = compute_layout(&graph, &config).unwrap();
        assert_eq!(layout.orientation, Orientation::Horizontal);
        let start = layout.state("Start").unwrap();
        let root = layout.state("Root").unwrap();
        let x = layout.state("X").unwrap();
        let y = layout.state("Y").unwrap();
        assert_eq!(start.center().y, root.center().y);
        assert_eq!(root.x - start.x, config.state_width + config.margin);
        assert!(x.center().y < root.center().y && y.center().y > root.center().y);
        assert_eq!(x.x, root.x + config.state_width + config.branch_margin);
        assert!(layout.connectors.iter().any(|connector| {
            connector.kind == ConnectorKind::Join
                && connector
                    .segments
                    .iter()
                    .any(|segment| matches!(segment, Segment::Cubic { .. }))
        }));
        assert!(layout.width > layout.height);
    }

    #[test]
    fn layout_reflects_moves() {
        let mut graph = branching();
        let config = vertical();
        let before = compute_layout(&graph, &config).unwrap();
        let slot = before.slot_after("X").unwrap().id.clone();
        let after = before.locate(&slot).unwrap().to_string();
        assert!(graph.move_state("Last", &after).unwrap().is_moved());

        let moved = compute_layout(&graph, &config).unwrap();
        let last = moved.state("Last").unwrap();
        assert_eq!(last.parent.as_deref(), Some("Root"));
        assert_eq!(last.center().x, moved.state("X").unwrap().center().x);
        assert_eq!(moved.states.len(), before.states.len());
    }
}
