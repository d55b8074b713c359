use crate::layout::{ConnectorKind, Layout, Point, Segment};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub orientation: String,
    pub width: f32,
    pub height: f32,
    pub states: Vec<StateDump>,
    pub connectors: Vec<ConnectorDump>,
    pub slots: Vec<SlotDump>,
}

#[derive(Debug, Serialize)]
pub struct StateDump {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub task_type: String,
    pub task_icon: Option<String>,
    pub comment: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub entry: Option<[f32; 2]>,
    pub exit: Option<[f32; 2]>,
    pub parent: Option<String>,
    pub depth: usize,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub kind: String,
    pub from: String,
    pub to: String,
    pub segments: Vec<SegmentDump>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SegmentDump {
    Line {
        from: [f32; 2],
        to: [f32; 2],
    },
    Arc {
        from: [f32; 2],
        to: [f32; 2],
        center: [f32; 2],
        radius: f32,
        clockwise: bool,
    },
    Cubic {
        from: [f32; 2],
        ctrl1: [f32; 2],
        ctrl2: [f32; 2],
        to: [f32; 2],
    },
}

#[derive(Debug, Serialize)]
pub struct SlotDump {
    pub id: String,
    pub after: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

fn pair(point: Point) -> [f32; 2] {
    [point.x, point.y]
}

impl From<&Segment> for SegmentDump {
    fn from(segment: &Segment) -> Self {
        match *segment {
            Segment::Line { from, to } => SegmentDump::Line {
                from: pair(from),
                to: pair(to),
            },
            Segment::Arc {
                from,
                to,
                center,
                radius,
                clockwise,
            } => SegmentDump::Arc {
                from: pair(from),
                to: pair(to),
                center: pair(center),
                radius,
                clockwise,
            },
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => SegmentDump::Cubic {
                from: pair(from),
                ctrl1: pair(ctrl1),
                ctrl2: pair(ctrl2),
                to: pair(to),
            },
        }
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let states = layout
            .states
            .iter()
            .map(|state| StateDump {
                id: state.id.clone(),
                kind: state.kind.as_str().to_string(),
                label: state.label.clone(),
                task_type: state.task_type.clone(),
                task_icon: state.task_icon.clone(),
                comment: state.comment.clone(),
                x: state.x,
                y: state.y,
                width: state.width,
                height: state.height,
                entry: state.anchors.map(|anchors| pair(anchors.entry)),
                exit: state.anchors.map(|anchors| pair(anchors.exit)),
                parent: state.parent.clone(),
                depth: state.depth,
            })
            .collect();

        let connectors = layout
            .connectors
            .iter()
            .map(|connector| ConnectorDump {
                kind: match connector.kind {
                    ConnectorKind::Tie => "tie",
                    ConnectorKind::Fork => "fork",
                    ConnectorKind::Join => "join",
                }
                .to_string(),
                from: connector.from.clone(),
                to: connector.to.clone(),
                segments: connector.segments.iter().map(SegmentDump::from).collect(),
            })
            .collect();

        let slots = layout
            .slots
            .iter()
            .map(|slot| SlotDump {
                id: slot.id.clone(),
                after: slot.after.clone(),
                x: slot.x,
                y: slot.y,
                width: slot.width,
                height: slot.height,
            })
            .collect();

        LayoutDump {
            orientation: format!("{:?}", layout.orientation).to_lowercase(),
            width: layout.width,
            height: layout.height,
            states,
            connectors,
            slots,
        }
    }
}

/// Writes the layout as pretty JSON to `path`, or to stdout when no path is
/// given.
pub fn write_layout_dump(path: Option<&Path>, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let mut writer = BufWriter::new(io::stdout().lock());
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
