use crate::ir::Orientation;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub orientation: Orientation,
    /// Footprint of Task and Parallel states.
    pub state_width: f32,
    pub state_height: f32,
    /// Reduced box of Pass states, centered in the full footprint.
    pub pass_width: f32,
    pub pass_height: f32,
    /// Main-axis gap between consecutive items of one scope.
    pub margin: f32,
    /// Main-axis gap between a Parallel root and its branch group, and
    /// between the group and the point where the branches converge.
    pub branch_margin: f32,
    /// Cross-axis gap between sibling branches.
    pub branch_gap: f32,
    /// Drop slot extent along the cross axis and the main axis.
    pub drop_area_length: f32,
    pub drop_area_thickness: f32,
    pub corner_radius: f32,
    pub font_size: f32,
    pub label_padding: f32,
    /// Blank border kept around the whole diagram by `compute_layout`.
    pub padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            state_width: 180.0,
            state_height: 44.0,
            pass_width: 120.0,
            pass_height: 32.0,
            margin: 40.0,
            branch_margin: 32.0,
            branch_gap: 40.0,
            drop_area_length: 100.0,
            drop_area_thickness: 16.0,
            corner_radius: 12.0,
            font_size: 14.0,
            label_padding: 12.0,
            padding: 20.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub layout: LayoutConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    orientation: Option<Orientation>,
    state_width: Option<f32>,
    state_height: Option<f32>,
    pass_width: Option<f32>,
    pass_height: Option<f32>,
    margin: Option<f32>,
    branch_margin: Option<f32>,
    branch_gap: Option<f32>,
    drop_area_length: Option<f32>,
    drop_area_thickness: Option<f32>,
    corner_radius: Option<f32>,
    font_size: Option<f32>,
    label_padding: Option<f32>,
    padding: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    if let Some(layout) = parsed.layout {
        apply_layout_overrides(&mut config.layout, layout);
    }
    config.layout = config.layout.sanitized();

    Ok(config)
}

fn apply_layout_overrides(config: &mut LayoutConfig, file: LayoutConfigFile) {
    if let Some(v) = file.orientation {
        config.orientation = v;
    }
    if let Some(v) = file.state_width {
        config.state_width = v;
    }
    if let Some(v) = file.state_height {
        config.state_height = v;
    }
    if let Some(v) = file.pass_width {
        config.pass_width = v;
    }
    if let Some(v) = file.pass_height {
        config.pass_height = v;
    }
    if let Some(v) = file.margin {
        config.margin = v;
    }
    if let Some(v) = file.branch_margin {
        config.branch_margin = v;
    }
    if let Some(v) = file.branch_gap {
        config.branch_gap = v;
    }
    if let Some(v) = file.drop_area_length {
        config.drop_area_length = v;
    }
    if let Some(v) = file.drop_area_thickness {
        config.drop_area_thickness = v;
    }
    if let Some(v) = file.corner_radius {
        config.corner_radius = v;
    }
    if let Some(v) = file.font_size {
        config.font_size = v;
    }
    if let Some(v) = file.label_padding {
        config.label_padding = v;
    }
    if let Some(v) = file.padding {
        config.padding = v;
    }
}

impl LayoutConfig {
    /// Copy with every size clamped to a usable range. Pass boxes never
    /// exceed the footprint they are centered in.
    pub fn sanitized(&self) -> Self {
        let state_width = self.state_width.max(1.0);
        let state_height = self.state_height.max(1.0);
        Self {
            orientation: self.orientation,
            state_width,
            state_height,
            pass_width: self.pass_width.clamp(1.0, state_width),
            pass_height: self.pass_height.clamp(1.0, state_height),
            margin: self.margin.max(0.0),
            branch_margin: self.branch_margin.max(0.0),
            branch_gap: self.branch_gap.max(0.0),
            drop_area_length: self.drop_area_length.max(0.0),
            drop_area_thickness: self.drop_area_thickness.max(0.0),
            corner_radius: self.corner_radius.max(0.0),
            font_size: self.font_size.max(1.0),
            label_padding: self.label_padding.max(0.0),
            padding: self.padding.max(0.0),
        }
    }
}
