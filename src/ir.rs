use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "vertical" | "TD" | "TB" => Some(Self::Vertical),
            "horizontal" | "LR" => Some(Self::Horizontal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    Task,
    Pass,
    Parallel,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Task => "Task",
            StateKind::Pass => "Pass",
            StateKind::Parallel => "Parallel",
        }
    }
}

/// Plain workflow tree, as read from and written to external storage.
///
/// Branches use the same shape as the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowDefinition {
    pub start_at: String,
    pub states: BTreeMap<String, StateDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StateDefinition {
    #[serde(rename = "Type")]
    pub kind: StateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub end: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub parameters: Parameters,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<WorkflowDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    #[serde(default)]
    pub task_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_icon: Option<String>,
    /// Display-only keys the editor carries around but never persists.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Parameters {
    pub fn new(task_type: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            task_icon: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.task_type.is_empty() && self.task_icon.is_none() && self.extra.is_empty()
    }

    pub(crate) fn trimmed(&self) -> Self {
        Self {
            task_type: self.task_type.clone(),
            task_icon: self.task_icon.clone(),
            extra: BTreeMap::new(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
