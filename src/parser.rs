use crate::ir::WorkflowDefinition;
use crate::workflow::WorkflowGraph;
use anyhow::{Context, Result};

pub struct ParseOutput {
    pub graph: WorkflowGraph,
    pub definition: WorkflowDefinition,
}

/// Parses a workflow definition and builds its graph.
///
/// Strict JSON is tried first; hand-written definitions with comments or
/// trailing commas fall back to JSON5.
pub fn parse_workflow(input: &str) -> Result<ParseOutput> {
    let definition = parse_definition(input)?;
    let graph = WorkflowGraph::from_definition(&definition)
        .context("workflow definition violates graph invariants")?;
    Ok(ParseOutput { graph, definition })
}

pub fn parse_definition(input: &str) -> Result<WorkflowDefinition> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("workflow definition is empty"));
    }
    match serde_json::from_str::<WorkflowDefinition>(trimmed) {
        Ok(definition) => Ok(definition),
        Err(json_err) => json5::from_str::<WorkflowDefinition>(trimmed)
            .map_err(|json5_err| anyhow::anyhow!("{json5_err} (as strict JSON: {json_err})"))
            .context("failed to parse workflow definition"),
    }
}
