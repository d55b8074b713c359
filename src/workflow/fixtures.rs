use super::WorkflowGraph;
use crate::ir::WorkflowDefinition;

pub(crate) fn definition(json: &str) -> WorkflowDefinition {
    serde_json::from_str(json).expect("fixture definition")
}

pub(crate) fn graph(json: &str) -> WorkflowGraph {
    WorkflowGraph::from_definition(&definition(json)).expect("fixture graph")
}

/// `Start -> A -> End`
pub(crate) fn linear() -> WorkflowGraph {
    graph(
        r#"{
            "StartAt": "Start",
            "States": {
                "Start": { "Type": "Task", "Next": "A", "Parameters": { "taskType": "lambda" } },
                "A": { "Type": "Task", "Next": "End", "Parameters": { "taskType": "lambda" } },
                "End": { "Type": "Pass", "End": true }
            }
        }"#,
    )
}

/// `Start -> Root[X -> End1 | Y -> End2] -> Last -> End`
pub(crate) fn branching() -> WorkflowGraph {
    graph(
        r#"{
            "StartAt": "Start",
            "States": {
                "Start": { "Type": "Task", "Next": "Root", "Parameters": { "taskType": "lambda" } },
                "Root": {
                    "Type": "Parallel",
                    "Next": "Last",
                    "Branches": [
                        {
                            "StartAt": "X",
                            "States": {
                                "X": { "Type": "Task", "Next": "End1", "Parameters": { "taskType": "sns" } },
                                "End1": { "Type": "Task", "End": true, "Parameters": { "taskType": "sns" } }
                            }
                        },
                        {
                            "StartAt": "Y",
                            "States": {
                                "Y": { "Type": "Task", "Next": "End2", "Parameters": { "taskType": "sqs" } },
                                "End2": { "Type": "Task", "End": true, "Parameters": { "taskType": "sqs" } }
                            }
                        }
                    ]
                },
                "Last": { "Type": "Task", "Next": "End", "Parameters": { "taskType": "lambda" } },
                "End": { "Type": "Pass", "End": true }
            }
        }"#,
    )
}

/// Parallel root with `count` single-state branches, followed by `After`.
pub(crate) fn fan_out(count: usize) -> WorkflowGraph {
    let branches: Vec<String> = (0..count)
        .map(|idx| {
            format!(
                r#"{{ "StartAt": "B{idx}", "States": {{ "B{idx}": {{ "Type": "Task", "End": true }} }} }}"#
            )
        })
        .collect();
    graph(&format!(
        r#"{{
            "StartAt": "Root",
            "States": {{
                "Root": {{ "Type": "Parallel", "Next": "After", "Branches": [{}] }},
                "After": {{ "Type": "Task", "End": true }}
            }}
        }}"#,
        branches.join(",")
    ))
}

/// `Root[Wide[W1 | W2 | W3] | Mid | Right] -> After`: an odd group whose
/// left branch is much wider than the others.
pub(crate) fn lopsided() -> WorkflowGraph {
    graph(
        r#"{
            "StartAt": "Root",
            "States": {
                "Root": {
                    "Type": "Parallel",
                    "Next": "After",
                    "Branches": [
                        {
                            "StartAt": "Wide",
                            "States": {
                                "Wide": {
                                    "Type": "Parallel",
                                    "End": true,
                                    "Branches": [
                                        { "StartAt": "W1", "States": { "W1": { "Type": "Task", "End": true } } },
                                        { "StartAt": "W2", "States": { "W2": { "Type": "Task", "End": true } } },
                                        { "StartAt": "W3", "States": { "W3": { "Type": "Task", "End": true } } }
                                    ]
                                }
                            }
                        },
                        { "StartAt": "Mid", "States": { "Mid": { "Type": "Task", "End": true } } },
                        { "StartAt": "Right", "States": { "Right": { "Type": "Task", "End": true } } }
                    ]
                },
                "After": { "Type": "Task", "End": true }
            }
        }"#,
    )
}

/// Parallel states nested `depth` levels deep through their first branch;
/// the second branch of every level is a single Task. Each level adds five
/// JSON nesting levels, so keep `depth` well under serde_json's limit.
pub(crate) fn nested_chain(depth: usize) -> WorkflowGraph {
    fn scope(level: usize, depth: usize) -> String {
        if level == depth {
            return r#"{ "StartAt": "Leaf", "States": { "Leaf": { "Type": "Task", "End": true } } }"#
                .to_string();
        }
        format!(
            r#"{{
                "StartAt": "P{level}",
                "States": {{
                    "P{level}": {{
                        "Type": "Parallel",
                        "End": true,
                        "Branches": [
                            {inner},
                            {{ "StartAt": "S{level}", "States": {{ "S{level}": {{ "Type": "Task", "End": true }} }} }}
                        ]
                    }}
                }}
            }}"#,
            inner = scope(level + 1, depth)
        )
    }
    graph(&scope(0, depth))
}
