use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("state not found: {0}")]
    NotFound(String),

    #[error("malformed workflow graph: {0}")]
    MalformedGraph(String),
}
