#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod workflow;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use ir::{Orientation, StateKind, WorkflowDefinition};
pub use layout::{Layout, LayoutEngine, compute_layout};
pub use parser::parse_workflow;
pub use workflow::{MoveOutcome, NoOpReason, State, WorkflowError, WorkflowGraph};
