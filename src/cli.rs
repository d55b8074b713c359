use crate::config::load_config;
use crate::ir::Orientation;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_workflow;
use crate::workflow::{MoveOutcome, WorkflowGraph};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "sfl",
    version,
    about = "Lay out and rearrange state-machine workflows"
)]
pub struct Args {
    /// Workflow definition (JSON or JSON5), or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file with a `layout` section
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Overrides the configured orientation (vertical, horizontal, TD, LR)
    #[arg(long = "orientation", value_parser = parse_orientation)]
    pub orientation: Option<Orientation>,

    /// Moves ACTIVE right after AFTER before emitting; may be repeated
    #[arg(short = 'm', long = "move", value_name = "ACTIVE:AFTER", value_parser = parse_move)]
    pub moves: Vec<MoveArg>,

    /// What to write
    #[arg(short = 'e', long = "emit", value_enum, default_value = "layout")]
    pub emit: Emit,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// Positioned states, connectors and drop slots
    Layout,
    /// The (possibly rearranged) workflow definition
    Definition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveArg {
    pub active: String,
    pub after: String,
}

fn parse_move(value: &str) -> Result<MoveArg, String> {
    let (active, after) = value
        .split_once(':')
        .ok_or_else(|| format!("expected ACTIVE:AFTER, got `{value}`"))?;
    let (active, after) = (active.trim(), after.trim());
    if active.is_empty() || after.is_empty() {
        return Err(format!("expected ACTIVE:AFTER, got `{value}`"));
    }
    Ok(MoveArg {
        active: active.to_string(),
        after: after.to_string(),
    })
}

fn parse_orientation(value: &str) -> Result<Orientation, String> {
    Orientation::from_token(value).ok_or_else(|| format!("unknown orientation `{value}`"))
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(orientation) = args.orientation {
        config.layout.orientation = orientation;
    }

    let input = read_input(args.input.as_deref())?;
    let mut graph = parse_workflow(&input)?.graph;
    apply_moves(&mut graph, &args.moves)?;

    match args.emit {
        Emit::Layout => {
            let layout = compute_layout(&graph, &config.layout)?;
            info!(
                states = layout.states.len(),
                width = layout.width,
                height = layout.height,
                "layout computed"
            );
            write_layout_dump(args.output.as_deref(), &layout)?;
        }
        Emit::Definition => write_definition(args.output.as_deref(), &graph)?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init();
}

fn apply_moves(graph: &mut WorkflowGraph, moves: &[MoveArg]) -> Result<()> {
    for mv in moves {
        match graph
            .move_state(&mv.active, &mv.after)
            .with_context(|| format!("moving `{}` after `{}`", mv.active, mv.after))?
        {
            MoveOutcome::Moved => info!(active = %mv.active, after = %mv.after, "state moved"),
            MoveOutcome::Ignored(reason) => {
                warn!(active = %mv.active, after = %mv.after, ?reason, "move ignored")
            }
        }
    }
    Ok(())
}

fn write_definition(path: Option<&Path>, graph: &WorkflowGraph) -> Result<()> {
    let definition = graph.serialize();
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &definition)?;
        }
        None => {
            let mut writer = BufWriter::new(io::stdout().lock());
            serde_json::to_writer_pretty(&mut writer, &definition)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
