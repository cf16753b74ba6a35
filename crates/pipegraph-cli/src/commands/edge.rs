//! Edge commands

use clap::{Args, Subcommand};
use serde_json::{json, Value};

use super::{parse_edge_props, parse_id};
use crate::output::format_rows;
use crate::{AppContext, Cli};
use pipegraph_core::{Direction, EdgeRecord};

#[derive(Args)]
pub struct EdgeArgs {
    #[command(subcommand)]
    pub command: EdgeCommands,
}

#[derive(Subcommand)]
pub enum EdgeCommands {
    /// Add an edge between two existing vertices
    Add {
        /// Tail vertex id
        out: String,
        /// Head vertex id
        r#in: String,
        /// Edge label
        #[arg(short, long)]
        label: Option<String>,
        /// Properties as key=value; values are parsed as JSON when possible
        #[arg(short, long)]
        prop: Vec<String>,
    },
    /// List edges
    List {
        /// Only edges attached to this vertex
        #[arg(long)]
        vertex: Option<String>,
        /// Direction relative to --vertex: out, in, or both
        #[arg(long, default_value = "both")]
        direction: String,
        /// Filter by label
        #[arg(short, long)]
        label: Option<String>,
        /// Limit results
        #[arg(short = 'n', long, default_value = "100")]
        limit: usize,
    },
}

pub async fn run(args: &EdgeArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::debug!("Running edge command for graph: {}", ctx.graph_name);

    match &args.command {
        EdgeCommands::Add {
            out,
            r#in,
            label,
            prop,
        } => {
            let mut graph = ctx.load_graph().await?;

            let record = EdgeRecord {
                out: parse_id(out),
                in_: parse_id(r#in),
                label: label.clone(),
                props: parse_edge_props(prop)?,
            };
            graph.add_edge(record)?;
            ctx.save_graph(&graph).await?;

            let shown = label.as_deref().unwrap_or("(unlabeled)");
            tracing::info!("Created edge: {} -[{}]-> {}", out, shown, r#in);
            println!("Created edge: {} -[{}]-> {}", out, shown, r#in);
        }
        EdgeCommands::List {
            vertex,
            direction,
            label,
            limit,
        } => {
            let graph = ctx.load_graph().await?;
            let graph = &graph;

            let directions = match direction.to_lowercase().as_str() {
                "out" => vec![Direction::Out],
                "in" => vec![Direction::In],
                "both" => vec![Direction::Out, Direction::In],
                other => anyhow::bail!("Unknown direction '{}': use out, in or both", other),
            };

            let edges: Vec<_> = match vertex {
                Some(id) => {
                    let ix = graph.find_vertex_by_id(&parse_id(id)).ok_or_else(|| {
                        anyhow::anyhow!("Vertex '{}' not found in graph '{}'", id, ctx.graph_name)
                    })?;
                    directions
                        .iter()
                        .flat_map(|d| {
                            graph.find_edges(ix, *d).iter().map(move |e| graph.edge(*e))
                        })
                        .collect()
                }
                None => graph.edges().collect(),
            };

            let rows: Vec<Value> = edges
                .into_iter()
                .filter(|e| label.is_none() || e.label() == label.as_deref())
                .take(*limit)
                .map(|e| {
                    json!({
                        "_out": graph.vertex(e.out()).id().to_value(),
                        "_label": e.label(),
                        "_in": graph.vertex(e.in_()).id().to_value(),
                        "properties": e.props(),
                    })
                })
                .collect();

            tracing::info!("Found {} edges", rows.len());

            if rows.is_empty() {
                println!("No edges found in graph '{}'", ctx.graph_name);
            } else {
                let table = format_rows(
                    &rows,
                    &["_out", "_label", "_in", "properties"],
                    cli.output_format(),
                );
                println!("{}", table);
            }
        }
    }

    Ok(())
}
