//! Vertex commands

use clap::{Args, Subcommand};
use serde_json::{json, Value};

use super::{parse_id, parse_vertex_props};
use crate::output::format_rows;
use crate::{AppContext, Cli};
use pipegraph_core::VertexRecord;

#[derive(Args)]
pub struct VertexArgs {
    #[command(subcommand)]
    pub command: VertexCommands,
}

#[derive(Subcommand)]
pub enum VertexCommands {
    /// Add a new vertex
    Add {
        /// Vertex id (assigned automatically if omitted)
        #[arg(long)]
        id: Option<String>,
        /// Properties as key=value; values are parsed as JSON when possible
        #[arg(short, long)]
        prop: Vec<String>,
    },
    /// List vertices
    List {
        /// Limit results
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },
    /// Get vertex details
    Get {
        /// Vertex id
        id: String,
    },
}

pub async fn run(args: &VertexArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::debug!("Running vertex command for graph: {}", ctx.graph_name);

    match &args.command {
        VertexCommands::Add { id, prop } => {
            let mut graph = ctx.load_graph().await?;

            let record = VertexRecord {
                id: id.as_deref().map(parse_id),
                props: parse_vertex_props(prop)?,
            };

            let id = graph.add_vertex(record)?;
            ctx.save_graph(&graph).await?;

            tracing::info!("Created vertex: {}", id);
            println!("Created vertex: {}", id);
        }
        VertexCommands::List { limit } => {
            let graph = ctx.load_graph().await?;
            let rows: Vec<Value> = graph
                .vertices()
                .take(*limit)
                .map(|v| json!({"_id": v.id().to_value(), "properties": v.props()}))
                .collect();

            tracing::info!("Found {} vertices", rows.len());

            if rows.is_empty() {
                println!("No vertices found in graph '{}'", ctx.graph_name);
            } else {
                let table = format_rows(&rows, &["_id", "properties"], cli.output_format());
                println!("{}", table);
            }
        }
        VertexCommands::Get { id } => {
            let graph = ctx.load_graph().await?;
            match graph.find_vertex_by_id(&parse_id(id)) {
                Some(ix) => {
                    let vertex = graph.vertex(ix);
                    println!("Vertex: {}", vertex.id());
                    for (key, value) in vertex.props() {
                        println!("  {}: {}", key, value);
                    }
                    println!("  Out edges: {}", graph.find_out_edges(ix).len());
                    println!("  In edges: {}", graph.find_in_edges(ix).len());
                }
                None => {
                    println!("Vertex '{}' not found in graph '{}'", id, ctx.graph_name);
                }
            }
        }
    }

    Ok(())
}
