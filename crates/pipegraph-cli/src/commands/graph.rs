//! Stored graph commands

use std::collections::BTreeMap;

use clap::{Args, Subcommand};

use crate::{AppContext, Cli};
use pipegraph_storage::GraphStorage;

#[derive(Args)]
pub struct GraphArgs {
    #[command(subcommand)]
    pub command: GraphCommands,
}

#[derive(Subcommand)]
pub enum GraphCommands {
    /// List stored graphs
    List,
    /// Delete a stored graph
    Delete {
        /// Graph name
        name: String,
        /// Force deletion without confirmation
        #[arg(long)]
        force: bool,
    },
    /// Show graph statistics
    Stats,
    /// List the pipetypes queries can use
    Pipetypes,
}

pub async fn run(args: &GraphArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::debug!("Running graph command");

    match &args.command {
        GraphCommands::List => {
            let names = ctx.storage.list_names().await?;
            tracing::info!("Found {} graphs", names.len());

            if names.is_empty() {
                println!("No graphs found. Add a vertex with 'pipegraph vertex add' or import one");
            } else {
                println!("Graphs ({} found):", names.len());
                for name in &names {
                    let current = if *name == ctx.graph_name { " (current)" } else { "" };
                    println!("  {}{}", name, current);
                }
            }
        }
        GraphCommands::Delete { name, force } => {
            let graph = match ctx.storage.depersist(Some(name.as_str())).await? {
                Some(g) => g,
                None => {
                    println!("Graph '{}' not found", name);
                    return Ok(());
                }
            };

            if !force {
                println!(
                    "Graph '{}' has {} vertices and {} edges",
                    name,
                    graph.vertex_count(),
                    graph.edge_count()
                );
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            ctx.storage.remove(Some(name.as_str())).await?;
            tracing::info!("Deleted graph: {}", name);
            println!(
                "Deleted graph: {} ({} vertices, {} edges)",
                name,
                graph.vertex_count(),
                graph.edge_count()
            );
        }
        GraphCommands::Stats => {
            let graph = ctx.load_graph().await?;

            let mut label_counts: BTreeMap<&str, usize> = BTreeMap::new();
            for edge in graph.edges() {
                *label_counts.entry(edge.label().unwrap_or("(unlabeled)")).or_insert(0) += 1;
            }

            tracing::info!("Stats for graph: {}", ctx.graph_name);

            println!("Stats for graph '{}':", ctx.graph_name);
            println!("  Vertices: {}", graph.vertex_count());
            println!("  Edges: {}", graph.edge_count());
            for (label, count) in &label_counts {
                println!("    {}: {}", label, count);
            }
        }
        GraphCommands::Pipetypes => {
            let graph = ctx.load_graph().await?;
            for name in graph.registry().names() {
                println!("{}", name);
            }
        }
    }

    Ok(())
}
