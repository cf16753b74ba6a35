//! Import/Export commands

use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use clap::Args;

use crate::{AppContext, Cli};
use pipegraph_core::{FlatGraph, Graph};

#[derive(Args)]
pub struct ImportArgs {
    /// Input file in flat form: {"V": [...], "E": [...]}
    pub file: PathBuf,

    /// Merge with existing data (default: error if the graph is not empty)
    #[arg(long)]
    pub merge: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

pub async fn run_import(args: &ImportArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Importing from {:?}", args.file);

    let content = std::fs::read_to_string(&args.file)?;
    let flat: FlatGraph = serde_json::from_str(&content)?;

    let mut graph = ctx.load_graph().await?;
    if graph.vertex_count() > 0 && !args.merge {
        anyhow::bail!(
            "Graph '{}' already has {} vertices. Use --merge to add to existing data.",
            ctx.graph_name,
            graph.vertex_count()
        );
    }

    let offered = (flat.vertices.len(), flat.edges.len());
    let vertices = graph.add_vertices(flat.vertices);
    let edges = graph.add_edges(flat.edges);
    ctx.save_graph(&graph).await?;

    if vertices < offered.0 || edges < offered.1 {
        tracing::warn!(
            "Skipped {} vertices and {} edges",
            offered.0 - vertices,
            offered.1 - edges
        );
    }

    println!(
        "Imported {} vertices and {} edges from {:?} into graph '{}'",
        vertices, edges, args.file, ctx.graph_name
    );

    Ok(())
}

pub async fn run_export(args: &ExportArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Exporting graph '{}'", ctx.graph_name);

    let graph: Graph = ctx.load_graph().await?;
    let flat = graph.to_flat();

    tracing::debug!(
        "Exporting {} vertices and {} edges",
        flat.vertices.len(),
        flat.edges.len()
    );

    let content = if args.compact {
        serde_json::to_string(&flat)?
    } else {
        serde_json::to_string_pretty(&flat)?
    };

    if let Some(ref path) = args.output {
        // Write with secure permissions (0o600 = owner read/write only)
        #[cfg(unix)]
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            file.write_all(content.as_bytes())?;
        }
        #[cfg(not(unix))]
        {
            std::fs::write(path, &content)?;
        }
        println!("Exported to {:?}", path);
    } else {
        println!("{}", content);
    }

    Ok(())
}
