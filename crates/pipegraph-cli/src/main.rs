//! Pipegraph CLI - Command line interface for the graph store

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;
mod script;

use commands::{completions, config as config_cmd, edge, graph, io, query, vertex};
use config::Config;
use output::OutputFormat;
use pipegraph_core::Graph;
use pipegraph_storage::{GraphStorage, RedbStorage};

#[derive(Parser)]
#[command(name = "pipegraph")]
#[command(author, version, about = "In-memory graph store with lazy pipeline queries")]
pub struct Cli {
    /// Stored graph to operate on (default: from config)
    #[arg(short, long, global = true)]
    pub graph: Option<String>,

    /// Data directory
    #[arg(short, long, env = "PIPEGRAPH_DATA_DIR", global = true)]
    pub data_dir: Option<String>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the data directory path
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.data_dir.clone())
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage vertices
    Vertex(vertex::VertexArgs),
    /// Manage edges
    Edge(edge::EdgeArgs),
    /// Run a query script, e.g. 'v(1).out("knows").take(2)'
    Query(query::QueryArgs),
    /// Manage stored graphs
    Graph(graph::GraphArgs),
    /// Import a graph from flat JSON
    Import(io::ImportArgs),
    /// Export a graph as flat JSON
    Export(io::ExportArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with storage backend
pub struct AppContext {
    pub storage: Arc<RedbStorage>,
    pub graph_name: String,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        let data_dir = cli.data_dir(config);
        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join("pipegraph.redb");
        tracing::debug!("Using database at: {:?}", db_path);

        let storage = RedbStorage::open(&db_path)?;
        let graph_name = cli
            .graph
            .clone()
            .unwrap_or_else(|| config.default_graph.clone());

        Ok(Self {
            storage: Arc::new(storage),
            graph_name,
        })
    }

    /// The selected graph, or an empty one if nothing is stored yet
    pub async fn load_graph(&self) -> anyhow::Result<Graph> {
        match self.storage.depersist(Some(self.graph_name.as_str())).await? {
            Some(graph) => Ok(graph),
            None => {
                tracing::info!("Graph '{}' not found, starting empty", self.graph_name);
                Ok(Graph::new())
            }
        }
    }

    pub async fn save_graph(&self, graph: &Graph) -> anyhow::Result<()> {
        self.storage.persist(graph, Some(self.graph_name.as_str())).await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting pipegraph CLI");

    // Commands that never touch storage
    match &cli.command {
        Commands::Config(args) => return config_cmd::run(args, cli.output_format()),
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let config = Config::load();
    let ctx = AppContext::new(&cli, &config).await?;

    match &cli.command {
        Commands::Vertex(args) => vertex::run(args, &cli, &ctx).await?,
        Commands::Edge(args) => edge::run(args, &cli, &ctx).await?,
        Commands::Query(args) => query::run(args, &cli, &ctx).await?,
        Commands::Graph(args) => graph::run(args, &cli, &ctx).await?,
        Commands::Import(args) => io::run_import(args, &cli, &ctx).await?,
        Commands::Export(args) => io::run_export(args, &cli, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    Ok(())
}
