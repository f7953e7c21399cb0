mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mnemograph::config::MnemographConfig;
use mnemograph::scope::Scope;

#[derive(Parser)]
#[command(name = "mnemograph", version, about = "Knowledge graph and semantic linking for memory stores")]
struct Cli {
    /// Scope name (under <root>/scopes/) or scope directory
    #[arg(long, global = true)]
    scope: Option<String>,

    /// Config file (defaults to ~/.mnemograph/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server
    Serve {
        /// "stdio" or "http" (overrides config)
        #[arg(long)]
        transport: Option<String>,
    },
    /// Create a directed edge between two memories
    Link {
        source: String,
        target: String,
        #[arg(long, default_value = "relates-to")]
        label: String,
        /// Also create the reverse edge with the reciprocal label
        #[arg(long)]
        reciprocal: bool,
    },
    /// Remove edges between two memories
    Unlink {
        source: String,
        target: String,
        /// Only remove the edge with this label
        #[arg(long)]
        label: Option<String>,
    },
    /// Remove a memory's node and all its edges
    Detach {
        id: String,
        /// Also drop its cached embedding
        #[arg(long)]
        forget: bool,
    },
    /// List a memory's inbound and outbound edges
    Edges { id: String },
    /// List nodes without any edge
    Orphans,
    /// Shortest path between two memories
    Path { from: String, to: String },
    /// Connected components, edges taken as undirected
    Components,
    /// What depends on a memory
    Impact { id: String },
    /// Render a Mermaid flowchart
    Diagram {
        /// Only the neighbourhood of this memory
        #[arg(long)]
        focus: Option<String>,
        #[arg(long, default_value_t = 1)]
        depth: usize,
        /// Whole graph, even when hubs exist
        #[arg(long)]
        full: bool,
        /// Comma-separated memory types to keep
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,
        /// TD, LR, BT or RL
        #[arg(long)]
        direction: Option<String>,
        /// Write a ```mermaid block to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Embed memories whose cached vectors are missing or stale
    Embed {
        /// Re-embed everything
        #[arg(long)]
        force: bool,
        /// Drop cache entries of deleted memories
        #[arg(long)]
        prune: bool,
    },
    /// Link a memory to its most similar memories
    Autolink {
        id: String,
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Propose links between similar, unconnected memories
    Suggest {
        #[arg(long)]
        threshold: Option<f64>,
        /// Most proposals per memory
        #[arg(long)]
        limit: Option<usize>,
        /// Create the proposed edges
        #[arg(long)]
        create: bool,
    },
    /// Graph statistics
    Stats,
    /// Check graph, cache and memory store health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MnemographConfig::load_from(path)?,
        None => MnemographConfig::load()?,
    };

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for MCP JSON-RPC and diagram output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Command::Serve { transport } = &cli.command {
        let transport = transport.clone().unwrap_or_else(|| config.server.transport.clone());
        return match transport.as_str() {
            "stdio" => server::serve_stdio(config).await,
            "http" => server::serve_http(config).await,
            other => anyhow::bail!("unknown transport: {other}. Supported: stdio, http"),
        };
    }

    // Everything else is synchronous file and SQLite work, plus a blocking
    // HTTP client for embeddings; keep it off the async runtime.
    tokio::task::spawn_blocking(move || run(cli, config)).await?
}

fn run(cli: Cli, config: MnemographConfig) -> Result<()> {
    let scope = Scope::open(config.scope_dir(cli.scope.as_deref()));
    let json = cli.json;
    tracing::debug!(scope = %scope.dir().display(), "scope resolved");

    match cli.command {
        Command::Serve { .. } => anyhow::bail!("serve runs on the async entry point"),
        Command::Link { source, target, label, reciprocal } => {
            cli::graph::link(&scope, &source, &target, &label, reciprocal, json)
        }
        Command::Unlink { source, target, label } => {
            cli::graph::unlink(&scope, &source, &target, label.as_deref(), json)
        }
        Command::Detach { id, forget } => cli::graph::detach(&config, &scope, &id, forget, json),
        Command::Edges { id } => cli::graph::edges(&scope, &id, json),
        Command::Orphans => cli::graph::orphans(&scope, json),
        Command::Path { from, to } => cli::graph::path(&scope, &from, &to, json),
        Command::Components => cli::graph::components(&scope, json),
        Command::Impact { id } => cli::graph::impact(&scope, &id, json),
        Command::Diagram { focus, depth, full, types, direction, output } => cli::diagram::diagram(
            &config,
            &scope,
            cli::diagram::DiagramArgs {
                focus: focus.as_deref(),
                depth,
                full,
                types: &types,
                direction: direction.as_deref(),
                output: output.as_deref(),
            },
        ),
        Command::Embed { force, prune } => cli::embed::embed(&config, &scope, force, prune, json),
        Command::Autolink { id, threshold } => cli::linking::autolink(&config, &scope, &id, threshold, json),
        Command::Suggest { threshold, limit, create } => {
            cli::linking::suggest(&config, &scope, threshold, limit, create, json)
        }
        Command::Stats => cli::stats::stats(&scope, json),
        Command::Doctor => cli::doctor::doctor(&config, &scope, json),
    }
}
