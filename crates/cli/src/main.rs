//! Dockwise CLI
//!
//! Analyzes container resource usage locally (demo data or a snapshot file)
//! or queries a running dockwise agent.

mod client;
mod commands;
mod config;
mod output;
mod source;

use advisor_lib::analysis::{Priority, RecommendationKind};
use advisor_lib::history::default_data_dir;
use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{analyze, history, recommendations, templates};
use output::OutputFormat;
use source::Source;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Dockwise resource advisor CLI
#[derive(Parser)]
#[command(name = "dockwise")]
#[command(author, version, about = "Container resource advisor for Dockwise", long_about = None)]
pub struct Cli {
    /// Query a running agent at this URL instead of analyzing locally
    #[arg(long, env = "DOCKWISE_API_URL")]
    pub api_url: Option<String>,

    /// Snapshot JSON file to analyze (demo data when unset)
    #[arg(long, env = "DOCKWISE_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Directory holding analysis history
    #[arg(long, env = "DOCKWISE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format [default: table]
    #[arg(long, short)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the full analysis: container stats, host metrics, health, profile
    Analyze,

    /// List recommendations
    Recommendations {
        /// Filter by priority (low, medium, high)
        #[arg(long, value_parser = recommendations::parse_priority)]
        priority: Option<Priority>,

        /// Filter by type (system, container, image, network, management, templates)
        #[arg(long = "type", value_parser = recommendations::parse_kind)]
        kind: Option<RecommendationKind>,
    },

    /// Show the recommended resource profile
    Resources,

    /// Show the template catalog
    Templates {
        /// Show only templates matched to the current containers
        #[arg(long)]
        matched: bool,
    },

    /// Show recorded history and trend
    History {
        /// Number of most recent samples to show
        #[arg(long, short)]
        limit: Option<usize>,
    },
}

fn init_tracing(verbose: bool) {
    if !verbose {
        return;
    }
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = config::Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring config file");
        config::Config::default()
    });

    let format = cli
        .format
        .or_else(|| file_config.format.as_deref().and_then(OutputFormat::parse))
        .unwrap_or_default();

    let source = match cli.api_url.or(file_config.api_url) {
        Some(url) => Source::remote(&url)?,
        None => Source::local(
            cli.snapshot.or(file_config.snapshot),
            cli.data_dir
                .or(file_config.data_dir)
                .unwrap_or_else(default_data_dir),
        ),
    };
    debug!(source = %source.describe(), ?format, "Resolved data source");

    match cli.command {
        Commands::Analyze => analyze::analyze(&source, format).await?,
        Commands::Recommendations { priority, kind } => {
            recommendations::get_recommendations(&source, priority, kind, cli.verbose, format)
                .await?
        }
        Commands::Resources => analyze::resources(&source, format).await?,
        Commands::Templates { matched } => {
            templates::get_templates(&source, matched, format).await?
        }
        Commands::History { limit } => history::show_history(&source, limit, format).await?,
    }

    Ok(())
}
