use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod context;
mod plan;
mod route;
mod schedule;
mod score;
mod synthesize;
mod track;

#[derive(Debug, Parser)]
#[command(name = "growloop")]
#[command(about = "Audience growth pipeline command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score discovery candidates into a deduplicated outreach batch
    Score {
        /// Candidates JSON file
        #[arg(long)]
        input: PathBuf,
    },
    /// Classify feedback items and synthesize product insights
    Synthesize {
        /// Feedback items JSON file
        #[arg(long)]
        input: PathBuf,
    },
    /// Aggregate weekly post metrics and generate performance insights
    Track {
        /// Weekly metrics JSON file
        #[arg(long)]
        input: PathBuf,
    },
    /// Route the latest insights into downstream agent context files
    Feedback,
    /// Generate next week's content slot schedule
    Schedule {
        /// Trends JSON file to assign across original slots
        #[arg(long)]
        trends: Option<PathBuf>,
    },
    /// Create the weekly campaign plan
    Plan,
    /// Review the week and fold results into campaign state
    Review,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = growloop_core::load_app_config()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let ctx = context::AppContext::new(config)?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Score { input } => score::run_score(&ctx, &input),
        Commands::Synthesize { input } => synthesize::run_synthesize(&ctx, &input).await,
        Commands::Track { input } => track::run_track(&ctx, &input).await,
        Commands::Feedback => route::run_feedback(&ctx),
        Commands::Schedule { trends } => schedule::run_schedule(&ctx, trends.as_deref()),
        Commands::Plan => plan::run_plan(&ctx).await,
        Commands::Review => plan::run_review(&ctx).await,
    }
}
