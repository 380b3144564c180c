//! xtask - Development task runner for chunkset
//!
//! Usage:
//!   cargo xtask smoke [--min N --max N]
//!   cargo xtask throughput [--scenario <yaml>] [options]

mod smoke;
mod throughput;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development task runner for chunkset")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the correctness smoke script against every structure
    Smoke(smoke::SmokeArgs),
    /// Measure insert, search and erase throughput at doubling sizes
    Throughput(throughput::ThroughputArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Smoke(args) => smoke::run(&args),
        Commands::Throughput(args) => throughput::run(&args),
    }
}
