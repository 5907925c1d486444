//! Dossier CLI
//!
//! Command-line interface for generating a CV and following the job.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dossier")]
#[command(about = "Generate a tailored CV and follow the generation job", long_about = None)]
struct Cli {
    /// CV API URL
    #[arg(
        long,
        global = true,
        env = "DOSSIER_API_URL",
        default_value = "http://localhost:8000"
    )]
    api_url: String,

    /// Directory holding the tracked job snapshot
    #[arg(long, global = true, env = "DOSSIER_STATE_DIR", default_value = ".dossier")]
    state_dir: PathBuf,

    /// Delay between two status queries, in milliseconds
    #[arg(
        long,
        global = true,
        env = "DOSSIER_POLL_INTERVAL_MS",
        default_value_t = 1500
    )]
    poll_interval_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dossier_cli=warn,dossier_tracker=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        state_dir: cli.state_dir,
        poll_interval_ms: cli.poll_interval_ms,
    };

    handle_command(cli.command, &config).await
}
