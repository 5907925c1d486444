//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod cv;

pub use cv::FormatArg;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start generating a CV and follow its progress
    Generate {
        /// Document format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Html)]
        format: FormatArg,

        /// Opportunity to tailor the CV for
        #[arg(short, long)]
        opportunity: Option<String>,

        /// Return as soon as the job is queued
        #[arg(short, long)]
        detach: bool,
    },
    /// Follow the tracked job until it finishes
    Watch,
    /// Show the tracked job without querying the server
    Status,
    /// Forget the tracked job
    Clear,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate {
            format,
            opportunity,
            detach,
        } => cv::generate(config, format, opportunity, detach).await,
        Commands::Watch => cv::watch(config).await,
        Commands::Status => cv::status(config),
        Commands::Clear => cv::clear(config),
    }
}
