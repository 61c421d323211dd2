//! Devspace CLI
//!
//! Command-line interface for requesting and inspecting workspaces.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "devspace")]
#[command(about = "Remote development workspaces CLI", long_about = None)]
struct Cli {
    /// Orchestrator URL
    #[arg(
        long,
        env = "DEVSPACE_ORCHESTRATOR_URL",
        default_value = "http://localhost:8080"
    )]
    orchestrator_url: String,

    /// Id of the user requests are made for
    #[arg(long, env = "DEVSPACE_USER")]
    user: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        orchestrator_url: cli.orchestrator_url,
        user_id: cli.user,
    };

    handle_command(cli.command, &config).await
}
