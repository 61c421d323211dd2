//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod workspace;

pub use workspace::WorkspaceCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Workspace management
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommands,
    },
}

/// Route a command to its handler module
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Workspace { command } => {
            workspace::handle_workspace_command(command, config).await
        }
    }
}
