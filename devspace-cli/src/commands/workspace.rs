//! Workspace command handlers
//!
//! Handles requesting, viewing and listing workspaces.

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::*;
use devspace_client::OrchestratorClient;
use devspace_core::domain::variable::VariableType;
use devspace_core::domain::workspace::DesiredState;
use devspace_core::dto::workspace::{
    CreateWorkspace, CreateWorkspaceResponse, ErrorReason, VariableInput, WorkspaceSummary,
};
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InitialState {
    Running,
    Stopped,
}

impl From<InitialState> for DesiredState {
    fn from(state: InitialState) -> Self {
        match state {
            InitialState::Running => DesiredState::Running,
            InitialState::Stopped => DesiredState::Stopped,
        }
    }
}

/// Workspace subcommands
#[derive(Subcommand)]
pub enum WorkspaceCommands {
    /// Request a new workspace for a project
    Create {
        #[arg(short, long)]
        project: i64,

        /// Cluster agent that will host the workspace
        #[arg(short, long)]
        agent: i64,

        /// Git ref the project is cloned at
        #[arg(short = 'r', long = "ref", default_value = "main")]
        project_ref: String,

        /// Repository path of the devfile; the default devfile is used when omitted
        #[arg(short, long)]
        devfile: Option<String>,

        #[arg(long, value_enum, default_value = "running")]
        state: InitialState,

        /// Environment variables as KEY=value pairs
        #[arg(short, long, value_parser = parse_key_val)]
        env: Vec<(String, String)>,

        /// File variables as KEY=value pairs
        #[arg(long, value_parser = parse_key_val)]
        file: Vec<(String, String)>,
    },
    /// Get workspace details
    Get { id: Uuid },
    /// List the user's workspaces
    List,
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((key.to_string(), value.to_string()))
}

fn variables(env: Vec<(String, String)>, file: Vec<(String, String)>) -> Vec<VariableInput> {
    let env = env.into_iter().map(|v| (v, VariableType::Environment));
    let file = file.into_iter().map(|v| (v, VariableType::File));
    env.chain(file)
        .map(|((key, value), variable_type)| VariableInput {
            key,
            value,
            variable_type,
        })
        .collect()
}

pub async fn handle_workspace_command(command: WorkspaceCommands, config: &Config) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);

    match command {
        WorkspaceCommands::Create {
            project,
            agent,
            project_ref,
            devfile,
            state,
            env,
            file,
        } => {
            let req = CreateWorkspace {
                project_id: project,
                cluster_agent_id: agent,
                project_ref,
                devfile_path: devfile,
                desired_state: state.into(),
                variables: variables(env, file),
            };
            create_workspace(&client, config.require_user()?, req).await
        }
        WorkspaceCommands::Get { id } => get_workspace(&client, id).await,
        WorkspaceCommands::List => list_workspaces(&client, config.require_user()?).await,
    }
}

async fn create_workspace(
    client: &OrchestratorClient,
    user_id: i64,
    req: CreateWorkspace,
) -> Result<()> {
    let response = client
        .create_workspace(user_id, &req)
        .await
        .context("Failed to request workspace")?;

    match response {
        CreateWorkspaceResponse::Success { payload } => {
            println!("{}", "✓ Workspace created successfully!".green().bold());
            print_workspace_details(&payload.workspace);
            Ok(())
        }
        CreateWorkspaceResponse::Error {
            reason,
            details,
            context,
        } => {
            let label = match reason {
                ErrorReason::BadRequest => "rejected",
                ErrorReason::InternalError => "failed",
            };
            println!("{} {}", format!("✗ Workspace {}:", label).red().bold(), details);
            if let Some(errors) = context.get("errors") {
                println!("  Errors: {}", errors.to_string().dimmed());
            }
            anyhow::bail!("workspace creation {}", label)
        }
    }
}

async fn get_workspace(client: &OrchestratorClient, id: Uuid) -> Result<()> {
    let workspace = client.get_workspace(id).await?;
    print_workspace_details(&workspace);
    Ok(())
}

async fn list_workspaces(client: &OrchestratorClient, user_id: i64) -> Result<()> {
    let workspaces = client.list_workspaces(user_id).await?;

    if workspaces.is_empty() {
        println!("{}", "No workspaces found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} workspace(s):", workspaces.len()).bold());
    println!();
    for workspace in workspaces {
        println!(
            "  {} {} {}",
            workspace.id.to_string().cyan(),
            workspace.name.bold(),
            format!("[{:?}]", workspace.actual_state).dimmed()
        );
    }
    Ok(())
}

fn print_workspace_details(workspace: &WorkspaceSummary) {
    println!("  ID:        {}", workspace.id.to_string().cyan());
    println!("  Name:      {}", workspace.name.bold());
    println!("  Namespace: {}", workspace.namespace);
    println!("  Project:   {} @ {}", workspace.project_id, workspace.project_ref);
    println!(
        "  State:     {:?} (desired {:?})",
        workspace.actual_state, workspace.desired_state
    );
    println!("  URL:       {}", workspace.url.underline());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("TOKEN=a=b").unwrap(),
            ("TOKEN".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("TOKEN").is_err());
    }

    #[test]
    fn test_variables_keep_order_and_type() {
        let vars = variables(
            vec![("A".to_string(), "1".to_string())],
            vec![("B".to_string(), "2".to_string())],
        );

        assert_eq!(vars[0].key, "A");
        assert_eq!(vars[0].variable_type, VariableType::Environment);
        assert_eq!(vars[1].variable_type, VariableType::File);
    }
}
