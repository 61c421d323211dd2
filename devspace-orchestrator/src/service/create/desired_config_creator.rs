use devspace_core::domain::agent_state::AgentState;
use devspace_core::domain::workspace::Workspace;
use serde_json::Value;

use super::context::Prepared;
use super::creator::record_failure;
use super::desired_config;
use super::error::CreateError;
use crate::repository::records::NewAgentState;
use crate::repository::store::CreationScope;

/// Stores the desired config snapshot for the reconciliation loop
pub async fn create(
    scope: &mut dyn CreationScope,
    prepared: &Prepared,
    workspace: &Workspace,
) -> Result<AgentState, CreateError> {
    let resources =
        desired_config::generate(workspace, &prepared.processed_devfile, &prepared.agent_config);
    tracing::debug!(
        workspace = %workspace.name,
        resources = resources.len(),
        "Generated desired config"
    );

    let state = NewAgentState {
        workspace_id: workspace.id,
        project_id: prepared.params.project.id,
        desired_config: Value::Array(resources),
    };

    scope
        .create_agent_state(state)
        .await
        .map_err(|e| record_failure(e, |errors| CreateError::SnapshotCreateFailed { errors }))
}
