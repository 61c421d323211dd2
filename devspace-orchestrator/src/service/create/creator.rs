//! Transactional persistence of a prepared workspace
//!
//! Token, workspace, variables and (when enabled) the desired config
//! snapshot are written through one creation scope. The first failing step
//! rolls the scope back, so either all records exist afterwards or none do.

use devspace_core::domain::agent_state::AgentState;
use devspace_core::domain::token::PersonalAccessToken;
use devspace_core::domain::variable::WorkspaceVariable;
use devspace_core::domain::workspace::Workspace;
use tracing::{info, warn};

use super::CreateSettings;
use super::context::{Created, Prepared};
use super::error::CreateError;
use super::{
    desired_config_creator, personal_access_token_creator, variables_creator, workspace_creator,
};
use crate::repository::store::{CreationScope, FieldErrors, RecordError, WorkspaceStore};

/// Maps a record failure onto the step's error, keeping store failures apart
pub(super) fn record_failure(
    err: RecordError,
    step_error: fn(FieldErrors) -> CreateError,
) -> CreateError {
    match err {
        RecordError::Invalid(errors) => step_error(errors),
        RecordError::Store(err) => CreateError::Store(err),
    }
}

struct Records {
    personal_access_token: PersonalAccessToken,
    workspace: Workspace,
    variables: Vec<WorkspaceVariable>,
    agent_state: Option<AgentState>,
}

pub async fn create(
    store: &dyn WorkspaceStore,
    settings: &CreateSettings,
    snapshot_enabled: bool,
    prepared: Prepared,
) -> Result<Created, CreateError> {
    let mut scope = store.begin().await?;

    let records = match create_in_scope(scope.as_mut(), settings, snapshot_enabled, &prepared).await
    {
        Ok(records) => records,
        Err(err) => {
            if let Err(rollback_err) = scope.rollback().await {
                warn!(
                    workspace = %prepared.workspace_name,
                    "Failed to roll back workspace creation: {}",
                    rollback_err
                );
            }
            return Err(err);
        }
    };

    scope.commit().await?;

    info!(
        workspace_id = %records.workspace.id,
        workspace = %records.workspace.name,
        variables = records.variables.len(),
        "Workspace records created"
    );

    Ok(Created {
        params: prepared.params,
        agent_config: prepared.agent_config,
        personal_access_token: records.personal_access_token,
        workspace: records.workspace,
        variables: records.variables,
        agent_state: records.agent_state,
    })
}

async fn create_in_scope(
    scope: &mut dyn CreationScope,
    settings: &CreateSettings,
    snapshot_enabled: bool,
    prepared: &Prepared,
) -> Result<Records, CreateError> {
    let token = personal_access_token_creator::create(scope, prepared).await?;
    let workspace = workspace_creator::create(scope, prepared, &token.record).await?;
    let variables =
        variables_creator::create(scope, prepared, workspace.id, &token.secret, settings).await?;

    let agent_state = if snapshot_enabled {
        Some(desired_config_creator::create(scope, prepared, &workspace).await?)
    } else {
        None
    };

    Ok(Records {
        personal_access_token: token.record,
        workspace,
        variables,
        agent_state,
    })
}
