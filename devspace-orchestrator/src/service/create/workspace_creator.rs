use devspace_core::domain::token::PersonalAccessToken;
use devspace_core::domain::workspace::{ActualState, Workspace};

use super::constants::WORKSPACE_EDITOR_PORT;
use super::context::Prepared;
use super::creator::record_failure;
use super::error::CreateError;
use crate::repository::records::NewWorkspace;
use crate::repository::store::{CreationScope, FieldErrors};

pub fn url_prefix(workspace_name: &str) -> String {
    format!("{}-{}", WORKSPACE_EDITOR_PORT, workspace_name)
}

/// Opens the editor in the cloned project directory
pub fn url_query_string(prepared: &Prepared) -> String {
    let folder = format!(
        "{}/{}",
        prepared.volume.data_volume_mount_path, prepared.params.project.path
    );
    format!("folder={}", urlencoding::encode(&folder))
}

pub async fn create(
    scope: &mut dyn CreationScope,
    prepared: &Prepared,
    token: &PersonalAccessToken,
) -> Result<Workspace, CreateError> {
    let processed_devfile = prepared.processed_devfile.to_yaml().map_err(|e| {
        CreateError::WorkspaceCreateFailed {
            errors: FieldErrors::single(
                "processed_devfile",
                format!("could not be serialized: {}", e),
            ),
        }
    })?;

    let params = &prepared.params;
    let workspace = NewWorkspace {
        name: prepared.workspace_name.clone(),
        namespace: prepared.workspace_namespace.clone(),
        desired_state: params.desired_state,
        actual_state: ActualState::CreationRequested,
        project_ref: params.project_ref.clone(),
        devfile_path: params.devfile_path.clone(),
        devfile: prepared.devfile_yaml.clone(),
        processed_devfile,
        url_prefix: url_prefix(&prepared.workspace_name),
        url_query_string: url_query_string(prepared),
        user_id: params.user.id,
        project_id: params.project.id,
        cluster_agent_id: params.agent.id,
        personal_access_token_id: token.id,
    };

    scope
        .create_workspace(workspace)
        .await
        .map_err(|e| record_failure(e, |errors| CreateError::WorkspaceCreateFailed { errors }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::create::test_support;

    #[test]
    fn test_url_parts() {
        let prepared = test_support::prepared(false);

        assert_eq!(url_prefix("workspace-1-2-abc123"), "60001-workspace-1-2-abc123");
        assert_eq!(url_query_string(&prepared), "folder=%2Fprojects%2Fdemo");
    }
}
