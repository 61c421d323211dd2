//! Workspace Service
//!
//! Resolves create requests against the catalog and serves workspace reads.

use devspace_core::dto::workspace::{CreateWorkspace, WorkspaceSummary};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::store::{AgentConfigs, Catalog, StoreError, WorkspaceQueries};
use crate::service::create::CreateParams;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Project {0} not found")]
    ProjectNotFound(i64),

    #[error("Cluster agent {0} not found")]
    AgentNotFound(i64),

    #[error("Workspace {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Loads the user, project and agent a create request refers to
pub async fn resolve_create_params(
    catalog: &dyn Catalog,
    user_id: i64,
    req: CreateWorkspace,
) -> Result<CreateParams, WorkspaceError> {
    let user = catalog
        .find_user(user_id)
        .await?
        .ok_or(WorkspaceError::UserNotFound(user_id))?;
    let project = catalog
        .find_project(req.project_id)
        .await?
        .ok_or(WorkspaceError::ProjectNotFound(req.project_id))?;
    let agent = catalog
        .find_agent(req.cluster_agent_id)
        .await?
        .ok_or(WorkspaceError::AgentNotFound(req.cluster_agent_id))?;

    Ok(CreateParams {
        user,
        project,
        agent,
        desired_state: req.desired_state,
        project_ref: req.project_ref,
        devfile_path: req.devfile_path,
        variables: req.variables,
    })
}

async fn dns_zone(configs: &dyn AgentConfigs, cluster_agent_id: i64) -> Result<String, StoreError> {
    Ok(configs
        .find_by_agent(cluster_agent_id)
        .await?
        .map(|config| config.dns_zone)
        .unwrap_or_default())
}

/// Get a workspace by ID
pub async fn get_workspace(
    queries: &dyn WorkspaceQueries,
    configs: &dyn AgentConfigs,
    id: Uuid,
) -> Result<WorkspaceSummary, WorkspaceError> {
    let workspace = queries
        .find_workspace(id)
        .await?
        .ok_or(WorkspaceError::NotFound(id))?;
    let zone = dns_zone(configs, workspace.cluster_agent_id).await?;

    Ok(WorkspaceSummary::from_workspace(&workspace, &zone))
}

/// List a user's workspaces, newest first
pub async fn list_workspaces(
    queries: &dyn WorkspaceQueries,
    configs: &dyn AgentConfigs,
    user_id: i64,
) -> Result<Vec<WorkspaceSummary>, WorkspaceError> {
    let workspaces = queries.list_workspaces_for_user(user_id).await?;

    let mut zones: HashMap<i64, String> = HashMap::new();
    let mut summaries = Vec::with_capacity(workspaces.len());
    for workspace in &workspaces {
        if !zones.contains_key(&workspace.cluster_agent_id) {
            let zone = dns_zone(configs, workspace.cluster_agent_id).await?;
            zones.insert(workspace.cluster_agent_id, zone);
        }
        let zone = zones
            .get(&workspace.cluster_agent_id)
            .map(String::as_str)
            .unwrap_or_default();
        summaries.push(WorkspaceSummary::from_workspace(workspace, zone));
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::service::create::test_support;
    use devspace_core::domain::workspace::DesiredState;

    fn request() -> CreateWorkspace {
        CreateWorkspace {
            project_id: 3,
            cluster_agent_id: 1,
            project_ref: "main".to_string(),
            devfile_path: Some(".devfile.yaml".to_string()),
            desired_state: DesiredState::Running,
            variables: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_resolve_create_params() {
        let store = test_support::seeded_store();

        let params = resolve_create_params(&store, 2, request()).await.unwrap();

        assert_eq!(params.user.username, "alice");
        assert_eq!(params.project.full_path, "group/demo");
        assert_eq!(params.agent.id, 1);
        assert_eq!(params.devfile_path.as_deref(), Some(".devfile.yaml"));
    }

    #[tokio::test]
    async fn test_resolve_unknown_entities() {
        let store = test_support::seeded_store();

        let err = resolve_create_params(&store, 99, request()).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::UserNotFound(99)));

        let mut req = request();
        req.cluster_agent_id = 5;
        let err = resolve_create_params(&store, 2, req).await.unwrap_err();
        assert_eq!(err.to_string(), "Cluster agent 5 not found");
    }

    #[tokio::test]
    async fn test_get_missing_workspace() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        let err = get_workspace(&store, &store, id).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound(missing) if missing == id));
    }
}
