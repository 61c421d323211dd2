//! Workspace Repository
//!
//! Handles all database operations related to workspaces.

use chrono::{DateTime, Utc};
use devspace_core::domain::workspace::Workspace;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::records::NewWorkspace;

const WORKSPACE_COLUMNS: &str = r#"
    id, name, namespace, desired_state, desired_state_updated_at, actual_state,
    project_ref, devfile_path, devfile, processed_devfile, url_prefix, url_query_string,
    user_id, project_id, cluster_agent_id, personal_access_token_id, created_at
"#;

/// Insert a workspace inside the caller's transaction
pub async fn create(conn: &mut PgConnection, new: NewWorkspace) -> Result<Workspace, sqlx::Error> {
    let now = Utc::now();
    let workspace = Workspace {
        id: Uuid::new_v4(),
        name: new.name,
        namespace: new.namespace,
        desired_state: new.desired_state,
        desired_state_updated_at: now,
        actual_state: new.actual_state,
        project_ref: new.project_ref,
        devfile_path: new.devfile_path,
        devfile: new.devfile,
        processed_devfile: new.processed_devfile,
        url_prefix: new.url_prefix,
        url_query_string: new.url_query_string,
        user_id: new.user_id,
        project_id: new.project_id,
        cluster_agent_id: new.cluster_agent_id,
        personal_access_token_id: new.personal_access_token_id,
        created_at: now,
    };

    sqlx::query(&format!(
        "INSERT INTO workspaces ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        WORKSPACE_COLUMNS
    ))
    .bind(workspace.id)
    .bind(&workspace.name)
    .bind(&workspace.namespace)
    .bind(workspace.desired_state.as_str())
    .bind(workspace.desired_state_updated_at)
    .bind(workspace.actual_state.as_str())
    .bind(&workspace.project_ref)
    .bind(&workspace.devfile_path)
    .bind(&workspace.devfile)
    .bind(&workspace.processed_devfile)
    .bind(&workspace.url_prefix)
    .bind(&workspace.url_query_string)
    .bind(workspace.user_id)
    .bind(workspace.project_id)
    .bind(workspace.cluster_agent_id)
    .bind(workspace.personal_access_token_id)
    .bind(workspace.created_at)
    .execute(conn)
    .await?;

    Ok(workspace)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Workspace>, sqlx::Error> {
    let row = sqlx::query_as::<_, WorkspaceRow>(&format!(
        "SELECT {} FROM workspaces WHERE id = $1",
        WORKSPACE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Workspace::try_from).transpose()
}

/// Newest first
pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Workspace>, sqlx::Error> {
    let rows = sqlx::query_as::<_, WorkspaceRow>(&format!(
        "SELECT {} FROM workspaces WHERE user_id = $1 ORDER BY created_at DESC",
        WORKSPACE_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Workspace::try_from).collect()
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: Uuid,
    name: String,
    namespace: String,
    desired_state: String,
    desired_state_updated_at: DateTime<Utc>,
    actual_state: String,
    project_ref: String,
    devfile_path: Option<String>,
    devfile: String,
    processed_devfile: String,
    url_prefix: String,
    url_query_string: String,
    user_id: i64,
    project_id: i64,
    cluster_agent_id: i64,
    personal_access_token_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<WorkspaceRow> for Workspace {
    type Error = sqlx::Error;

    fn try_from(row: WorkspaceRow) -> Result<Self, Self::Error> {
        let desired_state = row
            .desired_state
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let actual_state = row
            .actual_state
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Workspace {
            id: row.id,
            name: row.name,
            namespace: row.namespace,
            desired_state,
            desired_state_updated_at: row.desired_state_updated_at,
            actual_state,
            project_ref: row.project_ref,
            devfile_path: row.devfile_path,
            devfile: row.devfile,
            processed_devfile: row.processed_devfile,
            url_prefix: row.url_prefix,
            url_query_string: row.url_query_string,
            user_id: row.user_id,
            project_id: row.project_id,
            cluster_agent_id: row.cluster_agent_id,
            personal_access_token_id: row.personal_access_token_id,
            created_at: row.created_at,
        })
    }
}
