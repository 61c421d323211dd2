//! Catalog Repository
//!
//! Read access to the users, projects and cluster agents tables.

use devspace_core::domain::agent::ClusterAgent;
use devspace_core::domain::project::{Project, User};
use sqlx::PgPool;

pub async fn find_user(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, name, email FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

pub async fn find_project(pool: &PgPool, id: i64) -> Result<Option<Project>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT id, name, path, full_path, organization_id, namespace_id, namespace_traversal_ids
        FROM projects
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// The agent's traversal ids are those of the project it is registered in
pub async fn find_agent(pool: &PgPool, id: i64) -> Result<Option<ClusterAgent>, sqlx::Error> {
    let row = sqlx::query_as::<_, ClusterAgentRow>(
        r#"
        SELECT a.id, a.name, a.project_id, p.namespace_traversal_ids
        FROM cluster_agents a
        JOIN projects p ON p.id = a.project_id
        WHERE a.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    name: String,
    path: String,
    full_path: String,
    organization_id: i64,
    namespace_id: i64,
    namespace_traversal_ids: Vec<i64>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            name: row.name,
            path: row.path,
            full_path: row.full_path,
            organization_id: row.organization_id,
            namespace_id: row.namespace_id,
            namespace_traversal_ids: row.namespace_traversal_ids,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ClusterAgentRow {
    id: i64,
    name: String,
    project_id: i64,
    namespace_traversal_ids: Vec<i64>,
}

impl From<ClusterAgentRow> for ClusterAgent {
    fn from(row: ClusterAgentRow) -> Self {
        ClusterAgent {
            id: row.id,
            name: row.name,
            project_id: row.project_id,
            namespace_traversal_ids: row.namespace_traversal_ids,
        }
    }
}
