use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

const MIGRATIONS: &[&str] = &[
    // Catalog owned by the surrounding platform
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT PRIMARY KEY,
        username VARCHAR(255) NOT NULL,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id BIGINT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        path VARCHAR(255) NOT NULL,
        full_path TEXT NOT NULL,
        organization_id BIGINT NOT NULL,
        namespace_id BIGINT NOT NULL,
        namespace_traversal_ids BIGINT[] NOT NULL DEFAULT '{}'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cluster_agents (
        id BIGINT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workspaces_agent_configs (
        cluster_agent_id BIGINT PRIMARY KEY REFERENCES cluster_agents(id) ON DELETE CASCADE,
        enabled BOOLEAN NOT NULL DEFAULT TRUE,
        dns_zone VARCHAR(255) NOT NULL,
        shared_namespace VARCHAR(63) NOT NULL DEFAULT '',
        tools_injector_image TEXT NOT NULL,
        marketplace_enabled BOOLEAN NOT NULL DEFAULT TRUE,
        network_policy_enabled BOOLEAN NOT NULL DEFAULT TRUE,
        gitlab_workspaces_proxy_namespace VARCHAR(63) NOT NULL DEFAULT 'gitlab-workspaces',
        default_resources_per_workspace_container JSONB NOT NULL DEFAULT '{}'
    )
    "#,
    // Grants
    r#"
    CREATE TABLE IF NOT EXISTS organization_cluster_agent_mappings (
        organization_id BIGINT NOT NULL,
        cluster_agent_id BIGINT NOT NULL REFERENCES cluster_agents(id) ON DELETE CASCADE,
        PRIMARY KEY (organization_id, cluster_agent_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS namespace_cluster_agent_mappings (
        namespace_id BIGINT NOT NULL,
        cluster_agent_id BIGINT NOT NULL REFERENCES cluster_agents(id) ON DELETE CASCADE,
        PRIMARY KEY (namespace_id, cluster_agent_id)
    )
    "#,
    // Records written by the create pipeline
    r#"
    CREATE TABLE IF NOT EXISTS personal_access_tokens (
        id UUID PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name VARCHAR(255) NOT NULL,
        scopes TEXT[] NOT NULL DEFAULT '{}',
        token_digest VARCHAR(64) NOT NULL,
        expires_at TIMESTAMPTZ NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        CONSTRAINT personal_access_tokens_token_digest_key UNIQUE (token_digest)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workspaces (
        id UUID PRIMARY KEY,
        name VARCHAR(64) NOT NULL,
        namespace VARCHAR(63) NOT NULL,
        desired_state VARCHAR(32) NOT NULL,
        desired_state_updated_at TIMESTAMPTZ NOT NULL,
        actual_state VARCHAR(32) NOT NULL,
        project_ref TEXT NOT NULL,
        devfile_path TEXT,
        devfile TEXT NOT NULL,
        processed_devfile TEXT NOT NULL,
        url_prefix VARCHAR(255) NOT NULL,
        url_query_string TEXT NOT NULL,
        user_id BIGINT NOT NULL REFERENCES users(id),
        project_id BIGINT NOT NULL REFERENCES projects(id),
        cluster_agent_id BIGINT NOT NULL REFERENCES cluster_agents(id),
        personal_access_token_id UUID NOT NULL REFERENCES personal_access_tokens(id),
        created_at TIMESTAMPTZ NOT NULL,
        CONSTRAINT workspaces_name_key UNIQUE (name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workspace_variables (
        id UUID PRIMARY KEY,
        workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        variable_type SMALLINT NOT NULL,
        user_provided BOOLEAN NOT NULL DEFAULT FALSE,
        CONSTRAINT workspace_variables_workspace_id_key_variable_type_key
            UNIQUE (workspace_id, key, variable_type)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workspace_agentk_states (
        id UUID PRIMARY KEY,
        workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
        project_id BIGINT NOT NULL REFERENCES projects(id),
        desired_config JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        CONSTRAINT workspace_agentk_states_workspace_id_key UNIQUE (workspace_id)
    )
    "#,
    // Indexes for the read endpoints
    "CREATE INDEX IF NOT EXISTS idx_workspaces_user_id ON workspaces(user_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_workspaces_cluster_agent_id ON workspaces(cluster_agent_id)",
    "CREATE INDEX IF NOT EXISTS idx_namespace_mappings_agent ON namespace_cluster_agent_mappings(cluster_agent_id)",
];

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in MIGRATIONS {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
