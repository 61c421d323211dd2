//! Agent Config Repository

use devspace_core::domain::agent::AgentConfig;
use sqlx::PgPool;

pub async fn find_by_agent(
    pool: &PgPool,
    cluster_agent_id: i64,
) -> Result<Option<AgentConfig>, sqlx::Error> {
    let row = sqlx::query_as::<_, AgentConfigRow>(
        r#"
        SELECT cluster_agent_id, enabled, dns_zone, shared_namespace, tools_injector_image,
               marketplace_enabled, network_policy_enabled, gitlab_workspaces_proxy_namespace,
               default_resources_per_workspace_container
        FROM workspaces_agent_configs
        WHERE cluster_agent_id = $1
        "#,
    )
    .bind(cluster_agent_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct AgentConfigRow {
    cluster_agent_id: i64,
    enabled: bool,
    dns_zone: String,
    shared_namespace: String,
    tools_injector_image: String,
    marketplace_enabled: bool,
    network_policy_enabled: bool,
    gitlab_workspaces_proxy_namespace: String,
    default_resources_per_workspace_container: serde_json::Value,
}

impl From<AgentConfigRow> for AgentConfig {
    fn from(row: AgentConfigRow) -> Self {
        let default_resources =
            serde_json::from_value(row.default_resources_per_workspace_container)
                .unwrap_or_default();

        AgentConfig {
            cluster_agent_id: row.cluster_agent_id,
            enabled: row.enabled,
            dns_zone: row.dns_zone,
            shared_namespace: row.shared_namespace,
            tools_injector_image: row.tools_injector_image,
            marketplace_enabled: row.marketplace_enabled,
            network_policy_enabled: row.network_policy_enabled,
            gitlab_workspaces_proxy_namespace: row.gitlab_workspaces_proxy_namespace,
            default_resources_per_workspace_container: default_resources,
        }
    }
}
