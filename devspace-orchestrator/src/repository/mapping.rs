//! Agent Mapping Repository
//!
//! Organization and namespace grants for cluster agents.

use devspace_core::domain::mapping::{NamespaceMapping, OrganizationMapping};
use sqlx::PgPool;

pub async fn find_organization_mappings(
    pool: &PgPool,
    organization_id: i64,
    cluster_agent_id: i64,
) -> Result<Vec<OrganizationMapping>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrganizationMappingRow>(
        r#"
        SELECT organization_id, cluster_agent_id
        FROM organization_cluster_agent_mappings
        WHERE organization_id = $1 AND cluster_agent_id = $2
        "#,
    )
    .bind(organization_id)
    .bind(cluster_agent_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

pub async fn find_namespace_mappings(
    pool: &PgPool,
    namespace_ids: &[i64],
    cluster_agent_id: i64,
) -> Result<Vec<NamespaceMapping>, sqlx::Error> {
    let rows = sqlx::query_as::<_, NamespaceMappingRow>(
        r#"
        SELECT namespace_id, cluster_agent_id
        FROM namespace_cluster_agent_mappings
        WHERE namespace_id = ANY($1) AND cluster_agent_id = $2
        ORDER BY namespace_id
        "#,
    )
    .bind(namespace_ids)
    .bind(cluster_agent_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct OrganizationMappingRow {
    organization_id: i64,
    cluster_agent_id: i64,
}

impl From<OrganizationMappingRow> for OrganizationMapping {
    fn from(row: OrganizationMappingRow) -> Self {
        OrganizationMapping {
            organization_id: row.organization_id,
            cluster_agent_id: row.cluster_agent_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NamespaceMappingRow {
    namespace_id: i64,
    cluster_agent_id: i64,
}

impl From<NamespaceMappingRow> for NamespaceMapping {
    fn from(row: NamespaceMappingRow) -> Self {
        NamespaceMapping {
            namespace_id: row.namespace_id,
            cluster_agent_id: row.cluster_agent_id,
        }
    }
}
