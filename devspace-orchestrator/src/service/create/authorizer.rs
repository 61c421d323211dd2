use tracing::debug;

use super::context::CreateParams;
use super::error::{AuthorizationFailure, CreateError};
use crate::repository::store::AgentMappings;

/// Checks that the agent is granted to the project
///
/// An organization grant wins outright. Without one, a namespace grant on
/// one of the project's ancestors is accepted only if that namespace also
/// contains the agent's own project.
pub async fn authorize(
    mappings: &dyn AgentMappings,
    params: CreateParams,
) -> Result<CreateParams, CreateError> {
    let project = &params.project;
    let agent = &params.agent;

    let organization_mappings = mappings
        .organization_mappings(project.organization_id, agent.id)
        .await?;
    if !organization_mappings.is_empty() {
        debug!(
            agent_id = agent.id,
            organization_id = project.organization_id,
            "Agent authorized through organization mapping"
        );
        return Ok(params);
    }

    let namespace_mappings = mappings
        .namespace_mappings(&project.namespace_traversal_ids, agent.id)
        .await?;
    if namespace_mappings.is_empty() {
        return Err(CreateError::AuthorizationFailed(
            AuthorizationFailure::NoMapping {
                agent_id: agent.id,
                organization_id: project.organization_id,
                project_full_path: project.full_path.clone(),
            },
        ));
    }

    let containing = namespace_mappings
        .iter()
        .find(|mapping| agent.is_within_namespace(mapping.namespace_id));

    match containing {
        Some(mapping) => {
            debug!(
                agent_id = agent.id,
                namespace_id = mapping.namespace_id,
                "Agent authorized through namespace mapping"
            );
            Ok(params)
        }
        None => Err(CreateError::AuthorizationFailed(
            AuthorizationFailure::NotInHierarchy {
                agent_id: agent.id,
                project_full_path: project.full_path.clone(),
            },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::service::create::test_support;
    use devspace_core::domain::mapping::{NamespaceMapping, OrganizationMapping};

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_agent(test_support::agent());
        store
    }

    #[tokio::test]
    async fn test_organization_mapping_wins() {
        let store = store();
        store.add_organization_mapping(OrganizationMapping {
            organization_id: test_support::project().organization_id,
            cluster_agent_id: test_support::agent().id,
        });
        // would fail the hierarchy check on its own
        store.add_namespace_mapping(NamespaceMapping {
            namespace_id: 30,
            cluster_agent_id: test_support::agent().id,
        });

        assert!(authorize(&store, test_support::params()).await.is_ok());
    }

    #[tokio::test]
    async fn test_no_mapping() {
        let store = store();
        let err = authorize(&store, test_support::params()).await.unwrap_err();

        match err {
            CreateError::AuthorizationFailed(AuthorizationFailure::NoMapping {
                agent_id, ..
            }) => assert_eq!(agent_id, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_namespace_mapping_must_contain_agent() {
        let store = store();
        // project namespace 30 is not an ancestor of the agent (10 -> 20)
        store.add_namespace_mapping(NamespaceMapping {
            namespace_id: 30,
            cluster_agent_id: 1,
        });

        let err = authorize(&store, test_support::params()).await.unwrap_err();
        assert!(matches!(
            err,
            CreateError::AuthorizationFailed(AuthorizationFailure::NotInHierarchy { .. })
        ));

        store.add_namespace_mapping(NamespaceMapping {
            namespace_id: 10,
            cluster_agent_id: 1,
        });
        assert!(authorize(&store, test_support::params()).await.is_ok());
    }

    #[tokio::test]
    async fn test_mapping_for_other_agent_is_ignored() {
        let store = store();
        store.add_organization_mapping(OrganizationMapping {
            organization_id: test_support::project().organization_id,
            cluster_agent_id: 99,
        });

        assert!(authorize(&store, test_support::params()).await.is_err());
    }
}
