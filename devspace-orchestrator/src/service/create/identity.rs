use rand::Rng;

use super::constants::{NAMESPACE_PREFIX, RANDOM_SUFFIX_LENGTH, WORKSPACE_NAME_PREFIX};
use super::context::{CreateParams, Identified};
use super::error::CreateError;
use crate::repository::store::AgentConfigs;

/// Source of the random part of workspace names
pub trait NameGenerator: Send + Sync {
    fn random_suffix(&self) -> String;
}

/// Lowercase alphanumeric suffixes from the thread RNG
pub struct RandomNameGenerator;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

impl NameGenerator for RandomNameGenerator {
    fn random_suffix(&self) -> String {
        let mut rng = rand::rng();
        (0..RANDOM_SUFFIX_LENGTH)
            .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
            .collect()
    }
}

/// Resolves the agent config and derives the workspace name and namespace
pub async fn identify(
    configs: &dyn AgentConfigs,
    names: &dyn NameGenerator,
    params: CreateParams,
) -> Result<Identified, CreateError> {
    let agent_config = configs
        .find_by_agent(params.agent.id)
        .await?
        .ok_or_else(|| CreateError::ConfigurationMissing {
            details: format!(
                "No workspaces agent config found for agent '{}'",
                params.agent.name
            ),
        })?;

    if !agent_config.enabled {
        return Err(CreateError::ConfigurationMissing {
            details: format!(
                "Workspaces are not enabled for agent '{}'",
                params.agent.name
            ),
        });
    }

    let suffix = names.random_suffix();
    let workspace_name = format!(
        "{}-{}-{}-{}",
        WORKSPACE_NAME_PREFIX, params.agent.id, params.user.id, suffix
    );
    let workspace_namespace = if agent_config.uses_shared_namespace() {
        agent_config.shared_namespace.clone()
    } else {
        format!(
            "{}-{}-{}-{}",
            NAMESPACE_PREFIX, params.agent.id, params.user.id, suffix
        )
    };

    Ok(Identified {
        params,
        agent_config,
        workspace_name,
        workspace_namespace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::service::create::test_support::{self, FixedNameGenerator};

    #[test]
    fn test_random_suffix_shape() {
        let suffix = RandomNameGenerator.random_suffix();
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LENGTH);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[tokio::test]
    async fn test_unique_namespace() {
        let store = MemoryStore::new();
        store.add_agent_config(test_support::agent_config());

        let identified = identify(&store, &FixedNameGenerator("abc123"), test_support::params())
            .await
            .unwrap();

        assert_eq!(identified.workspace_name, "workspace-1-2-abc123");
        assert_eq!(identified.workspace_namespace, "gl-rd-ns-1-2-abc123");
    }

    #[tokio::test]
    async fn test_shared_namespace() {
        let store = MemoryStore::new();
        let mut config = test_support::agent_config();
        config.shared_namespace = "team-workspaces".to_string();
        store.add_agent_config(config);

        let identified = identify(&store, &FixedNameGenerator("abc123"), test_support::params())
            .await
            .unwrap();

        assert_eq!(identified.workspace_name, "workspace-1-2-abc123");
        assert_eq!(identified.workspace_namespace, "team-workspaces");
    }

    #[tokio::test]
    async fn test_missing_or_disabled_config() {
        let store = MemoryStore::new();
        let err = identify(&store, &FixedNameGenerator("abc123"), test_support::params())
            .await
            .unwrap_err();
        assert!(matches!(err, CreateError::ConfigurationMissing { .. }));

        let mut config = test_support::agent_config();
        config.enabled = false;
        store.add_agent_config(config);
        let err = identify(&store, &FixedNameGenerator("abc123"), test_support::params())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not enabled"));
    }
}
