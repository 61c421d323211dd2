//! Cluster agent domain types

use serde::{Deserialize, Serialize};

/// A cluster agent that workspaces are scheduled onto
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAgent {
    pub id: i64,
    pub name: String,

    /// Project the agent is registered in
    pub project_id: i64,

    /// Ancestor chain of the agent project's namespace, root first, own namespace last
    pub namespace_traversal_ids: Vec<i64>,
}

impl ClusterAgent {
    /// Whether the agent's own namespace sits at or below `namespace_id`
    pub fn is_within_namespace(&self, namespace_id: i64) -> bool {
        self.namespace_traversal_ids.contains(&namespace_id)
    }
}

/// Workspace settings configured for a cluster agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub cluster_agent_id: i64,
    pub enabled: bool,

    /// DNS zone workspace hosts are published under
    pub dns_zone: String,

    /// Empty means every workspace gets its own namespace
    pub shared_namespace: String,

    /// Image of the init container that installs the editor tooling
    pub tools_injector_image: String,

    pub marketplace_enabled: bool,
    pub network_policy_enabled: bool,

    /// Namespace of the workspaces proxy allowed through the network policy
    pub gitlab_workspaces_proxy_namespace: String,

    /// Applied to containers that declare no limits or requests of their own
    #[serde(default)]
    pub default_resources_per_workspace_container: ContainerResources,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerResources {
    #[serde(default)]
    pub limits: ResourceQuantities,
    #[serde(default)]
    pub requests: ResourceQuantities,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl ResourceQuantities {
    pub fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none()
    }
}

impl AgentConfig {
    pub fn uses_shared_namespace(&self) -> bool {
        !self.shared_namespace.is_empty()
    }
}
