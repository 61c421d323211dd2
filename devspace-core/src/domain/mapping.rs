//! Authorization grants allowing a cluster agent to serve workspaces

use serde::{Deserialize, Serialize};

/// Grant of an agent to every project in an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMapping {
    pub organization_id: i64,
    pub cluster_agent_id: i64,
}

/// Grant of an agent to a namespace and its descendants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceMapping {
    pub namespace_id: i64,
    pub cluster_agent_id: i64,
}
