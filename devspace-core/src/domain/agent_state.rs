//! Desired-config snapshot persisted for the reconciliation loop

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Agent execution state holding the desired config of a workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub project_id: i64,

    /// Ordered list of Kubernetes resources the agent should apply
    pub desired_config: serde_json::Value,

    pub created_at: DateTime<Utc>,
}
