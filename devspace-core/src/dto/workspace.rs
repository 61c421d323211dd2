//! Workspace DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::variable::VariableType;
use crate::domain::workspace::{ActualState, DesiredState, Workspace};

/// Request to create a workspace
///
/// The requesting user is not part of the body; the API reads it from the
/// authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspace {
    pub project_id: i64,
    pub cluster_agent_id: i64,
    pub project_ref: String,

    /// Repository path of the devfile; the default template is used when absent
    #[serde(default)]
    pub devfile_path: Option<String>,

    pub desired_state: DesiredState,

    #[serde(default)]
    pub variables: Vec<VariableInput>,
}

/// User-provided workspace variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableInput {
    pub key: String,
    pub value: String,

    #[serde(default)]
    pub variable_type: VariableType,
}

/// Caller-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    BadRequest,
    InternalError,
}

/// Outcome envelope of a create request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreateWorkspaceResponse {
    Success {
        payload: CreatedWorkspace,
    },
    Error {
        reason: ErrorReason,
        details: String,
        context: serde_json::Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedWorkspace {
    pub workspace: WorkspaceSummary,
}

/// Workspace fields exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    pub id: Uuid,
    pub name: String,
    pub namespace: String,
    pub desired_state: DesiredState,
    pub actual_state: ActualState,
    pub url: String,
    pub project_ref: String,
    pub devfile_path: Option<String>,
    pub user_id: i64,
    pub project_id: i64,
    pub cluster_agent_id: i64,
    pub created_at: DateTime<Utc>,
}

impl WorkspaceSummary {
    pub fn from_workspace(workspace: &Workspace, dns_zone: &str) -> Self {
        Self {
            id: workspace.id,
            name: workspace.name.clone(),
            namespace: workspace.namespace.clone(),
            desired_state: workspace.desired_state,
            actual_state: workspace.actual_state,
            url: workspace.url(dns_zone),
            project_ref: workspace.project_ref.clone(),
            devfile_path: workspace.devfile_path.clone(),
            user_id: workspace.user_id,
            project_id: workspace.project_id,
            cluster_agent_id: workspace.cluster_agent_id,
            created_at: workspace.created_at,
        }
    }
}
