//! Workspace domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// State a user asks the workspace to be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesiredState {
    Running,
    Stopped,
    Terminated,
    RestartRequested,
}

/// State last reported for the workspace by its agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActualState {
    /// Persisted, not yet picked up by the agent
    CreationRequested,
    Starting,
    Running,
    Stopping,
    Stopped,
    Terminated,
    Failed,
    Error,
    Unknown,
}

/// Error returned when a state column holds an unknown value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown workspace state '{}'", self.0)
    }
}

impl std::error::Error for UnknownState {}

impl DesiredState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredState::Running => "Running",
            DesiredState::Stopped => "Stopped",
            DesiredState::Terminated => "Terminated",
            DesiredState::RestartRequested => "RestartRequested",
        }
    }
}

impl FromStr for DesiredState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Running" => Ok(DesiredState::Running),
            "Stopped" => Ok(DesiredState::Stopped),
            "Terminated" => Ok(DesiredState::Terminated),
            "RestartRequested" => Ok(DesiredState::RestartRequested),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

impl ActualState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActualState::CreationRequested => "CreationRequested",
            ActualState::Starting => "Starting",
            ActualState::Running => "Running",
            ActualState::Stopping => "Stopping",
            ActualState::Stopped => "Stopped",
            ActualState::Terminated => "Terminated",
            ActualState::Failed => "Failed",
            ActualState::Error => "Error",
            ActualState::Unknown => "Unknown",
        }
    }
}

impl FromStr for ActualState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CreationRequested" => Ok(ActualState::CreationRequested),
            "Starting" => Ok(ActualState::Starting),
            "Running" => Ok(ActualState::Running),
            "Stopping" => Ok(ActualState::Stopping),
            "Stopped" => Ok(ActualState::Stopped),
            "Terminated" => Ok(ActualState::Terminated),
            "Failed" => Ok(ActualState::Failed),
            "Error" => Ok(ActualState::Error),
            "Unknown" => Ok(ActualState::Unknown),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// Persisted workspace record
///
/// Created once by the create pipeline; reconciliation updates `actual_state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub namespace: String,
    pub desired_state: DesiredState,
    pub desired_state_updated_at: DateTime<Utc>,
    pub actual_state: ActualState,
    pub project_ref: String,
    pub devfile_path: Option<String>,

    /// Devfile as loaded, before any mutation
    pub devfile: String,

    /// Devfile after validation and mutation, serialized as YAML
    pub processed_devfile: String,

    pub url_prefix: String,
    pub url_query_string: String,
    pub user_id: i64,
    pub project_id: i64,
    pub cluster_agent_id: i64,
    pub personal_access_token_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    /// Editor URL under the agent's DNS zone
    pub fn url(&self, dns_zone: &str) -> String {
        format!(
            "https://{}.{}/?{}",
            self.url_prefix, dns_zone, self.url_query_string
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desired_state_parses_column_value() {
        assert_eq!("Running".parse::<DesiredState>(), Ok(DesiredState::Running));
        assert_eq!(
            "RestartRequested".parse::<DesiredState>(),
            Ok(DesiredState::RestartRequested)
        );
        assert!("running".parse::<DesiredState>().is_err());
    }

    #[test]
    fn test_actual_state_round_trips_through_column() {
        let state = ActualState::CreationRequested;
        assert_eq!(state.as_str().parse::<ActualState>(), Ok(state));
    }

    #[test]
    fn test_workspace_url() {
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: "workspace-1-2-abcdef".to_string(),
            namespace: "gl-rd-ns-1-2-abcdef".to_string(),
            desired_state: DesiredState::Running,
            desired_state_updated_at: Utc::now(),
            actual_state: ActualState::CreationRequested,
            project_ref: "main".to_string(),
            devfile_path: None,
            devfile: String::new(),
            processed_devfile: String::new(),
            url_prefix: "60001-workspace-1-2-abcdef".to_string(),
            url_query_string: "folder=%2Fprojects%2Fdemo".to_string(),
            user_id: 2,
            project_id: 3,
            cluster_agent_id: 1,
            personal_access_token_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        assert_eq!(
            workspace.url("workspaces.example.dev"),
            "https://60001-workspace-1-2-abcdef.workspaces.example.dev/?folder=%2Fprojects%2Fdemo"
        );
    }
}
