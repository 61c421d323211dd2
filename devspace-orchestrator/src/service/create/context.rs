//! Stage values threaded through the create pipeline
//!
//! Each stage consumes the value produced by the previous one and returns the
//! next, so a stage can only reach what earlier stages have produced.

use devspace_core::domain::agent::{AgentConfig, ClusterAgent};
use devspace_core::domain::agent_state::AgentState;
use devspace_core::domain::devfile::Devfile;
use devspace_core::domain::project::{Project, User};
use devspace_core::domain::token::PersonalAccessToken;
use devspace_core::domain::variable::WorkspaceVariable;
use devspace_core::domain::workspace::{DesiredState, Workspace};
use devspace_core::dto::workspace::VariableInput;
use serde::Serialize;

/// Resolved request
#[derive(Debug, Clone)]
pub struct CreateParams {
    pub user: User,
    pub project: Project,
    pub agent: ClusterAgent,
    pub desired_state: DesiredState,
    pub project_ref: String,
    pub devfile_path: Option<String>,
    pub variables: Vec<VariableInput>,
}

#[derive(Debug, Clone)]
pub struct Identified {
    pub params: CreateParams,
    pub agent_config: AgentConfig,
    pub workspace_name: String,
    pub workspace_namespace: String,
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub params: CreateParams,
    pub agent_config: AgentConfig,
    pub workspace_name: String,
    pub workspace_namespace: String,

    /// Raw devfile source, persisted verbatim
    pub devfile_yaml: String,
}

#[derive(Debug, Clone)]
pub struct Validated {
    pub params: CreateParams,
    pub agent_config: AgentConfig,
    pub workspace_name: String,
    pub workspace_namespace: String,
    pub devfile_yaml: String,
    pub processed_devfile: Devfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSettings {
    pub data_volume_name: String,
    pub data_volume_mount_path: String,
    pub tools_dir: String,
}

/// Settings resolved before the mutators run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningOptions {
    /// Base URL of the source host, with a trailing slash
    pub instance_url: String,
    pub shallow_clone: bool,
}

/// Input and output of every devfile mutator
#[derive(Debug, Clone)]
pub struct Prepared {
    pub params: CreateParams,
    pub agent_config: AgentConfig,
    pub workspace_name: String,
    pub workspace_namespace: String,
    pub devfile_yaml: String,
    pub processed_devfile: Devfile,
    pub volume: VolumeSettings,
    pub options: ProvisioningOptions,
}

/// Everything committed by a successful run
#[derive(Debug, Clone)]
pub struct Created {
    pub params: CreateParams,
    pub agent_config: AgentConfig,
    pub personal_access_token: PersonalAccessToken,
    pub workspace: Workspace,
    pub variables: Vec<WorkspaceVariable>,
    pub agent_state: Option<AgentState>,
}

/// Request snapshot attached to error responses
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub user_id: i64,
    pub project_id: i64,
    pub cluster_agent_id: i64,
    pub project_ref: String,
    pub devfile_path: Option<String>,
    pub desired_state: Option<DesiredState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_namespace: Option<String>,
}

impl Diagnostics {
    pub fn from_params(params: &CreateParams) -> Self {
        Self {
            user_id: params.user.id,
            project_id: params.project.id,
            cluster_agent_id: params.agent.id,
            project_ref: params.project_ref.clone(),
            devfile_path: params.devfile_path.clone(),
            desired_state: Some(params.desired_state),
            workspace_name: None,
            workspace_namespace: None,
        }
    }

    pub fn record_identity(&mut self, identified: &Identified) {
        self.workspace_name = Some(identified.workspace_name.clone());
        self.workspace_namespace = Some(identified.workspace_namespace.clone());
    }
}

impl Loaded {
    pub fn new(identified: Identified, devfile_yaml: String) -> Self {
        Self {
            params: identified.params,
            agent_config: identified.agent_config,
            workspace_name: identified.workspace_name,
            workspace_namespace: identified.workspace_namespace,
            devfile_yaml,
        }
    }
}

impl Validated {
    pub fn new(loaded: Loaded, processed_devfile: Devfile) -> Self {
        Self {
            params: loaded.params,
            agent_config: loaded.agent_config,
            workspace_name: loaded.workspace_name,
            workspace_namespace: loaded.workspace_namespace,
            devfile_yaml: loaded.devfile_yaml,
            processed_devfile,
        }
    }
}

impl Prepared {
    pub fn new(validated: Validated, volume: VolumeSettings, options: ProvisioningOptions) -> Self {
        Self {
            params: validated.params,
            agent_config: validated.agent_config,
            workspace_name: validated.workspace_name,
            workspace_namespace: validated.workspace_namespace,
            devfile_yaml: validated.devfile_yaml,
            processed_devfile: validated.processed_devfile,
            volume,
            options,
        }
    }
}
