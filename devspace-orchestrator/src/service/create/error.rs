//! Create pipeline errors

use devspace_core::dto::workspace::ErrorReason;
use thiserror::Error;

use crate::repository::store::{FieldErrors, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationFailure {
    /// Neither an organization nor an ancestor namespace grant exists
    #[error(
        "Cluster agent '{agent_id}' is not mapped in organization '{organization_id}' and it is not mapped to an ancestor namespace of project '{project_full_path}'"
    )]
    NoMapping {
        agent_id: i64,
        organization_id: i64,
        project_full_path: String,
    },

    /// Ancestor namespace grants exist, but none of them contain the agent
    #[error(
        "Cluster agent '{agent_id}' is mapped to ancestor namespaces of project '{project_full_path}', but none of those namespaces contain the agent's own project"
    )]
    NotInHierarchy {
        agent_id: i64,
        project_full_path: String,
    },
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("{0}")]
    AuthorizationFailed(AuthorizationFailure),

    #[error("{details}")]
    ConfigurationMissing { details: String },

    #[error("{details}")]
    DevfileLoadFailed { details: String },

    #[error("Devfile restrictions failed: {}", errors.join("; "))]
    DevfileValidationFailed { errors: Vec<String> },

    #[error("Personal access token creation failed: {errors}")]
    CredentialCreateFailed { errors: FieldErrors },

    #[error("Workspace creation failed: {errors}")]
    WorkspaceCreateFailed { errors: FieldErrors },

    #[error("Workspace variables creation failed: {errors}")]
    VariablesCreateFailed { errors: FieldErrors },

    #[error("Desired config snapshot creation failed: {errors}")]
    SnapshotCreateFailed { errors: FieldErrors },

    #[error("Workspace could not be created: {0}")]
    Store(#[from] StoreError),
}

impl CreateError {
    /// Short variant name reported to usage events
    pub fn kind(&self) -> &'static str {
        match self {
            CreateError::AuthorizationFailed(_) => "WorkspaceCreateParamsValidationFailed",
            CreateError::ConfigurationMissing { .. } => "ConfigurationMissing",
            CreateError::DevfileLoadFailed { .. } => "WorkspaceCreateDevfileLoadFailed",
            CreateError::DevfileValidationFailed { .. } => "WorkspaceCreateDevfileValidationFailed",
            CreateError::CredentialCreateFailed { .. } => "PersonalAccessTokenModelCreateFailed",
            CreateError::WorkspaceCreateFailed { .. } => "WorkspaceModelCreateFailed",
            CreateError::VariablesCreateFailed { .. } => "WorkspaceVariablesModelCreateFailed",
            CreateError::SnapshotCreateFailed { .. } => "WorkspaceAgentkStateCreateFailed",
            CreateError::Store(_) => "StoreError",
        }
    }

    /// Caller-facing category; only infrastructure failures are internal
    pub fn category(&self) -> ErrorReason {
        match self {
            CreateError::AuthorizationFailed(_)
            | CreateError::ConfigurationMissing { .. }
            | CreateError::DevfileLoadFailed { .. }
            | CreateError::DevfileValidationFailed { .. }
            | CreateError::CredentialCreateFailed { .. }
            | CreateError::WorkspaceCreateFailed { .. }
            | CreateError::VariablesCreateFailed { .. }
            | CreateError::SnapshotCreateFailed { .. } => ErrorReason::BadRequest,
            CreateError::Store(_) => ErrorReason::InternalError,
        }
    }
}
