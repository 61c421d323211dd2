//! Storage seams
//!
//! Traits the service layer reads and writes through. Postgres backs them in
//! production (`postgres::PgStore`); `crate::memory::MemoryStore` backs them
//! in tests and in the `memory` development backend.

use async_trait::async_trait;
use devspace_core::domain::agent::{AgentConfig, ClusterAgent};
use devspace_core::domain::agent_state::AgentState;
use devspace_core::domain::mapping::{NamespaceMapping, OrganizationMapping};
use devspace_core::domain::project::{Project, User};
use devspace_core::domain::token::PersonalAccessToken;
use devspace_core::domain::variable::WorkspaceVariable;
use devspace_core::domain::workspace::Workspace;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::records::{NewAgentState, NewPersonalAccessToken, NewWorkspace, NewWorkspaceVariable};

/// Infrastructure failure outside the record validation taxonomy
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("repository access failed: {0}")]
    Repository(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Validation messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{} {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Failure of a single record write
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is invalid: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for RecordError {
    fn from(err: sqlx::Error) -> Self {
        RecordError::Store(StoreError::Database(err))
    }
}

/// Users, projects and agents owned by the surrounding platform
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_project(&self, id: i64) -> Result<Option<Project>, StoreError>;

    async fn find_agent(&self, id: i64) -> Result<Option<ClusterAgent>, StoreError>;
}

/// Grants allowing projects to use a cluster agent
#[async_trait]
pub trait AgentMappings: Send + Sync {
    /// Organization grants for exactly this organization and agent
    async fn organization_mappings(
        &self,
        organization_id: i64,
        cluster_agent_id: i64,
    ) -> Result<Vec<OrganizationMapping>, StoreError>;

    /// Namespace grants for the agent whose namespace is one of `namespace_ids`
    async fn namespace_mappings(
        &self,
        namespace_ids: &[i64],
        cluster_agent_id: i64,
    ) -> Result<Vec<NamespaceMapping>, StoreError>;
}

#[async_trait]
pub trait AgentConfigs: Send + Sync {
    async fn find_by_agent(&self, cluster_agent_id: i64)
    -> Result<Option<AgentConfig>, StoreError>;
}

/// Opens creation scopes
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn CreationScope>, StoreError>;
}

/// All-or-nothing unit of work for one workspace creation
///
/// Nothing written through a scope is visible to readers until `commit`.
/// Dropping a scope without committing discards its writes.
#[async_trait]
pub trait CreationScope: Send {
    async fn create_personal_access_token(
        &mut self,
        token: NewPersonalAccessToken,
    ) -> Result<PersonalAccessToken, RecordError>;

    async fn create_workspace(&mut self, workspace: NewWorkspace)
    -> Result<Workspace, RecordError>;

    async fn create_variables(
        &mut self,
        variables: Vec<NewWorkspaceVariable>,
    ) -> Result<Vec<WorkspaceVariable>, RecordError>;

    async fn create_agent_state(&mut self, state: NewAgentState)
    -> Result<AgentState, RecordError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Read side of persisted workspaces
#[async_trait]
pub trait WorkspaceQueries: Send + Sync {
    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, StoreError>;

    async fn list_workspaces_for_user(&self, user_id: i64) -> Result<Vec<Workspace>, StoreError>;
}
