//! In-memory store
//!
//! Implements every storage seam over process memory. Used by the tests and
//! by the `memory` backend for local development, where it is seeded from a
//! JSON file.

use async_trait::async_trait;
use chrono::Utc;
use devspace_core::domain::agent::{AgentConfig, ClusterAgent};
use devspace_core::domain::agent_state::AgentState;
use devspace_core::domain::mapping::{NamespaceMapping, OrganizationMapping};
use devspace_core::domain::project::{Project, User};
use devspace_core::domain::token::PersonalAccessToken;
use devspace_core::domain::variable::WorkspaceVariable;
use devspace_core::domain::workspace::Workspace;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::repository::blob::BlobStore;
use crate::repository::records::{
    NewAgentState, NewPersonalAccessToken, NewWorkspace, NewWorkspaceVariable, validate_variables,
};
use crate::repository::store::{
    AgentConfigs, AgentMappings, Catalog, CreationScope, FieldErrors, RecordError, StoreError,
    WorkspaceQueries, WorkspaceStore,
};

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    projects: HashMap<i64, Project>,
    agents: HashMap<i64, ClusterAgent>,
    agent_configs: HashMap<i64, AgentConfig>,
    organization_mappings: Vec<OrganizationMapping>,
    namespace_mappings: Vec<NamespaceMapping>,
    tokens: Vec<PersonalAccessToken>,
    workspaces: Vec<Workspace>,
    variables: Vec<WorkspaceVariable>,
    agent_states: Vec<AgentState>,
}

/// Cheap to clone; clones share the same tables
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

/// Initial contents for the development backend
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub agents: Vec<ClusterAgent>,
    pub agent_configs: Vec<AgentConfig>,
    pub organization_mappings: Vec<OrganizationMapping>,
    pub namespace_mappings: Vec<NamespaceMapping>,
    pub blobs: Vec<SeedBlob>,
}

#[derive(Debug, Deserialize)]
pub struct SeedBlob {
    pub project_id: i64,
    pub git_ref: String,
    pub path: String,
    pub content: String,
}

impl Seed {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read seed file {}: {}", path.display(), e))?;
        let seed = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid seed file {}: {}", path.display(), e))?;
        Ok(seed)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: &Seed) -> Self {
        let store = Self::new();
        for user in &seed.users {
            store.add_user(user.clone());
        }
        for project in &seed.projects {
            store.add_project(project.clone());
        }
        for agent in &seed.agents {
            store.add_agent(agent.clone());
        }
        for config in &seed.agent_configs {
            store.add_agent_config(config.clone());
        }
        for mapping in &seed.organization_mappings {
            store.add_organization_mapping(mapping.clone());
        }
        for mapping in &seed.namespace_mappings {
            store.add_namespace_mapping(mapping.clone());
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_user(&self, user: User) {
        self.lock().users.insert(user.id, user);
    }

    pub fn add_project(&self, project: Project) {
        self.lock().projects.insert(project.id, project);
    }

    pub fn add_agent(&self, agent: ClusterAgent) {
        self.lock().agents.insert(agent.id, agent);
    }

    /// Replaces any config already stored for the agent
    pub fn add_agent_config(&self, config: AgentConfig) {
        self.lock()
            .agent_configs
            .insert(config.cluster_agent_id, config);
    }

    pub fn add_organization_mapping(&self, mapping: OrganizationMapping) {
        self.lock().organization_mappings.push(mapping);
    }

    pub fn add_namespace_mapping(&self, mapping: NamespaceMapping) {
        self.lock().namespace_mappings.push(mapping);
    }

    pub fn tokens(&self) -> Vec<PersonalAccessToken> {
        self.lock().tokens.clone()
    }

    pub fn workspaces(&self) -> Vec<Workspace> {
        self.lock().workspaces.clone()
    }

    pub fn variables(&self) -> Vec<WorkspaceVariable> {
        self.lock().variables.clone()
    }

    pub fn agent_states(&self) -> Vec<AgentState> {
        self.lock().agent_states.clone()
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_project(&self, id: i64) -> Result<Option<Project>, StoreError> {
        Ok(self.lock().projects.get(&id).cloned())
    }

    async fn find_agent(&self, id: i64) -> Result<Option<ClusterAgent>, StoreError> {
        Ok(self.lock().agents.get(&id).cloned())
    }
}

#[async_trait]
impl AgentMappings for MemoryStore {
    async fn organization_mappings(
        &self,
        organization_id: i64,
        cluster_agent_id: i64,
    ) -> Result<Vec<OrganizationMapping>, StoreError> {
        Ok(self
            .lock()
            .organization_mappings
            .iter()
            .filter(|m| m.organization_id == organization_id && m.cluster_agent_id == cluster_agent_id)
            .cloned()
            .collect())
    }

    async fn namespace_mappings(
        &self,
        namespace_ids: &[i64],
        cluster_agent_id: i64,
    ) -> Result<Vec<NamespaceMapping>, StoreError> {
        Ok(self
            .lock()
            .namespace_mappings
            .iter()
            .filter(|m| {
                m.cluster_agent_id == cluster_agent_id && namespace_ids.contains(&m.namespace_id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AgentConfigs for MemoryStore {
    async fn find_by_agent(
        &self,
        cluster_agent_id: i64,
    ) -> Result<Option<AgentConfig>, StoreError> {
        Ok(self.lock().agent_configs.get(&cluster_agent_id).cloned())
    }
}

#[async_trait]
impl WorkspaceQueries for MemoryStore {
    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, StoreError> {
        Ok(self.lock().workspaces.iter().find(|w| w.id == id).cloned())
    }

    async fn list_workspaces_for_user(&self, user_id: i64) -> Result<Vec<Workspace>, StoreError> {
        let mut workspaces: Vec<Workspace> = self
            .lock()
            .workspaces
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        workspaces.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(workspaces)
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn CreationScope>, StoreError> {
        Ok(Box::new(MemoryCreationScope {
            store: self.clone(),
            staged: Staged::default(),
        }))
    }
}

/// Writes held back until commit
#[derive(Default)]
struct Staged {
    tokens: Vec<PersonalAccessToken>,
    workspaces: Vec<Workspace>,
    variables: Vec<WorkspaceVariable>,
    agent_states: Vec<AgentState>,
}

struct MemoryCreationScope {
    store: MemoryStore,
    staged: Staged,
}

#[async_trait]
impl CreationScope for MemoryCreationScope {
    async fn create_personal_access_token(
        &mut self,
        token: NewPersonalAccessToken,
    ) -> Result<PersonalAccessToken, RecordError> {
        token.validate().map_err(RecordError::Invalid)?;

        let taken = self
            .store
            .lock()
            .tokens
            .iter()
            .chain(&self.staged.tokens)
            .any(|t| t.token_digest == token.token_digest);
        if taken {
            return Err(RecordError::Invalid(FieldErrors::single(
                "token_digest",
                "has already been taken",
            )));
        }

        let record = PersonalAccessToken {
            id: Uuid::new_v4(),
            user_id: token.user_id,
            name: token.name,
            scopes: token.scopes,
            token_digest: token.token_digest,
            expires_at: token.expires_at,
            created_at: Utc::now(),
        };
        self.staged.tokens.push(record.clone());
        Ok(record)
    }

    async fn create_workspace(
        &mut self,
        workspace: NewWorkspace,
    ) -> Result<Workspace, RecordError> {
        workspace.validate().map_err(RecordError::Invalid)?;

        let taken = self
            .store
            .lock()
            .workspaces
            .iter()
            .chain(&self.staged.workspaces)
            .any(|w| w.name == workspace.name);
        if taken {
            return Err(RecordError::Invalid(FieldErrors::single(
                "name",
                "has already been taken",
            )));
        }

        let now = Utc::now();
        let record = Workspace {
            id: Uuid::new_v4(),
            name: workspace.name,
            namespace: workspace.namespace,
            desired_state: workspace.desired_state,
            desired_state_updated_at: now,
            actual_state: workspace.actual_state,
            project_ref: workspace.project_ref,
            devfile_path: workspace.devfile_path,
            devfile: workspace.devfile,
            processed_devfile: workspace.processed_devfile,
            url_prefix: workspace.url_prefix,
            url_query_string: workspace.url_query_string,
            user_id: workspace.user_id,
            project_id: workspace.project_id,
            cluster_agent_id: workspace.cluster_agent_id,
            personal_access_token_id: workspace.personal_access_token_id,
            created_at: now,
        };
        self.staged.workspaces.push(record.clone());
        Ok(record)
    }

    async fn create_variables(
        &mut self,
        variables: Vec<NewWorkspaceVariable>,
    ) -> Result<Vec<WorkspaceVariable>, RecordError> {
        validate_variables(&variables).map_err(RecordError::Invalid)?;

        let records: Vec<WorkspaceVariable> = variables
            .into_iter()
            .map(|v| WorkspaceVariable {
                id: Uuid::new_v4(),
                workspace_id: v.workspace_id,
                key: v.key,
                value: v.value,
                variable_type: v.variable_type,
                user_provided: v.user_provided,
            })
            .collect();
        self.staged.variables.extend(records.iter().cloned());
        Ok(records)
    }

    async fn create_agent_state(
        &mut self,
        state: NewAgentState,
    ) -> Result<AgentState, RecordError> {
        state.validate().map_err(RecordError::Invalid)?;

        let record = AgentState {
            id: Uuid::new_v4(),
            workspace_id: state.workspace_id,
            project_id: state.project_id,
            desired_config: state.desired_config,
            created_at: Utc::now(),
        };
        self.staged.agent_states.push(record.clone());
        Ok(record)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryCreationScope { store, staged } = *self;
        let mut tables = store.lock();
        tables.tokens.extend(staged.tokens);
        tables.workspaces.extend(staged.workspaces);
        tables.variables.extend(staged.variables);
        tables.agent_states.extend(staged.agent_states);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

// =============================================================================
// Blobs
// =============================================================================

/// Repository files keyed by project, ref and path
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<(i64, String, String), String>>,
    reads: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: &Seed) -> Self {
        let store = Self::new();
        for blob in &seed.blobs {
            store.insert(blob.project_id, &blob.git_ref, &blob.path, &blob.content);
        }
        store
    }

    pub fn insert(&self, project_id: i64, git_ref: &str, path: &str, content: &str) {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (project_id, git_ref.to_string(), path.to_string()),
                content.to_string(),
            );
    }

    /// Number of `read_blob` calls so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read_blob(
        &self,
        project: &Project,
        git_ref: &str,
        path: &str,
    ) -> Result<Option<String>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let key = (project.id, git_ref.to_string(), path.to_string());
        Ok(self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devspace_core::domain::variable::VariableType;
    use devspace_core::domain::workspace::{ActualState, DesiredState};

    fn new_workspace(name: &str) -> NewWorkspace {
        NewWorkspace {
            name: name.to_string(),
            namespace: "gl-rd-ns-1-2-abc123".to_string(),
            desired_state: DesiredState::Running,
            actual_state: ActualState::CreationRequested,
            project_ref: "main".to_string(),
            devfile_path: None,
            devfile: "schemaVersion: 2.2.0".to_string(),
            processed_devfile: "schemaVersion: 2.2.0".to_string(),
            url_prefix: format!("60001-{}", name),
            url_query_string: "folder=%2Fprojects%2Fdemo".to_string(),
            user_id: 2,
            project_id: 3,
            cluster_agent_id: 1,
            personal_access_token_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_scope_writes_are_invisible_until_commit() {
        let store = MemoryStore::new();
        let mut scope = store.begin().await.unwrap();

        scope
            .create_workspace(new_workspace("workspace-1-2-abc123"))
            .await
            .unwrap();
        assert!(store.workspaces().is_empty());

        scope.commit().await.unwrap();
        assert_eq!(store.workspaces().len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = MemoryStore::new();
        let mut scope = store.begin().await.unwrap();

        let workspace = scope
            .create_workspace(new_workspace("workspace-1-2-abc123"))
            .await
            .unwrap();
        scope
            .create_variables(vec![NewWorkspaceVariable {
                workspace_id: workspace.id,
                key: "A".to_string(),
                value: "1".to_string(),
                variable_type: VariableType::Environment,
                user_provided: true,
            }])
            .await
            .unwrap();
        scope.rollback().await.unwrap();

        assert!(store.workspaces().is_empty());
        assert!(store.variables().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_within_scope() {
        let store = MemoryStore::new();
        let mut scope = store.begin().await.unwrap();

        scope
            .create_workspace(new_workspace("workspace-1-2-abc123"))
            .await
            .unwrap();
        let err = scope
            .create_workspace(new_workspace("workspace-1-2-abc123"))
            .await
            .unwrap_err();

        match err {
            RecordError::Invalid(errors) => {
                assert_eq!(errors.get("name"), Some(&["has already been taken".to_string()][..]))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_seed_populates_catalog_and_blobs() {
        let seed: Seed = serde_json::from_value(serde_json::json!({
            "users": [{ "id": 2, "username": "alice", "name": "Alice", "email": "a@example.com" }],
            "blobs": [{ "project_id": 3, "git_ref": "main", "path": ".devfile.yaml", "content": "x" }]
        }))
        .unwrap();

        let store = MemoryStore::from_seed(&seed);
        let blobs = MemoryBlobStore::from_seed(&seed);

        assert_eq!(store.find_user(2).await.unwrap().map(|u| u.username), Some("alice".to_string()));
        assert!(store.find_project(3).await.unwrap().is_none());
        assert_eq!(blobs.blobs.lock().unwrap().len(), 1);
    }
}
