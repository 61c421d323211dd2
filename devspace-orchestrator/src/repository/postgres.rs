//! Postgres-backed store
//!
//! Wraps the pool for reads and a `sqlx::Transaction` for each creation
//! scope. Unique violations are reported as field errors on the record so
//! the pipeline can tell them apart from infrastructure failures.

use async_trait::async_trait;
use devspace_core::domain::agent::{AgentConfig, ClusterAgent};
use devspace_core::domain::agent_state::AgentState;
use devspace_core::domain::mapping::{NamespaceMapping, OrganizationMapping};
use devspace_core::domain::project::{Project, User};
use devspace_core::domain::token::PersonalAccessToken;
use devspace_core::domain::variable::WorkspaceVariable;
use devspace_core::domain::workspace::Workspace;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::records::{
    NewAgentState, NewPersonalAccessToken, NewWorkspace, NewWorkspaceVariable, validate_variables,
};
use super::store::{
    AgentConfigs, AgentMappings, Catalog, CreationScope, FieldErrors, RecordError, StoreError,
    WorkspaceQueries, WorkspaceStore,
};
use super::{
    agent_config_repository, agent_state_repository, catalog_repository, mapping_repository,
    token_repository, variable_repository, workspace_repository,
};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(catalog_repository::find_user(&self.pool, id).await?)
    }

    async fn find_project(&self, id: i64) -> Result<Option<Project>, StoreError> {
        Ok(catalog_repository::find_project(&self.pool, id).await?)
    }

    async fn find_agent(&self, id: i64) -> Result<Option<ClusterAgent>, StoreError> {
        Ok(catalog_repository::find_agent(&self.pool, id).await?)
    }
}

#[async_trait]
impl AgentMappings for PgStore {
    async fn organization_mappings(
        &self,
        organization_id: i64,
        cluster_agent_id: i64,
    ) -> Result<Vec<OrganizationMapping>, StoreError> {
        Ok(
            mapping_repository::find_organization_mappings(
                &self.pool,
                organization_id,
                cluster_agent_id,
            )
            .await?,
        )
    }

    async fn namespace_mappings(
        &self,
        namespace_ids: &[i64],
        cluster_agent_id: i64,
    ) -> Result<Vec<NamespaceMapping>, StoreError> {
        Ok(
            mapping_repository::find_namespace_mappings(&self.pool, namespace_ids, cluster_agent_id)
                .await?,
        )
    }
}

#[async_trait]
impl AgentConfigs for PgStore {
    async fn find_by_agent(
        &self,
        cluster_agent_id: i64,
    ) -> Result<Option<AgentConfig>, StoreError> {
        Ok(agent_config_repository::find_by_agent(&self.pool, cluster_agent_id).await?)
    }
}

#[async_trait]
impl WorkspaceQueries for PgStore {
    async fn find_workspace(&self, id: Uuid) -> Result<Option<Workspace>, StoreError> {
        Ok(workspace_repository::find_by_id(&self.pool, id).await?)
    }

    async fn list_workspaces_for_user(&self, user_id: i64) -> Result<Vec<Workspace>, StoreError> {
        Ok(workspace_repository::list_by_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl WorkspaceStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn CreationScope>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgCreationScope { tx }))
    }
}

/// One open transaction
pub struct PgCreationScope {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CreationScope for PgCreationScope {
    async fn create_personal_access_token(
        &mut self,
        token: NewPersonalAccessToken,
    ) -> Result<PersonalAccessToken, RecordError> {
        token.validate().map_err(RecordError::Invalid)?;
        token_repository::create(&mut *self.tx, token)
            .await
            .map_err(record_error)
    }

    async fn create_workspace(
        &mut self,
        workspace: NewWorkspace,
    ) -> Result<Workspace, RecordError> {
        workspace.validate().map_err(RecordError::Invalid)?;
        workspace_repository::create(&mut *self.tx, workspace)
            .await
            .map_err(record_error)
    }

    async fn create_variables(
        &mut self,
        variables: Vec<NewWorkspaceVariable>,
    ) -> Result<Vec<WorkspaceVariable>, RecordError> {
        validate_variables(&variables).map_err(RecordError::Invalid)?;
        variable_repository::create_all(&mut *self.tx, variables)
            .await
            .map_err(record_error)
    }

    async fn create_agent_state(
        &mut self,
        state: NewAgentState,
    ) -> Result<AgentState, RecordError> {
        state.validate().map_err(RecordError::Invalid)?;
        agent_state_repository::create(&mut *self.tx, state)
            .await
            .map_err(record_error)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Maps unique violations onto the field the constraint guards
fn record_error(err: sqlx::Error) -> RecordError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let field = db_err
                .constraint()
                .map(constraint_field)
                .unwrap_or("base");
            return RecordError::Invalid(FieldErrors::single(field, "has already been taken"));
        }
    }
    RecordError::from(err)
}

fn constraint_field(constraint: &str) -> &'static str {
    match constraint {
        "workspaces_name_key" => "name",
        "personal_access_tokens_token_digest_key" => "token_digest",
        "workspace_variables_workspace_id_key_variable_type_key" => "key",
        "workspace_agentk_states_workspace_id_key" => "workspace_id",
        _ => "base",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_field_mapping() {
        assert_eq!(constraint_field("workspaces_name_key"), "name");
        assert_eq!(
            constraint_field("workspace_variables_workspace_id_key_variable_type_key"),
            "key"
        );
        assert_eq!(constraint_field("something_else"), "base");
    }

    #[test]
    fn test_non_database_error_is_store_error() {
        let err = record_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, RecordError::Store(StoreError::Database(_))));
    }
}
