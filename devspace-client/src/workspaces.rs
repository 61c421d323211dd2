//! Workspace API endpoints

use devspace_core::dto::workspace::{CreateWorkspace, CreateWorkspaceResponse, WorkspaceSummary};
use uuid::Uuid;

use crate::error::Result;
use crate::{OrchestratorClient, USER_HEADER};

impl OrchestratorClient {
    /// Request a workspace on behalf of `user_id`
    ///
    /// Pipeline failures come back as `CreateWorkspaceResponse::Error`;
    /// only transport failures and non-envelope responses (401, 404) are
    /// returned as `Err`.
    pub async fn create_workspace(
        &self,
        user_id: i64,
        req: &CreateWorkspace,
    ) -> Result<CreateWorkspaceResponse> {
        tracing::debug!("Creating workspace in project {}", req.project_id);

        let response = self
            .client
            .post(self.url("/workspace/create"))
            .header(USER_HEADER, user_id.to_string())
            .json(req)
            .send()
            .await?;

        self.handle_envelope(response).await
    }

    pub async fn get_workspace(&self, id: Uuid) -> Result<WorkspaceSummary> {
        let response = self
            .client
            .get(self.url(&format!("/workspace/{}", id)))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List a user's workspaces, newest first
    pub async fn list_workspaces(&self, user_id: i64) -> Result<Vec<WorkspaceSummary>> {
        let response = self
            .client
            .get(self.url("/workspace/list"))
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        self.handle_response(response).await
    }
}
