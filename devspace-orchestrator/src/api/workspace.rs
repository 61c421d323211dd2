//! Workspace API Handlers
//!
//! HTTP endpoints for creating and reading workspaces.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use devspace_core::dto::workspace::{
    CreateWorkspace, CreateWorkspaceResponse, ErrorReason, WorkspaceSummary,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::auth::RequestUser;
use crate::api::error::ApiResult;
use crate::service::{create_service, workspace_service};

/// POST /workspace/create
/// Run the create pipeline for the requesting user
///
/// The body of the response is always the outcome envelope; its status
/// code follows the envelope's failure category.
pub async fn create_workspace(
    State(state): State<AppState>,
    RequestUser(user_id): RequestUser,
    Json(req): Json<CreateWorkspace>,
) -> ApiResult<(StatusCode, Json<CreateWorkspaceResponse>)> {
    tracing::info!(
        "Creating workspace for user {} in project {}",
        user_id,
        req.project_id
    );

    let params =
        workspace_service::resolve_create_params(state.catalog.as_ref(), user_id, req).await?;
    let response = create_service::create_workspace(&state.pipeline, params).await;

    Ok((status_of(&response), Json(response)))
}

fn status_of(response: &CreateWorkspaceResponse) -> StatusCode {
    match response {
        CreateWorkspaceResponse::Success { .. } => StatusCode::OK,
        CreateWorkspaceResponse::Error {
            reason: ErrorReason::BadRequest,
            ..
        } => StatusCode::BAD_REQUEST,
        CreateWorkspaceResponse::Error {
            reason: ErrorReason::InternalError,
            ..
        } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// GET /workspace/{id}
pub async fn get_workspace(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WorkspaceSummary>> {
    tracing::debug!("Getting workspace: {}", id);

    let workspace =
        workspace_service::get_workspace(state.queries.as_ref(), state.agent_configs.as_ref(), id)
            .await?;

    Ok(Json(workspace))
}

#[derive(Debug, Deserialize)]
pub struct ListWorkspacesQuery {
    pub user_id: i64,
}

/// GET /workspace/list?user_id=
/// List a user's workspaces, newest first
pub async fn list_workspaces(
    State(state): State<AppState>,
    Query(params): Query<ListWorkspacesQuery>,
) -> ApiResult<Json<Vec<WorkspaceSummary>>> {
    tracing::debug!("Listing workspaces for user: {}", params.user_id);

    let workspaces = workspace_service::list_workspaces(
        state.queries.as_ref(),
        state.agent_configs.as_ref(),
        params.user_id,
    )
    .await?;

    Ok(Json(workspaces))
}
