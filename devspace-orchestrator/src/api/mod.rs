//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod auth;
pub mod error;
pub mod health;
pub mod workspace;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::repository::store::{AgentConfigs, Catalog, WorkspaceQueries};
use crate::service::create_service::CreateDependencies;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: CreateDependencies,
    pub catalog: Arc<dyn Catalog>,
    pub queries: Arc<dyn WorkspaceQueries>,
    pub agent_configs: Arc<dyn AgentConfigs>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Workspace endpoints
        .route("/workspace/create", post(workspace::create_workspace))
        .route("/workspace/list", get(workspace::list_workspaces))
        .route("/workspace/{id}", get(workspace::get_workspace))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::api::auth::USER_HEADER;
    use crate::memory::{MemoryBlobStore, MemoryStore};
    use crate::service::create::test_support::{self, RecordingUsageEvents};
    use crate::service::feature_flags::StaticFeatureFlags;

    fn app(store: &MemoryStore) -> Router {
        let pipeline = test_support::dependencies(
            store,
            Arc::new(MemoryBlobStore::new()),
            Arc::new(RecordingUsageEvents::default()),
            StaticFeatureFlags::default(),
        );
        let shared = Arc::new(store.clone());
        create_router(AppState {
            pipeline,
            catalog: shared.clone(),
            queries: shared.clone(),
            agent_configs: shared,
        })
    }

    fn create_request(user: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/workspace/create")
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_HEADER, user);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn create_body(project_id: i64) -> Value {
        json!({
            "project_id": project_id,
            "cluster_agent_id": 1,
            "project_ref": "main",
            "desired_state": "Running"
        })
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(&MemoryStore::new())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let store = test_support::seeded_store();
        let app = app(&store);

        let response = app
            .clone()
            .oneshot(create_request(Some("2"), create_body(3)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "success");
        let id = body["payload"]["workspace"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/workspace/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let workspace = json_body(response).await;
        assert_eq!(workspace["name"], body["payload"]["workspace"]["name"]);

        let response = app
            .oneshot(
                Request::get("/workspace/list?user_id=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let list = json_body(response).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_user_header() {
        let store = test_support::seeded_store();

        let response = app(&store)
            .oneshot(create_request(None, create_body(3)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(&store)
            .oneshot(create_request(Some("alice"), create_body(3)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(store.workspaces().is_empty());
    }

    #[tokio::test]
    async fn test_create_unknown_project() {
        let store = test_support::seeded_store();

        let response = app(&store)
            .oneshot(create_request(Some("2"), create_body(404)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Project 404 not found");
    }

    #[tokio::test]
    async fn test_create_failure_envelope() {
        // No organization or namespace grant for the agent
        let store = MemoryStore::new();
        store.add_user(test_support::user());
        store.add_project(test_support::project());
        store.add_agent(test_support::agent());
        store.add_agent_config(test_support::agent_config());

        let response = app(&store)
            .oneshot(create_request(Some("2"), create_body(3)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["reason"], "bad_request");
        assert_eq!(body["context"]["project_id"], 3);
        assert!(store.workspaces().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_workspace() {
        let response = app(&MemoryStore::new())
            .oneshot(
                Request::get(format!("/workspace/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
