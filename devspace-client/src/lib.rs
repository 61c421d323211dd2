//! Devspace HTTP Client
//!
//! Typed client for the orchestrator's workspace API.
//!
//! # Example
//!
//! ```no_run
//! use devspace_client::OrchestratorClient;
//! use devspace_core::domain::workspace::DesiredState;
//! use devspace_core::dto::workspace::{CreateWorkspace, CreateWorkspaceResponse};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OrchestratorClient::new("http://localhost:8080");
//!
//!     let response = client.create_workspace(2, &CreateWorkspace {
//!         project_id: 3,
//!         cluster_agent_id: 1,
//!         project_ref: "main".to_string(),
//!         devfile_path: None,
//!         desired_state: DesiredState::Running,
//!         variables: Vec::new(),
//!     }).await?;
//!
//!     if let CreateWorkspaceResponse::Success { payload } = response {
//!         println!("Created workspace: {}", payload.workspace.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod workspaces;

pub use error::{ClientError, Result};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// Header carrying the id of the user a request is made for
pub const USER_HEADER: &str = "x-devspace-user";

/// HTTP client for the Devspace orchestrator API
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:8080")
    base_url: String,
    client: Client,
}

impl OrchestratorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client on top of a configured reqwest Client
    /// (timeouts, proxies, TLS settings)
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Like `handle_response`, but 400 and 500 bodies are still decoded as `T`
    /// when they parse, since the create endpoint reports pipeline failures
    /// in its envelope
    async fn handle_envelope<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return self.handle_response(response).await;
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status == StatusCode::BAD_REQUEST || status == StatusCode::INTERNAL_SERVER_ERROR {
            if let Ok(envelope) = serde_json::from_str(&body) {
                return Ok(envelope);
            }
        }

        Err(ClientError::api_error(status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OrchestratorClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = OrchestratorClient::new("http://localhost:8080/");
        assert_eq!(client.url("/workspace/list"), "http://localhost:8080/workspace/list");
    }
}
