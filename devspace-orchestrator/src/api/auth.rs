//! Requesting user
//!
//! The authenticating proxy in front of the orchestrator forwards the user
//! id in `x-devspace-user`.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::api::error::ApiError;

pub const USER_HEADER: &str = "x-devspace-user";

/// Id of the user a request is made on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestUser(pub i64);

impl<S> FromRequestParts<S> for RequestUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", USER_HEADER)))?;

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(RequestUser)
            .ok_or_else(|| ApiError::Unauthorized(format!("Invalid {} header", USER_HEADER)))
    }
}
