//! Insertable records
//!
//! Every store validates a record before writing it, so the in-memory and
//! Postgres backends reject the same input with the same field errors.

use chrono::{DateTime, Duration, Utc};
use devspace_core::domain::token::MAX_TOKEN_LIFETIME_DAYS;
use devspace_core::domain::variable::VariableType;
use devspace_core::domain::workspace::{ActualState, DesiredState};
use std::collections::HashSet;
use uuid::Uuid;

use super::store::FieldErrors;

pub const MAX_WORKSPACE_NAME_LENGTH: usize = 64;
pub const MAX_NAMESPACE_LENGTH: usize = 63;

#[derive(Debug, Clone)]
pub struct NewPersonalAccessToken {
    pub user_id: i64,
    pub name: String,
    pub scopes: Vec<String>,
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
}

impl NewPersonalAccessToken {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let now = Utc::now();

        if self.name.trim().is_empty() {
            errors.add("name", "can't be blank");
        }
        if self.scopes.is_empty() {
            errors.add("scopes", "can't be blank");
        }
        if self.token_digest.is_empty() {
            errors.add("token_digest", "can't be blank");
        }
        if self.expires_at <= now {
            errors.add("expires_at", "must be in the future");
        } else if self.expires_at > now + Duration::days(MAX_TOKEN_LIFETIME_DAYS) {
            errors.add(
                "expires_at",
                format!(
                    "must be within {} days of creation",
                    MAX_TOKEN_LIFETIME_DAYS
                ),
            );
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone)]
pub struct NewWorkspace {
    pub name: String,
    pub namespace: String,
    pub desired_state: DesiredState,
    pub actual_state: ActualState,
    pub project_ref: String,
    pub devfile_path: Option<String>,
    pub devfile: String,
    pub processed_devfile: String,
    pub url_prefix: String,
    pub url_query_string: String,
    pub user_id: i64,
    pub project_id: i64,
    pub cluster_agent_id: i64,
    pub personal_access_token_id: Uuid,
}

impl NewWorkspace {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.is_empty() {
            errors.add("name", "can't be blank");
        } else if self.name.len() > MAX_WORKSPACE_NAME_LENGTH {
            errors.add(
                "name",
                format!(
                    "is too long (maximum is {} characters)",
                    MAX_WORKSPACE_NAME_LENGTH
                ),
            );
        }

        if self.namespace.is_empty() {
            errors.add("namespace", "can't be blank");
        } else if self.namespace.len() > MAX_NAMESPACE_LENGTH {
            errors.add(
                "namespace",
                format!(
                    "is too long (maximum is {} characters)",
                    MAX_NAMESPACE_LENGTH
                ),
            );
        } else if !is_dns_label(&self.namespace) {
            errors.add("namespace", "must be a valid DNS-1123 label");
        }

        if self.project_ref.trim().is_empty() {
            errors.add("project_ref", "can't be blank");
        }
        if self.processed_devfile.is_empty() {
            errors.add("processed_devfile", "can't be blank");
        }
        if self.actual_state != ActualState::CreationRequested {
            errors.add("actual_state", "must be CreationRequested on creation");
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone)]
pub struct NewWorkspaceVariable {
    pub workspace_id: Uuid,
    pub key: String,
    pub value: String,
    pub variable_type: VariableType,
    pub user_provided: bool,
}

/// Validates a batch the way it is written: as one set
///
/// A key may appear once per variable type. Environment keys must not
/// contain `=` or whitespace.
pub fn validate_variables(variables: &[NewWorkspaceVariable]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut seen = HashSet::new();

    for variable in variables {
        if variable.key.is_empty() {
            errors.add("key", "can't be blank");
            continue;
        }
        if variable.variable_type == VariableType::Environment
            && variable
                .key
                .chars()
                .any(|c| c == '=' || c.is_whitespace())
        {
            errors.add("key", format!("'{}' is not a valid variable name", variable.key));
        }
        if !seen.insert((variable.key.as_str(), variable.variable_type)) {
            errors.add("key", format!("'{}' has already been taken", variable.key));
        }
    }

    errors.into_result()
}

#[derive(Debug, Clone)]
pub struct NewAgentState {
    pub workspace_id: Uuid,
    pub project_id: i64,
    pub desired_config: serde_json::Value,
}

impl NewAgentState {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        match self.desired_config.as_array() {
            None => errors.add("desired_config", "must be an array of resources"),
            Some(resources) if resources.is_empty() => {
                errors.add("desired_config", "can't be blank")
            }
            Some(resources) => {
                for (index, resource) in resources.iter().enumerate() {
                    if resource.get("kind").and_then(|k| k.as_str()).is_none() {
                        errors.add("desired_config", format!("resource {} has no kind", index));
                    }
                    if resource
                        .pointer("/metadata/name")
                        .and_then(|n| n.as_str())
                        .is_none()
                    {
                        errors.add(
                            "desired_config",
                            format!("resource {} has no metadata.name", index),
                        );
                    }
                }
            }
        }

        errors.into_result()
    }
}

/// Lowercase alphanumerics and `-`, starting and ending alphanumeric
pub fn is_dns_label(value: &str) -> bool {
    let valid_chars = value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

    valid_chars
        && value.len() <= MAX_NAMESPACE_LENGTH
        && value.chars().next().is_some_and(alnum)
        && value.chars().last().is_some_and(alnum)
}
