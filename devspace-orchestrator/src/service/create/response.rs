use devspace_core::dto::workspace::{CreateWorkspaceResponse, CreatedWorkspace, WorkspaceSummary};
use serde_json::{Value, json};

use super::context::{Created, Diagnostics};
use super::error::CreateError;

/// Maps the pipeline outcome onto the response envelope
pub fn to_response(
    result: Result<Created, CreateError>,
    diagnostics: &Diagnostics,
) -> CreateWorkspaceResponse {
    match result {
        Ok(created) => CreateWorkspaceResponse::Success {
            payload: CreatedWorkspace {
                workspace: WorkspaceSummary::from_workspace(
                    &created.workspace,
                    &created.agent_config.dns_zone,
                ),
            },
        },
        Err(error) => CreateWorkspaceResponse::Error {
            reason: error.category(),
            details: error.to_string(),
            context: error_context(&error, diagnostics),
        },
    }
}

fn error_context(error: &CreateError, diagnostics: &Diagnostics) -> Value {
    let mut context = serde_json::to_value(diagnostics).unwrap_or_default();

    let errors = match error {
        CreateError::DevfileValidationFailed { errors } => Some(json!(errors)),
        CreateError::CredentialCreateFailed { errors }
        | CreateError::WorkspaceCreateFailed { errors }
        | CreateError::VariablesCreateFailed { errors }
        | CreateError::SnapshotCreateFailed { errors } => Some(json!(errors)),
        _ => None,
    };
    if let (Some(errors), Some(map)) = (errors, context.as_object_mut()) {
        map.insert("errors".to_string(), errors);
    }

    context
}
