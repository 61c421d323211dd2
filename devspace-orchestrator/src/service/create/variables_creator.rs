use devspace_core::domain::variable::{VariableType, WorkspaceVariable};
use uuid::Uuid;

use super::CreateSettings;
use super::constants::{
    GIT_CREDENTIAL_STORE_FILE_NAME, TOKEN_FILE_NAME, WORKSPACE_LOGS_DIR, variables_file_path,
};
use super::context::Prepared;
use super::creator::record_failure;
use super::error::CreateError;
use super::scripts::GIT_CREDENTIAL_STORE_SCRIPT;
use crate::repository::records::NewWorkspaceVariable;
use crate::repository::store::CreationScope;

/// Variables the workspace needs regardless of user input, in insert order
pub fn internal_variables(
    prepared: &Prepared,
    token_secret: &str,
    settings: &CreateSettings,
) -> Vec<(String, String, VariableType)> {
    use VariableType::{Environment, File};

    let user = &prepared.params.user;
    let token_file = variables_file_path(TOKEN_FILE_NAME);
    let credential_store_file = variables_file_path(GIT_CREDENTIAL_STORE_FILE_NAME);

    let mut variables = vec![
        ("GL_WORKSPACE_LOGS_DIR", WORKSPACE_LOGS_DIR.to_string(), Environment),
        (TOKEN_FILE_NAME, token_secret.to_string(), File),
        ("GL_TOKEN_FILE_PATH", token_file.clone(), Environment),
        (
            GIT_CREDENTIAL_STORE_FILE_NAME,
            GIT_CREDENTIAL_STORE_SCRIPT.to_string(),
            File,
        ),
        ("GIT_CONFIG_COUNT", "3".to_string(), Environment),
        ("GIT_CONFIG_KEY_0", "credential.helper".to_string(), Environment),
        ("GIT_CONFIG_VALUE_0", credential_store_file, Environment),
        ("GIT_CONFIG_KEY_1", "user.name".to_string(), Environment),
        ("GIT_CONFIG_VALUE_1", user.name.clone(), Environment),
        ("GIT_CONFIG_KEY_2", "user.email".to_string(), Environment),
        ("GIT_CONFIG_VALUE_2", user.email.clone(), Environment),
    ];

    if prepared.agent_config.marketplace_enabled {
        let marketplace = &settings.marketplace;
        variables.extend([
            (
                "GL_VSCODE_EXTENSION_MARKETPLACE_SERVICE_URL",
                marketplace.service_url.clone(),
                Environment,
            ),
            (
                "GL_VSCODE_EXTENSION_MARKETPLACE_ITEM_URL",
                marketplace.item_url.clone(),
                Environment,
            ),
            (
                "GL_VSCODE_EXTENSION_MARKETPLACE_RESOURCE_URL_TEMPLATE",
                marketplace.resource_url_template.clone(),
                Environment,
            ),
        ]);
    }

    variables.extend([
        (
            "GL_WORKSPACE_DOMAIN_TEMPLATE",
            format!(
                "${{PORT}}-{}.{}",
                prepared.workspace_name, prepared.agent_config.dns_zone
            ),
            Environment,
        ),
        (
            "GITLAB_WORKFLOW_INSTANCE_URL",
            prepared.options.instance_url.trim_end_matches('/').to_string(),
            Environment,
        ),
        ("GITLAB_WORKFLOW_TOKEN_FILE", token_file, Environment),
    ]);

    variables
        .into_iter()
        .map(|(key, value, variable_type)| (key.to_string(), value, variable_type))
        .collect()
}

/// Inserts internal variables followed by the user's, in one batch
pub async fn create(
    scope: &mut dyn CreationScope,
    prepared: &Prepared,
    workspace_id: Uuid,
    token_secret: &str,
    settings: &CreateSettings,
) -> Result<Vec<WorkspaceVariable>, CreateError> {
    let internal = internal_variables(prepared, token_secret, settings)
        .into_iter()
        .map(|(key, value, variable_type)| NewWorkspaceVariable {
            workspace_id,
            key,
            value,
            variable_type,
            user_provided: false,
        });
    let user = prepared
        .params
        .variables
        .iter()
        .map(|input| NewWorkspaceVariable {
            workspace_id,
            key: input.key.clone(),
            value: input.value.clone(),
            variable_type: input.variable_type,
            user_provided: true,
        });

    scope
        .create_variables(internal.chain(user).collect())
        .await
        .map_err(|e| record_failure(e, |errors| CreateError::VariablesCreateFailed { errors }))
}
