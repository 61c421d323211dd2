use devspace_core::domain::devfile::{Endpoint, EnvVar};

use super::constants::{
    EDITOR_ENDPOINT_NAME, EDITOR_LOG_LEVEL, SSH_ENDPOINT_NAME, TOOLS_DIR_ENV_VAR,
    WORKSPACE_EDITOR_PORT, WORKSPACE_SSH_PORT,
};
use super::context::Prepared;
use super::scripts::MAIN_COMPONENT_UPDATER_CONTAINER_ARGS;

/// Wires the editor into the main component
///
/// The container command is replaced outright: the editor and the other
/// internal processes are started by postStart commands, so the container
/// itself only has to stay alive.
pub fn update(mut prepared: Prepared) -> Prepared {
    let tools_dir = prepared.volume.tools_dir.clone();
    let marketplace_enabled = prepared.agent_config.marketplace_enabled;

    let Some(container) = prepared
        .processed_devfile
        .main_component_mut()
        .and_then(|component| component.container.as_mut())
    else {
        return prepared;
    };

    container.env.extend([
        EnvVar::new(TOOLS_DIR_ENV_VAR, tools_dir),
        EnvVar::new("GL_VSCODE_LOG_LEVEL", EDITOR_LOG_LEVEL),
        EnvVar::new("GL_VSCODE_PORT", WORKSPACE_EDITOR_PORT.to_string()),
        EnvVar::new("GL_SSH_PORT", WORKSPACE_SSH_PORT.to_string()),
        EnvVar::new(
            "GL_VSCODE_ENABLE_MARKETPLACE",
            marketplace_enabled.to_string(),
        ),
    ]);

    container.endpoints.push(Endpoint {
        name: EDITOR_ENDPOINT_NAME.to_string(),
        target_port: WORKSPACE_EDITOR_PORT,
        exposure: Some("public".to_string()),
        secure: Some(true),
        protocol: Some("https".to_string()),
        ..Default::default()
    });
    container.endpoints.push(Endpoint {
        name: SSH_ENDPOINT_NAME.to_string(),
        target_port: WORKSPACE_SSH_PORT,
        exposure: Some("internal".to_string()),
        secure: Some(true),
        ..Default::default()
    });

    container.command = vec!["/bin/sh".to_string(), "-c".to_string()];
    container.args = vec![MAIN_COMPONENT_UPDATER_CONTAINER_ARGS.to_string()];

    prepared
}
