use devspace_core::domain::devfile::{ApplyCommand, Command, Component, Container, EnvVar};

use super::constants::{
    TOOLS_DIR_ENV_VAR, TOOLS_INJECTOR_COMMAND_ID, TOOLS_INJECTOR_COMPONENT_NAME,
    TOOLS_INJECTOR_CPU_LIMIT, TOOLS_INJECTOR_CPU_REQUEST, TOOLS_INJECTOR_MEMORY_LIMIT,
    TOOLS_INJECTOR_MEMORY_REQUEST,
};
use super::context::Prepared;

/// Adds the init component that copies editor tooling into the data volume
pub fn insert(mut prepared: Prepared) -> Prepared {
    let component = Component {
        name: TOOLS_INJECTOR_COMPONENT_NAME.to_string(),
        container: Some(Container {
            image: prepared.agent_config.tools_injector_image.clone(),
            env: vec![EnvVar::new(TOOLS_DIR_ENV_VAR, &prepared.volume.tools_dir)],
            memory_limit: Some(TOOLS_INJECTOR_MEMORY_LIMIT.to_string()),
            memory_request: Some(TOOLS_INJECTOR_MEMORY_REQUEST.to_string()),
            cpu_limit: Some(TOOLS_INJECTOR_CPU_LIMIT.to_string()),
            cpu_request: Some(TOOLS_INJECTOR_CPU_REQUEST.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };

    let devfile = &mut prepared.processed_devfile;
    devfile.components.push(component);
    devfile.commands.push(Command {
        id: TOOLS_INJECTOR_COMMAND_ID.to_string(),
        apply: Some(ApplyCommand {
            component: TOOLS_INJECTOR_COMPONENT_NAME.to_string(),
            ..Default::default()
        }),
        ..Default::default()
    });
    devfile
        .events
        .pre_start
        .push(TOOLS_INJECTOR_COMMAND_ID.to_string());

    prepared
}
