use devspace_core::domain::devfile::{Command, ExecCommand};

use super::constants::{
    CLONE_PROJECT_COMMAND_ID, CLONE_UNSHALLOW_COMMAND_ID, INIT_TOOLS_COMMAND_ID,
    INTERNAL_BLOCKING_COMMAND_LABEL, PROJECT_CLONING_SUCCESSFUL_FILE_NAME,
    SLEEP_UNTIL_RUNNING_COMMAND_ID, START_SSHD_COMMAND_ID,
    WORKSPACE_RECONCILED_ACTUAL_STATE_FILE_NAME, variables_file_path,
};
use super::context::Prepared;
use super::scripts;

/// Prepends the internal postStart commands, ahead of any user commands
pub fn insert(mut prepared: Prepared) -> Prepared {
    let Some(main_component) = prepared
        .processed_devfile
        .main_component()
        .map(|component| component.name.clone())
    else {
        return prepared;
    };

    let project = &prepared.params.project;
    let mount_path = &prepared.volume.data_volume_mount_path;
    let clone_dir = format!("{}/{}", mount_path, project.path);
    let project_url = format!("{}{}.git", prepared.options.instance_url, project.full_path);
    let cloning_successful_file =
        format!("{}/{}", mount_path, PROJECT_CLONING_SUCCESSFUL_FILE_NAME);

    let exec = |id: &str, command_line: String, blocking: bool| Command {
        id: id.to_string(),
        exec: Some(ExecCommand {
            command_line,
            component: main_component.clone(),
            label: blocking.then(|| INTERNAL_BLOCKING_COMMAND_LABEL.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };

    let mut commands = vec![exec(
        CLONE_PROJECT_COMMAND_ID,
        scripts::clone_project_script(
            &project_url,
            &prepared.params.project_ref,
            &clone_dir,
            &cloning_successful_file,
            prepared.options.shallow_clone,
        ),
        true,
    )];
    if prepared.options.shallow_clone {
        commands.push(exec(
            CLONE_UNSHALLOW_COMMAND_ID,
            scripts::clone_unshallow_script(&clone_dir, &cloning_successful_file),
            true,
        ));
    }
    commands.push(exec(
        START_SSHD_COMMAND_ID,
        scripts::START_SSHD_SCRIPT.to_string(),
        true,
    ));
    commands.push(exec(
        INIT_TOOLS_COMMAND_ID,
        scripts::INIT_TOOLS_SCRIPT.to_string(),
        true,
    ));
    commands.push(exec(
        SLEEP_UNTIL_RUNNING_COMMAND_ID,
        scripts::sleep_until_running_script(&variables_file_path(
            WORKSPACE_RECONCILED_ACTUAL_STATE_FILE_NAME,
        )),
        false,
    ));

    let devfile = &mut prepared.processed_devfile;
    let mut post_start: Vec<String> = commands.iter().map(|c| c.id.clone()).collect();
    post_start.append(&mut devfile.events.post_start);
    devfile.events.post_start = post_start;
    devfile.commands.extend(commands);

    prepared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::create::test_support;

    fn post_start(shallow: bool) -> Vec<String> {
        insert(test_support::prepared(shallow))
            .processed_devfile
            .events
            .post_start
    }

    #[test]
    fn test_internal_commands_precede_user_commands() {
        assert_eq!(
            post_start(false),
            vec![
                "gl-clone-project-command",
                "gl-start-sshd-command",
                "gl-init-tools-command",
                "gl-sleep-until-container-is-running-command",
                "install-dependencies",
            ]
        );
    }

    #[test]
    fn test_shallow_clone_adds_unshallow() {
        let ids = post_start(true);
        assert_eq!(ids[0], "gl-clone-project-command");
        assert_eq!(ids[1], "gl-clone-unshallow-command");
        assert_eq!(ids.last().map(String::as_str), Some("install-dependencies"));
    }

    #[test]
    fn test_clone_command() {
        let prepared = insert(test_support::prepared(true));
        let exec = prepared
            .processed_devfile
            .command("gl-clone-project-command")
            .and_then(|c| c.exec.clone())
            .unwrap();

        assert_eq!(exec.component, "tooling-container");
        assert_eq!(exec.label.as_deref(), Some("gl-internal-blocking"));
        assert!(exec.command_line.contains(
            "git clone --branch main https://gitlab.example.com/group/demo.git /projects/demo --depth 10"
        ));

        let sleep = prepared
            .processed_devfile
            .command("gl-sleep-until-container-is-running-command")
            .and_then(|c| c.exec.clone())
            .unwrap();
        assert!(sleep.label.is_none());
        assert!(
            sleep
                .command_line
                .contains("/.workspace-data/variables/file/gl_workspace_reconciled_actual_state.txt")
        );
    }
}
