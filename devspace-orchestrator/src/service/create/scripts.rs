//! Shell scripts injected into workspaces
//!
//! Templates use `%{name}` placeholders so they do not collide with shell
//! `${VAR}` expansion.

use super::constants::{
    RUN_INTERNAL_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME,
    RUN_NON_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME, WORKSPACE_SCRIPTS_VOLUME_PATH,
};

/// Keeps the main container alive; the editor is started from postStart
pub const MAIN_COMPONENT_UPDATER_CONTAINER_ARGS: &str = r#"echo "$(date -Iseconds): ----------------------------------------"
echo "$(date -Iseconds): Container started, waiting for postStart commands"
tail -f /dev/null
"#;

const CLONE_PROJECT_SCRIPT: &str = r#"if [ -f %{project_cloning_successful_file} ];
then
    echo "$(date -Iseconds): Project cloning was already successful"
    exit 0
fi

if [ -d %{clone_dir} ];
then
    echo "$(date -Iseconds): Removing unsuccessfully cloned project directory"
    rm -rf %{clone_dir}
fi

echo "$(date -Iseconds): Cloning project"
git clone --branch %{project_ref} %{project_url} %{clone_dir}%{clone_depth_option}
exit_code=$?

if [ "${exit_code}" -eq 0 ];
then
    echo "$(date -Iseconds): Project cloning successful"
    touch %{project_cloning_successful_file}
    echo "$(date -Iseconds): Updated file to indicate successful project cloning"
else
    echo "$(date -Iseconds): Project cloning failed with exit code: ${exit_code}" >&2
fi

exit "${exit_code}"
"#;

const CLONE_UNSHALLOW_SCRIPT: &str = r#"if [ ! -f %{project_cloning_successful_file} ];
then
    echo "$(date -Iseconds): Project was not cloned successfully, skipping unshallow"
    exit 0
fi

cd %{clone_dir} || exit 1

if [ "$(git rev-parse --is-shallow-repository)" = "true" ];
then
    echo "$(date -Iseconds): Unshallowing project clone"
    git fetch --unshallow
else
    echo "$(date -Iseconds): Project clone is not shallow"
fi
"#;

pub const START_SSHD_SCRIPT: &str = r#"sshd_path=$(which sshd)
if [ -x "${sshd_path}" ];
then
    echo "$(date -Iseconds): Starting ${sshd_path} on port ${GL_SSH_PORT} with output written to ${GL_WORKSPACE_LOGS_DIR}/start-sshd.log"
    mkdir -p /tmp/ssh
    if [ ! -f /tmp/ssh/ssh_host_rsa_key ];
    then
        ssh-keygen -q -t rsa -N "" -f /tmp/ssh/ssh_host_rsa_key
    fi
    nohup "${sshd_path}" -D -p "${GL_SSH_PORT}" -h /tmp/ssh/ssh_host_rsa_key >> "${GL_WORKSPACE_LOGS_DIR}/start-sshd.log" 2>&1 &
else
    echo "$(date -Iseconds): 'sshd' not found in path. Not starting SSH server." >&2
fi
"#;

pub const INIT_TOOLS_SCRIPT: &str = r#"if [ -z "${GL_TOOLS_DIR}" ];
then
    echo "$(date -Iseconds): \$GL_TOOLS_DIR is not set" >&2
    exit 1
fi

echo "$(date -Iseconds): Running ${GL_TOOLS_DIR}/init_tools.sh with output written to ${GL_WORKSPACE_LOGS_DIR}/init-tools.log"
nohup "${GL_TOOLS_DIR}/init_tools.sh" >> "${GL_WORKSPACE_LOGS_DIR}/init-tools.log" 2>&1 &
"#;

const SLEEP_UNTIL_RUNNING_SCRIPT: &str = r#"echo "$(date -Iseconds): Sleeping until workspace is running..."
time_to_sleep=5
status_file="%{workspace_reconciled_actual_state_file_path}"
while [ "$(cat "${status_file}" 2>/dev/null)" != "Running" ];
do
    echo "$(date -Iseconds): Workspace state is '$(cat "${status_file}" 2>/dev/null)' from status file '${status_file}'. Sleeping for ${time_to_sleep} seconds..."
    sleep ${time_to_sleep}
done
echo "$(date -Iseconds): Workspace state is now 'Running', continuing..."
"#;

pub const GIT_CREDENTIAL_STORE_SCRIPT: &str = r#"#!/bin/sh
# Read-only store: exit cleanly when git attempts a store or erase action
if [ "$1" != "get" ];
then
    exit 0
fi

if [ -z "${GL_TOKEN_FILE_PATH}" ];
then
    echo "We could not find the GL_TOKEN_FILE_PATH variable"
    exit 1
fi
password=$(cat "${GL_TOKEN_FILE_PATH}")

# The username is derived from the "user.email" configuration item. Ensure it is set.
echo "username=does-not-matter"
echo "password=${password}"
exit 0
"#;

const KUBERNETES_POSTSTART_HOOK_COMMAND: &str = r#"#!/bin/sh

mkdir -p "${GL_WORKSPACE_LOGS_DIR}"
ln -sf "${GL_WORKSPACE_LOGS_DIR}" /tmp

{
    echo "$(date -Iseconds): ----------------------------------------"
    echo "$(date -Iseconds): Running poststart commands for workspace..."

    echo "$(date -Iseconds): ----------------------------------------"
    echo "$(date -Iseconds): Running internal blocking poststart commands script..."
} >> "${GL_WORKSPACE_LOGS_DIR}/poststart-stdout.log"

"%{run_internal_blocking_poststart_commands_script_file_path}" 1>>"${GL_WORKSPACE_LOGS_DIR}/poststart-stdout.log" 2>>"${GL_WORKSPACE_LOGS_DIR}/poststart-stderr.log"

{
    echo "$(date -Iseconds): ----------------------------------------"
    echo "$(date -Iseconds): Running non-blocking poststart commands script..."
} >> "${GL_WORKSPACE_LOGS_DIR}/poststart-stdout.log"

"%{run_non_blocking_poststart_commands_script_file_path}" 1>>"${GL_WORKSPACE_LOGS_DIR}/poststart-stdout.log" 2>>"${GL_WORKSPACE_LOGS_DIR}/poststart-stderr.log" &
"#;

fn render(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |script, (name, value)| {
            script.replace(&format!("%{{{}}}", name), value)
        })
}

/// Quotes a value for POSIX sh unless it only contains safe characters
pub fn shell_escape(value: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c);
    if !value.is_empty() && value.chars().all(safe) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

pub fn clone_project_script(
    project_url: &str,
    project_ref: &str,
    clone_dir: &str,
    project_cloning_successful_file: &str,
    shallow: bool,
) -> String {
    let depth = if shallow {
        format!(" {}", super::constants::CLONE_DEPTH_OPTION)
    } else {
        String::new()
    };
    render(
        CLONE_PROJECT_SCRIPT,
        &[
            (
                "project_cloning_successful_file",
                &shell_escape(project_cloning_successful_file),
            ),
            ("clone_dir", &shell_escape(clone_dir)),
            ("project_ref", &shell_escape(project_ref)),
            ("project_url", &shell_escape(project_url)),
            ("clone_depth_option", &depth),
        ],
    )
}

pub fn clone_unshallow_script(clone_dir: &str, project_cloning_successful_file: &str) -> String {
    render(
        CLONE_UNSHALLOW_SCRIPT,
        &[
            (
                "project_cloning_successful_file",
                &shell_escape(project_cloning_successful_file),
            ),
            ("clone_dir", &shell_escape(clone_dir)),
        ],
    )
}

pub fn sleep_until_running_script(reconciled_actual_state_file_path: &str) -> String {
    render(
        SLEEP_UNTIL_RUNNING_SCRIPT,
        &[(
            "workspace_reconciled_actual_state_file_path",
            reconciled_actual_state_file_path,
        )],
    )
}

pub fn kubernetes_poststart_hook_command() -> String {
    let blocking = format!(
        "{}/{}",
        WORKSPACE_SCRIPTS_VOLUME_PATH, RUN_INTERNAL_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME
    );
    let non_blocking = format!(
        "{}/{}",
        WORKSPACE_SCRIPTS_VOLUME_PATH, RUN_NON_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME
    );
    render(
        KUBERNETES_POSTSTART_HOOK_COMMAND,
        &[
            (
                "run_internal_blocking_poststart_commands_script_file_path",
                &blocking,
            ),
            (
                "run_non_blocking_poststart_commands_script_file_path",
                &non_blocking,
            ),
        ],
    )
}

/// Runner script that executes each mounted command script in order
pub fn poststart_commands_runner(command_ids: &[&str]) -> String {
    let mut script = String::from("#!/bin/sh\n");
    for id in command_ids {
        let path = format!("{}/{}", WORKSPACE_SCRIPTS_VOLUME_PATH, id);
        script.push_str("echo \"$(date -Iseconds): ----------------------------------------\"\n");
        script.push_str(&format!("echo \"$(date -Iseconds): Running {}...\"\n", path));
        script.push_str(&format!("{} || true\n", path));
        script.push_str(&format!(
            "echo \"$(date -Iseconds): Finished running {}.\"\n",
            path
        ));
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_escape() {
        assert_eq!(shell_escape("/projects/demo"), "/projects/demo");
        assert_eq!(shell_escape("feature/my branch"), "'feature/my branch'");
        assert_eq!(shell_escape("it's"), r"'it'\''s'");
        assert_eq!(shell_escape("$(rm -rf /)"), "'$(rm -rf /)'");
        assert_eq!(shell_escape(""), "''");
    }

    #[test]
    fn test_clone_script_escapes_and_depth() {
        let script = clone_project_script(
            "https://gitlab.example.com/group/demo.git",
            "main; echo pwned",
            "/projects/demo",
            "/projects/.gl_project_cloning_successful",
            true,
        );

        assert!(script.contains(
            "git clone --branch 'main; echo pwned' https://gitlab.example.com/group/demo.git /projects/demo --depth 10"
        ));
        assert!(!script.contains("%{"));

        let full = clone_project_script("u", "main", "/projects/demo", "/f", false);
        assert!(full.contains("git clone --branch main u /projects/demo\n"));
    }

    #[test]
    fn test_runner_script_lists_commands_in_order() {
        let script = poststart_commands_runner(&["a", "b"]);
        let a = script.find("/workspace-scripts/a || true").unwrap();
        let b = script.find("/workspace-scripts/b || true").unwrap();
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(a < b);
    }

    #[test]
    fn test_poststart_hook_references_runner_scripts() {
        let hook = kubernetes_poststart_hook_command();
        assert!(hook.contains("\"/workspace-scripts/gl-run-internal-blocking-poststart-commands.sh\""));
        assert!(hook.contains("/workspace-scripts/gl-run-non-blocking-poststart-commands.sh\" 1>>"));
    }
}
