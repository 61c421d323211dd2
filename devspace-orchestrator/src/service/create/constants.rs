//! Names, paths and sizes shared by the create stages

// =============================================================================
// Identity
// =============================================================================

pub const WORKSPACE_NAME_PREFIX: &str = "workspace";
pub const NAMESPACE_PREFIX: &str = "gl-rd-ns";
pub const RANDOM_SUFFIX_LENGTH: usize = 6;

// =============================================================================
// Volumes and paths
// =============================================================================

pub const WORKSPACE_DATA_VOLUME_NAME: &str = "gl-workspace-data";
pub const WORKSPACE_DATA_VOLUME_PATH: &str = "/projects";
pub const WORKSPACE_DATA_VOLUME_SIZE: &str = "50Gi";

pub const TOOLS_DIR_NAME: &str = ".gl-tools";
pub const TOOLS_DIR_ENV_VAR: &str = "GL_TOOLS_DIR";

pub const VARIABLES_VOLUME_NAME: &str = "gl-workspace-variables";
pub const VARIABLES_VOLUME_PATH: &str = "/.workspace-data/variables/file";
pub const VARIABLES_VOLUME_DEFAULT_MODE: u32 = 0o774;

pub const WORKSPACE_SCRIPTS_VOLUME_NAME: &str = "gl-workspace-scripts";
pub const WORKSPACE_SCRIPTS_VOLUME_PATH: &str = "/workspace-scripts";
pub const WORKSPACE_SCRIPTS_VOLUME_DEFAULT_MODE: u32 = 0o555;

pub const WORKSPACE_LOGS_DIR: &str = "/tmp/workspace-logs";
pub const PROJECT_CLONING_SUCCESSFUL_FILE_NAME: &str = ".gl_project_cloning_successful";
pub const WORKSPACE_RECONCILED_ACTUAL_STATE_FILE_NAME: &str =
    "gl_workspace_reconciled_actual_state.txt";

pub const TOKEN_FILE_NAME: &str = "gl_token";
pub const GIT_CREDENTIAL_STORE_FILE_NAME: &str = "gl_git_credential_store.sh";

// =============================================================================
// Components and commands
// =============================================================================

pub const TOOLS_INJECTOR_COMPONENT_NAME: &str = "gl-tools-injector";
pub const TOOLS_INJECTOR_COMMAND_ID: &str = "gl-tools-injector-command";
pub const TOOLS_INJECTOR_MEMORY_LIMIT: &str = "512Mi";
pub const TOOLS_INJECTOR_MEMORY_REQUEST: &str = "256Mi";
pub const TOOLS_INJECTOR_CPU_LIMIT: &str = "500m";
pub const TOOLS_INJECTOR_CPU_REQUEST: &str = "100m";

pub const CLONE_PROJECT_COMMAND_ID: &str = "gl-clone-project-command";
pub const CLONE_UNSHALLOW_COMMAND_ID: &str = "gl-clone-unshallow-command";
pub const START_SSHD_COMMAND_ID: &str = "gl-start-sshd-command";
pub const INIT_TOOLS_COMMAND_ID: &str = "gl-init-tools-command";
pub const SLEEP_UNTIL_RUNNING_COMMAND_ID: &str = "gl-sleep-until-container-is-running-command";

/// Label of postStart commands that must finish before user commands start
pub const INTERNAL_BLOCKING_COMMAND_LABEL: &str = "gl-internal-blocking";

pub const RUN_INTERNAL_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME: &str =
    "gl-run-internal-blocking-poststart-commands.sh";
pub const RUN_NON_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME: &str =
    "gl-run-non-blocking-poststart-commands.sh";

pub const CLONE_DEPTH_OPTION: &str = "--depth 10";

// =============================================================================
// Editor and ports
// =============================================================================

pub const WORKSPACE_EDITOR_PORT: u16 = 60001;
pub const WORKSPACE_SSH_PORT: u16 = 60022;
pub const EDITOR_ENDPOINT_NAME: &str = "editor-server";
pub const SSH_ENDPOINT_NAME: &str = "ssh-server";
pub const EDITOR_LOG_LEVEL: &str = "info";

pub const RUN_AS_USER: i64 = 5001;

// =============================================================================
// Usage events
// =============================================================================

pub const USAGE_EVENT_ACTION: &str = "create_workspace_result";
pub const USAGE_EVENT_CATEGORY: &str = "RemoteDevelopment::Workspace::Create";

pub fn variables_file_path(file_name: &str) -> String {
    format!("{}/{}", VARIABLES_VOLUME_PATH, file_name)
}

pub fn tools_dir() -> String {
    format!("{}/{}", WORKSPACE_DATA_VOLUME_PATH, TOOLS_DIR_NAME)
}
