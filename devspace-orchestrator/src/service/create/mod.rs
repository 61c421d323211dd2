//! Workspace creation pipeline
//!
//! authorize -> identify -> load devfile -> validate -> mutate -> persist,
//! then observe and map to the response envelope. Each stage consumes the
//! previous stage's value; the first error short-circuits the rest.

pub mod authorizer;
pub mod constants;
pub mod context;
pub mod creator;
pub mod desired_config;
pub mod desired_config_creator;
pub mod devfile_loader;
pub mod error;
pub mod identity;
pub mod internal_poststart_commands_inserter;
pub mod main_component_updater;
pub mod observers;
pub mod personal_access_token_creator;
pub mod response;
pub mod scripts;
pub mod tools_injector_component_inserter;
pub mod variables_creator;
pub mod volume_component_inserter;
pub mod volume_definer;
pub mod workspace_creator;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use devspace_core::dto::workspace::CreateWorkspaceResponse;
use tracing::{info, warn};

use crate::repository::blob::BlobStore;
use crate::repository::store::{AgentConfigs, AgentMappings, WorkspaceStore};
use crate::service::devfile_validator::DevfileValidator;
use crate::service::feature_flags::{DESIRED_CONFIG_SNAPSHOT, FeatureFlags, SHALLOW_CLONE_PROJECT};
use crate::service::usage_events::UsageEvents;

pub use context::{CreateParams, Created, Diagnostics};
pub use error::{AuthorizationFailure, CreateError};
pub use identity::{NameGenerator, RandomNameGenerator};

use context::{Loaded, ProvisioningOptions, Validated};

/// Extension marketplace the editor is pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceUrls {
    pub service_url: String,
    pub item_url: String,
    pub resource_url_template: String,
}

impl Default for MarketplaceUrls {
    fn default() -> Self {
        Self {
            service_url: "https://open-vsx.org/vscode/gallery".to_string(),
            item_url: "https://open-vsx.org/vscode/item".to_string(),
            resource_url_template:
                "https://open-vsx.org/vscode/unpkg/{publisher}/{name}/{version}/{path}".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateSettings {
    /// Devfile used when the request names no path
    pub default_devfile: String,

    /// Base URL projects are cloned from
    pub instance_url: String,

    pub marketplace: MarketplaceUrls,
}

/// Collaborators the pipeline runs against
#[derive(Clone)]
pub struct CreateDependencies {
    pub mappings: Arc<dyn AgentMappings>,
    pub agent_configs: Arc<dyn AgentConfigs>,
    pub blobs: Arc<dyn BlobStore>,
    pub validator: Arc<dyn DevfileValidator>,
    pub feature_flags: Arc<dyn FeatureFlags>,
    pub usage_events: Arc<dyn UsageEvents>,
    pub store: Arc<dyn WorkspaceStore>,
    pub names: Arc<dyn NameGenerator>,
    pub settings: CreateSettings,
}

/// Runs the pipeline for an already resolved request
pub async fn create_workspace(
    deps: &CreateDependencies,
    params: CreateParams,
) -> CreateWorkspaceResponse {
    let mut diagnostics = Diagnostics::from_params(&params);
    info!(
        user_id = params.user.id,
        project_id = params.project.id,
        cluster_agent_id = params.agent.id,
        "Creating workspace"
    );

    let result = run(deps, params, &mut diagnostics).await;

    match &result {
        Ok(created) => {
            info!(workspace = %created.workspace.name, "Workspace created");
            observers::on_success(deps.usage_events.as_ref(), created);
        }
        Err(error) => {
            warn!(
                error_type = error.kind(),
                project_id = diagnostics.project_id,
                "Workspace creation failed: {}",
                error
            );
            observers::on_failure(deps.usage_events.as_ref(), &diagnostics, error);
        }
    }

    response::to_response(result, &diagnostics)
}

async fn run(
    deps: &CreateDependencies,
    params: CreateParams,
    diagnostics: &mut Diagnostics,
) -> Result<Created, CreateError> {
    let params = authorizer::authorize(deps.mappings.as_ref(), params).await?;
    let identified =
        identity::identify(deps.agent_configs.as_ref(), deps.names.as_ref(), params).await?;
    diagnostics.record_identity(&identified);

    let loaded = devfile_loader::load(
        deps.blobs.as_ref(),
        &deps.settings.default_devfile,
        identified,
    )
    .await?;

    let project = &loaded.params.project;
    let options = ProvisioningOptions {
        instance_url: format!("{}/", deps.settings.instance_url.trim_end_matches('/')),
        shallow_clone: deps.feature_flags.is_enabled(SHALLOW_CLONE_PROJECT, project),
    };
    let snapshot_enabled = deps
        .feature_flags
        .is_enabled(DESIRED_CONFIG_SNAPSHOT, project);

    let prepared = validate(deps.validator.as_ref(), loaded)
        .map(|validated| volume_definer::define(validated, options))
        .map(tools_injector_component_inserter::insert)
        .map(main_component_updater::update)
        .map(internal_poststart_commands_inserter::insert)
        .map(volume_component_inserter::insert)?;

    creator::create(
        deps.store.as_ref(),
        &deps.settings,
        snapshot_enabled,
        prepared,
    )
    .await
}

fn validate(validator: &dyn DevfileValidator, loaded: Loaded) -> Result<Validated, CreateError> {
    let processed_devfile = validator
        .validate(&loaded.devfile_yaml)
        .map_err(|errors| CreateError::DevfileValidationFailed { errors })?;
    Ok(Validated::new(loaded, processed_devfile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBlobStore, MemoryStore};
    use crate::service::create::test_support::{
        self, PanickingUsageEvents, RecordingUsageEvents, USER_DEVFILE,
    };
    use crate::service::feature_flags::StaticFeatureFlags;
    use devspace_core::domain::mapping::NamespaceMapping;
    use devspace_core::domain::variable::VariableType;
    use devspace_core::dto::workspace::{ErrorReason, VariableInput};

    struct Harness {
        store: MemoryStore,
        blobs: Arc<MemoryBlobStore>,
        events: Arc<RecordingUsageEvents>,
        deps: CreateDependencies,
    }

    fn harness_with(flags: StaticFeatureFlags) -> Harness {
        let store = test_support::seeded_store();
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.insert(3, "main", ".devfile.yaml", USER_DEVFILE);
        let events = Arc::new(RecordingUsageEvents::default());
        let deps = test_support::dependencies(&store, blobs.clone(), events.clone(), flags);
        Harness {
            store,
            blobs,
            events,
            deps,
        }
    }

    fn harness() -> Harness {
        harness_with(StaticFeatureFlags::default().enable(DESIRED_CONFIG_SNAPSHOT))
    }

    fn with_devfile(path: &str) -> CreateParams {
        let mut params = test_support::params();
        params.devfile_path = Some(path.to_string());
        params
    }

    fn error_of(response: CreateWorkspaceResponse) -> (ErrorReason, String, serde_json::Value) {
        match response {
            CreateWorkspaceResponse::Error {
                reason,
                details,
                context,
            } => (reason, details, context),
            other => panic!("expected an error response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_happy_path_with_unique_namespace() {
        let h = harness();

        let response = create_workspace(&h.deps, with_devfile(".devfile.yaml")).await;

        let CreateWorkspaceResponse::Success { payload } = response else {
            panic!("expected success, got {response:?}");
        };
        let summary = payload.workspace;
        assert_eq!(summary.name, "workspace-1-2-abc123");
        assert_eq!(summary.namespace, "gl-rd-ns-1-2-abc123");
        assert_eq!(
            summary.url,
            "https://60001-workspace-1-2-abc123.workspaces.example.dev/?folder=%2Fprojects%2Fdemo"
        );

        assert_eq!(h.store.workspaces().len(), 1);
        assert_eq!(h.store.tokens().len(), 1);
        assert_eq!(h.store.agent_states().len(), 1);

        let workspace = &h.store.workspaces()[0];
        assert_eq!(workspace.devfile, USER_DEVFILE);
        assert_eq!(workspace.personal_access_token_id, h.store.tokens()[0].id);
        assert!(workspace.processed_devfile.contains("gl-clone-project-command"));

        let recorded = h.events.events();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].label, "succeed");
    }

    #[tokio::test]
    async fn test_happy_path_with_shared_namespace() {
        let h = harness();
        let mut config = test_support::agent_config();
        config.shared_namespace = "team-workspaces".to_string();
        h.store.add_agent_config(config);

        let response = create_workspace(&h.deps, test_support::params()).await;

        let CreateWorkspaceResponse::Success { payload } = response else {
            panic!("expected success, got {response:?}");
        };
        assert_eq!(payload.workspace.name, "workspace-1-2-abc123");
        assert_eq!(payload.workspace.namespace, "team-workspaces");
    }

    #[tokio::test]
    async fn test_default_devfile_never_reads_repository() {
        let h = harness();

        let response = create_workspace(&h.deps, test_support::params()).await;

        assert!(matches!(response, CreateWorkspaceResponse::Success { .. }));
        assert_eq!(h.blobs.read_count(), 0);
        assert_eq!(h.store.workspaces()[0].devfile, test_support::DEFAULT_DEVFILE);
    }

    #[tokio::test]
    async fn test_missing_devfile_fails_without_records() {
        let h = harness();

        let response = create_workspace(&h.deps, with_devfile("missing.yaml")).await;

        let (reason, details, context) = error_of(response);
        assert_eq!(reason, ErrorReason::BadRequest);
        assert_eq!(
            details,
            "Devfile path 'missing.yaml' at ref 'main' does not exist in the project repository"
        );
        assert_eq!(context["workspace_name"], "workspace-1-2-abc123");
        assert!(h.store.workspaces().is_empty());
        assert_eq!(h.events.events()[0].properties["error_type"], "WorkspaceCreateDevfileLoadFailed");
    }

    #[tokio::test]
    async fn test_unmapped_agent() {
        let store = MemoryStore::new();
        store.add_agent(test_support::agent());
        store.add_agent_config(test_support::agent_config());
        let blobs = Arc::new(MemoryBlobStore::new());
        let events = Arc::new(RecordingUsageEvents::default());
        let deps = test_support::dependencies(&store, blobs, events, StaticFeatureFlags::default());

        let (reason, details, context) =
            error_of(create_workspace(&deps, test_support::params()).await);

        assert_eq!(reason, ErrorReason::BadRequest);
        assert!(details.contains("is not mapped in organization"));
        assert!(details.contains("it is not mapped to an ancestor namespace"));
        assert!(context.get("workspace_name").is_none());
    }

    #[tokio::test]
    async fn test_namespace_mapping_outside_agent_hierarchy() {
        let store = MemoryStore::new();
        store.add_agent(test_support::agent());
        store.add_agent_config(test_support::agent_config());
        store.add_namespace_mapping(NamespaceMapping {
            namespace_id: 30,
            cluster_agent_id: 1,
        });
        let deps = test_support::dependencies(
            &store,
            Arc::new(MemoryBlobStore::new()),
            Arc::new(RecordingUsageEvents::default()),
            StaticFeatureFlags::default(),
        );

        let (_, details, _) = error_of(create_workspace(&deps, test_support::params()).await);

        assert!(!details.contains("is not mapped in organization"));
    }

    #[tokio::test]
    async fn test_invalid_devfile_collects_errors() {
        let h = harness();
        h.blobs.insert(
            3,
            "main",
            "bad.yaml",
            "schemaVersion: 2.1.0\ncomponents:\n  - name: gl-thing\n    container:\n      image: x\n",
        );

        let (reason, _, context) = error_of(create_workspace(&h.deps, with_devfile("bad.yaml")).await);

        assert_eq!(reason, ErrorReason::BadRequest);
        assert!(context["errors"].as_array().map(|e| e.len() > 1).unwrap_or(false));
        assert!(h.store.workspaces().is_empty());
    }

    #[tokio::test]
    async fn test_variables_failure_rolls_back_everything() {
        let h = harness();
        let mut params = test_support::params();
        params.variables = vec![VariableInput {
            key: String::new(),
            value: "v".to_string(),
            variable_type: VariableType::Environment,
        }];

        let (reason, details, context) = error_of(create_workspace(&h.deps, params).await);

        assert_eq!(reason, ErrorReason::BadRequest);
        assert!(details.starts_with("Workspace variables creation failed"));
        assert_eq!(context["errors"]["key"][0], "can't be blank");
        assert!(h.store.tokens().is_empty());
        assert!(h.store.workspaces().is_empty());
        assert!(h.store.variables().is_empty());
        assert!(h.store.agent_states().is_empty());
        assert_eq!(
            h.events.events()[0].properties["error_type"],
            "WorkspaceVariablesModelCreateFailed"
        );
    }

    #[tokio::test]
    async fn test_duplicate_workspace_name_is_a_workspace_failure() {
        // the fixed name generator repeats the same suffix
        let h = harness();
        assert!(matches!(
            create_workspace(&h.deps, test_support::params()).await,
            CreateWorkspaceResponse::Success { .. }
        ));

        let (_, details, context) = error_of(create_workspace(&h.deps, test_support::params()).await);

        assert!(details.starts_with("Workspace creation failed"));
        assert_eq!(context["errors"]["name"][0], "has already been taken");
        assert_eq!(h.store.workspaces().len(), 1);
        assert_eq!(h.store.tokens().len(), 1);
    }

    #[tokio::test]
    async fn test_user_variables_follow_internal_ones() {
        let h = harness();
        let mut params = test_support::params();
        params.variables = vec![VariableInput {
            key: "API_KEY".to_string(),
            value: "secret".to_string(),
            variable_type: VariableType::Environment,
        }];

        let response = create_workspace(&h.deps, params).await;
        assert!(matches!(response, CreateWorkspaceResponse::Success { .. }));

        let variables = h.store.variables();
        let last = variables.last().unwrap();
        assert_eq!(last.key, "API_KEY");
        assert!(last.user_provided);
        assert!(
            variables[..variables.len() - 1]
                .iter()
                .all(|v| !v.user_provided)
        );
        let token = variables.iter().find(|v| v.key == "gl_token").unwrap();
        assert_eq!(
            personal_access_token_creator::digest(&token.value),
            h.store.tokens()[0].token_digest
        );
    }

    #[tokio::test]
    async fn test_snapshot_flag_disabled_skips_snapshot() {
        let h = harness_with(StaticFeatureFlags::default());

        let response = create_workspace(&h.deps, test_support::params()).await;

        assert!(matches!(response, CreateWorkspaceResponse::Success { .. }));
        assert_eq!(h.store.workspaces().len(), 1);
        assert!(h.store.agent_states().is_empty());
    }

    #[tokio::test]
    async fn test_shallow_clone_flag() {
        let h = harness_with(StaticFeatureFlags::default().enable(SHALLOW_CLONE_PROJECT));

        create_workspace(&h.deps, test_support::params()).await;

        let processed = &h.store.workspaces()[0].processed_devfile;
        assert!(processed.contains("gl-clone-unshallow-command"));
        assert!(processed.contains("--depth 10"));
    }

    #[tokio::test]
    async fn test_panicking_usage_sink_does_not_change_outcome() {
        let store = test_support::seeded_store();
        let mut deps = test_support::dependencies(
            &store,
            Arc::new(MemoryBlobStore::new()),
            Arc::new(RecordingUsageEvents::default()),
            StaticFeatureFlags::default(),
        );
        deps.usage_events = Arc::new(PanickingUsageEvents);

        let response = create_workspace(&deps, test_support::params()).await;

        assert!(matches!(response, CreateWorkspaceResponse::Success { .. }));
        assert_eq!(store.workspaces().len(), 1);
    }
}
