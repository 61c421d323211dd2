//! Fixtures shared by the create pipeline tests

use std::sync::{Arc, Mutex};

use chrono::Utc;
use devspace_core::domain::agent::{
    AgentConfig, ClusterAgent, ContainerResources, ResourceQuantities,
};
use devspace_core::domain::devfile::Devfile;
use devspace_core::domain::mapping::OrganizationMapping;
use devspace_core::domain::project::{Project, User};
use devspace_core::domain::workspace::{ActualState, DesiredState, Workspace};
use uuid::Uuid;

use super::context::{CreateParams, Prepared, ProvisioningOptions, Validated};
use super::identity::NameGenerator;
use super::{
    CreateDependencies, CreateSettings, MarketplaceUrls, internal_poststart_commands_inserter,
    main_component_updater, tools_injector_component_inserter, volume_component_inserter,
    volume_definer,
};
use crate::memory::{MemoryBlobStore, MemoryStore};
use crate::service::devfile_validator::{DevfileValidator, RestrictionsEnforcer};
use crate::service::feature_flags::StaticFeatureFlags;
use crate::service::usage_events::{UsageEvent, UsageEvents};

pub const DEFAULT_DEVFILE: &str = crate::config::BUILTIN_DEFAULT_DEVFILE;

pub const USER_DEVFILE: &str = r#"schemaVersion: 2.2.0
metadata:
  name: demo
components:
  - name: tooling-container
    attributes:
      gl/inject-editor: true
    container:
      image: registry.example.dev/node:20
      endpoints:
        - name: http-3000
          targetPort: 3000
  - name: database
    container:
      image: postgres:16
commands:
  - id: install-dependencies
    exec:
      component: tooling-container
      commandLine: npm ci
events:
  postStart:
    - install-dependencies
"#;

pub struct FixedNameGenerator(pub &'static str);

impl NameGenerator for FixedNameGenerator {
    fn random_suffix(&self) -> String {
        self.0.to_string()
    }
}

#[derive(Default)]
pub struct RecordingUsageEvents {
    events: Mutex<Vec<UsageEvent>>,
}

impl RecordingUsageEvents {
    pub fn events(&self) -> Vec<UsageEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl UsageEvents for RecordingUsageEvents {
    fn track(&self, event: &UsageEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub struct PanickingUsageEvents;

impl UsageEvents for PanickingUsageEvents {
    fn track(&self, _event: &UsageEvent) -> anyhow::Result<()> {
        panic!("usage sink exploded");
    }
}

pub fn user() -> User {
    User {
        id: 2,
        username: "alice".to_string(),
        name: "Alice Example".to_string(),
        email: "alice@example.com".to_string(),
    }
}

/// Project in namespace 30 under root namespace 10
pub fn project() -> Project {
    Project {
        id: 3,
        name: "Demo".to_string(),
        path: "demo".to_string(),
        full_path: "group/demo".to_string(),
        organization_id: 7,
        namespace_id: 30,
        namespace_traversal_ids: vec![10, 30],
    }
}

/// Agent registered in namespace 20 under root namespace 10
pub fn agent() -> ClusterAgent {
    ClusterAgent {
        id: 1,
        name: "remotedev".to_string(),
        project_id: 4,
        namespace_traversal_ids: vec![10, 20],
    }
}

pub fn agent_config() -> AgentConfig {
    AgentConfig {
        cluster_agent_id: 1,
        enabled: true,
        dns_zone: "workspaces.example.dev".to_string(),
        shared_namespace: String::new(),
        tools_injector_image: "registry.example.dev/gl-tools-injector:8".to_string(),
        marketplace_enabled: true,
        network_policy_enabled: true,
        gitlab_workspaces_proxy_namespace: "gitlab-workspaces".to_string(),
        default_resources_per_workspace_container: ContainerResources {
            limits: ResourceQuantities {
                cpu: Some("1".to_string()),
                memory: Some("1Gi".to_string()),
            },
            requests: ResourceQuantities {
                cpu: Some("500m".to_string()),
                memory: Some("512Mi".to_string()),
            },
        },
    }
}

pub fn params() -> CreateParams {
    CreateParams {
        user: user(),
        project: project(),
        agent: agent(),
        desired_state: DesiredState::Running,
        project_ref: "main".to_string(),
        devfile_path: None,
        variables: Vec::new(),
    }
}

pub fn settings() -> CreateSettings {
    CreateSettings {
        default_devfile: DEFAULT_DEVFILE.to_string(),
        instance_url: "https://gitlab.example.com".to_string(),
        marketplace: MarketplaceUrls::default(),
    }
}

pub fn options(shallow_clone: bool) -> ProvisioningOptions {
    ProvisioningOptions {
        instance_url: "https://gitlab.example.com/".to_string(),
        shallow_clone,
    }
}

pub fn validated() -> Validated {
    let devfile = RestrictionsEnforcer.validate(USER_DEVFILE).unwrap();
    Validated {
        params: params(),
        agent_config: agent_config(),
        workspace_name: "workspace-1-2-abc123".to_string(),
        workspace_namespace: "gl-rd-ns-1-2-abc123".to_string(),
        devfile_yaml: USER_DEVFILE.to_string(),
        processed_devfile: devfile,
    }
}

/// Output of the volume definer, before any devfile mutation
pub fn prepared(shallow_clone: bool) -> Prepared {
    volume_definer::define(validated(), options(shallow_clone))
}

/// Fully mutated devfile plus the workspace it is generated for
pub fn desired_config_inputs() -> (Workspace, Devfile, AgentConfig) {
    let prepared = volume_component_inserter::insert(internal_poststart_commands_inserter::insert(
        main_component_updater::update(tools_injector_component_inserter::insert(prepared(
            false,
        ))),
    ));

    let workspace = Workspace {
        id: Uuid::new_v4(),
        name: prepared.workspace_name.clone(),
        namespace: prepared.workspace_namespace.clone(),
        desired_state: DesiredState::Running,
        desired_state_updated_at: Utc::now(),
        actual_state: ActualState::CreationRequested,
        project_ref: "main".to_string(),
        devfile_path: None,
        devfile: USER_DEVFILE.to_string(),
        processed_devfile: String::new(),
        url_prefix: "60001-workspace-1-2-abc123".to_string(),
        url_query_string: "folder=%2Fprojects%2Fdemo".to_string(),
        user_id: 2,
        project_id: 3,
        cluster_agent_id: 1,
        personal_access_token_id: Uuid::new_v4(),
        created_at: Utc::now(),
    };

    (workspace, prepared.processed_devfile, prepared.agent_config)
}

/// Store holding the fixture user, project, agent, config and an
/// organization grant
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.add_user(user());
    store.add_project(project());
    store.add_agent(agent());
    store.add_agent_config(agent_config());
    store.add_organization_mapping(OrganizationMapping {
        organization_id: 7,
        cluster_agent_id: 1,
    });
    store
}

pub fn dependencies(
    store: &MemoryStore,
    blobs: Arc<MemoryBlobStore>,
    usage_events: Arc<RecordingUsageEvents>,
    feature_flags: StaticFeatureFlags,
) -> CreateDependencies {
    let store = Arc::new(store.clone());
    CreateDependencies {
        mappings: store.clone(),
        agent_configs: store.clone(),
        blobs,
        validator: Arc::new(RestrictionsEnforcer),
        feature_flags: Arc::new(feature_flags),
        usage_events,
        store,
        names: Arc::new(FixedNameGenerator("abc123")),
        settings: settings(),
    }
}
