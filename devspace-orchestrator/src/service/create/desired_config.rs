//! Desired config generation
//!
//! Turns a processed devfile into the ordered list of Kubernetes resources
//! the agent applies for the workspace. Secret values are never part of the
//! snapshot; the two secrets are emitted with empty data and filled from the
//! workspace variables at reconcile time.

use devspace_core::domain::agent::{AgentConfig, ContainerResources};
use devspace_core::domain::devfile::{Component, Container, Devfile};
use devspace_core::domain::workspace::{DesiredState, Workspace};
use serde_json::{Map, Value, json};

use super::constants::{
    INTERNAL_BLOCKING_COMMAND_LABEL, RUN_AS_USER,
    RUN_INTERNAL_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME,
    RUN_NON_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME, VARIABLES_VOLUME_DEFAULT_MODE,
    VARIABLES_VOLUME_NAME, VARIABLES_VOLUME_PATH, WORKSPACE_DATA_VOLUME_PATH,
    WORKSPACE_SCRIPTS_VOLUME_DEFAULT_MODE, WORKSPACE_SCRIPTS_VOLUME_NAME,
    WORKSPACE_SCRIPTS_VOLUME_PATH,
};
use super::scripts;

const DEFAULT_VOLUME_SIZE: &str = "1Gi";
const PROXY_POD_NAME: &str = "gitlab-workspaces-proxy";
const PRIVATE_IP_RANGES: [&str; 3] = ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"];

// =============================================================================
// Resource names
// =============================================================================

struct Names {
    workspace: String,
    namespace: String,
    workspace_inventory: String,
    secrets_inventory: String,
    env_secret: String,
    file_secret: String,
    scripts_config_map: String,
}

impl Names {
    fn new(workspace: &Workspace) -> Self {
        let name = &workspace.name;
        Self {
            workspace: name.clone(),
            namespace: workspace.namespace.clone(),
            workspace_inventory: format!("{}-workspace-inventory", name),
            secrets_inventory: format!("{}-secrets-inventory", name),
            env_secret: format!("{}-env-var", name),
            file_secret: format!("{}-file", name),
            scripts_config_map: format!("{}-scripts-configmap", name),
        }
    }
}

/// Common labels and annotations
struct Meta {
    labels: Map<String, Value>,
    annotations: Map<String, Value>,
}

impl Meta {
    fn new(workspace: &Workspace, config: &AgentConfig) -> Self {
        let mut labels = Map::new();
        labels.insert(
            "agent.gitlab.com/id".to_string(),
            json!(workspace.cluster_agent_id.to_string()),
        );

        let mut annotations = Map::new();
        annotations.insert(
            "workspaces.gitlab.com/host-template".to_string(),
            json!(format!("{{{{.port}}}}-{}.{}", workspace.name, config.dns_zone)),
        );
        annotations.insert(
            "workspaces.gitlab.com/id".to_string(),
            json!(workspace.id.to_string()),
        );

        Self {
            labels,
            annotations,
        }
    }

    /// Annotations for a resource tracked by `inventory`
    fn owned_by(&self, inventory: Option<&str>, partial_reconciliation: bool) -> Map<String, Value> {
        let mut annotations = self.annotations.clone();
        if let Some(inventory) = inventory {
            annotations.insert("config.k8s.io/owning-inventory".to_string(), json!(inventory));
        }
        if partial_reconciliation {
            annotations.insert(
                "workspaces.gitlab.com/include-in-partial-reconciliation".to_string(),
                json!("true"),
            );
        }
        annotations
    }

    fn metadata(&self, name: &str, namespace: &str, annotations: Map<String, Value>) -> Value {
        json!({
            "name": name,
            "namespace": namespace,
            "labels": self.labels,
            "annotations": annotations,
        })
    }
}

/// Builds the desired config of a freshly created workspace
pub fn generate(workspace: &Workspace, devfile: &Devfile, config: &AgentConfig) -> Vec<Value> {
    let names = Names::new(workspace);
    let meta = Meta::new(workspace, config);

    let mut resources = vec![
        inventory_config_map(&names.workspace_inventory, &names, &meta, true),
        deployment(workspace, devfile, config, &names, &meta),
        service(devfile, &names, &meta),
    ];
    resources.extend(persistent_volume_claims(devfile, &names, &meta));
    resources.push(service_account(&names, &meta));
    if config.network_policy_enabled {
        resources.push(network_policy(config, &names, &meta));
    }
    resources.push(scripts_config_map(devfile, &names, &meta));
    resources.push(inventory_config_map(&names.secrets_inventory, &names, &meta, false));
    resources.push(secret(&names.env_secret, &names, &meta));
    resources.push(secret(&names.file_secret, &names, &meta));
    resources
}

fn inventory_config_map(name: &str, names: &Names, meta: &Meta, partial: bool) -> Value {
    let mut metadata = meta.metadata(name, &names.namespace, meta.owned_by(None, partial));
    metadata["labels"]["cli-utils.sigs.k8s.io/inventory-id"] = json!(name);
    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": metadata,
    })
}

// =============================================================================
// Deployment
// =============================================================================

/// Container components started by a preStart `apply` command, with their
/// init container names
fn init_components<'a>(devfile: &'a Devfile) -> Vec<(String, &'a Component)> {
    devfile
        .events
        .pre_start
        .iter()
        .enumerate()
        .filter_map(|(index, command_id)| {
            let apply = devfile.command(command_id)?.apply.as_ref()?;
            let component = devfile
                .components
                .iter()
                .find(|c| c.name == apply.component && c.container.is_some())?;
            let name = format!("{}-{}-{}", component.name, command_id, index + 1);
            Some((name, component))
        })
        .collect()
}

fn regular_components(devfile: &Devfile) -> Vec<&Component> {
    let init: Vec<&str> = init_components(devfile)
        .into_iter()
        .map(|(_, c)| c.name.as_str())
        .collect();
    devfile
        .container_components()
        .filter(|c| !init.contains(&c.name.as_str()))
        .collect()
}

fn deployment(
    workspace: &Workspace,
    devfile: &Devfile,
    config: &AgentConfig,
    names: &Names,
    meta: &Meta,
) -> Value {
    let defaults = &config.default_resources_per_workspace_container;
    let has_poststart = !devfile.events.post_start.is_empty();

    let containers: Vec<Value> = regular_components(devfile)
        .into_iter()
        .filter_map(|component| {
            let container = component.container.as_ref()?;
            let mut spec = container_spec(&component.name, container, names, defaults, true);
            if component.is_main() && has_poststart {
                spec["lifecycle"] = json!({
                    "postStart": {
                        "exec": {
                            "command": ["/bin/sh", "-c", scripts::kubernetes_poststart_hook_command()]
                        }
                    }
                });
            }
            Some(spec)
        })
        .collect();

    let init_containers: Vec<Value> = init_components(devfile)
        .into_iter()
        .filter_map(|(name, component)| {
            let container = component.container.as_ref()?;
            Some(container_spec(&name, container, names, defaults, false))
        })
        .collect();

    let mut volumes: Vec<Value> = devfile
        .components
        .iter()
        .filter(|c| c.volume.is_some())
        .map(|c| {
            json!({
                "name": c.name,
                "persistentVolumeClaim": { "claimName": format!("{}-{}", names.workspace, c.name) }
            })
        })
        .collect();
    volumes.push(json!({
        "name": VARIABLES_VOLUME_NAME,
        "projected": {
            "defaultMode": VARIABLES_VOLUME_DEFAULT_MODE,
            "sources": [{ "secret": { "name": names.file_secret } }]
        }
    }));
    volumes.push(json!({
        "name": WORKSPACE_SCRIPTS_VOLUME_NAME,
        "projected": {
            "defaultMode": WORKSPACE_SCRIPTS_VOLUME_DEFAULT_MODE,
            "sources": [{ "configMap": { "name": names.scripts_config_map } }]
        }
    }));

    let replicas = if workspace.desired_state == DesiredState::Running {
        1
    } else {
        0
    };
    let annotations = meta.owned_by(Some(&names.workspace_inventory), true);

    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": meta.metadata(&names.workspace, &names.namespace, annotations.clone()),
        "spec": {
            "replicas": replicas,
            "selector": { "matchLabels": meta.labels },
            "strategy": { "type": "Recreate" },
            "template": {
                "metadata": meta.metadata(&names.workspace, &names.namespace, annotations),
                "spec": {
                    "containers": containers,
                    "initContainers": init_containers,
                    "securityContext": {
                        "fsGroup": 0,
                        "fsGroupChangePolicy": "OnRootMismatch",
                        "runAsNonRoot": true,
                        "runAsUser": RUN_AS_USER
                    },
                    "serviceAccountName": names.workspace,
                    "volumes": volumes
                }
            }
        }
    })
}

fn container_spec(
    name: &str,
    container: &Container,
    names: &Names,
    defaults: &ContainerResources,
    regular: bool,
) -> Value {
    let mut env: Vec<Value> = container
        .env
        .iter()
        .map(|e| json!({ "name": e.name, "value": e.value }))
        .collect();
    for var in ["PROJECTS_ROOT", "PROJECT_SOURCE"] {
        env.push(json!({ "name": var, "value": WORKSPACE_DATA_VOLUME_PATH }));
    }

    let mut volume_mounts: Vec<Value> = container
        .volume_mounts
        .iter()
        .map(|m| json!({ "name": m.name, "mountPath": m.path.as_deref().unwrap_or(WORKSPACE_DATA_VOLUME_PATH) }))
        .collect();
    volume_mounts.push(json!({ "name": VARIABLES_VOLUME_NAME, "mountPath": VARIABLES_VOLUME_PATH }));
    if regular {
        volume_mounts.push(json!({
            "name": WORKSPACE_SCRIPTS_VOLUME_NAME,
            "mountPath": WORKSPACE_SCRIPTS_VOLUME_PATH
        }));
    }

    let mut spec = json!({
        "name": name,
        "image": container.image,
        "imagePullPolicy": "Always",
        "env": env,
        "envFrom": [{ "secretRef": { "name": names.env_secret } }],
        "resources": resources(container, defaults),
        "securityContext": {
            "allowPrivilegeEscalation": false,
            "privileged": false,
            "runAsNonRoot": true,
            "runAsUser": RUN_AS_USER
        },
        "volumeMounts": volume_mounts,
    });
    if !container.command.is_empty() {
        spec["command"] = json!(container.command);
    }
    if !container.args.is_empty() {
        spec["args"] = json!(container.args);
    }
    if regular && !container.endpoints.is_empty() {
        spec["ports"] = container
            .endpoints
            .iter()
            .map(|e| json!({ "name": e.name, "containerPort": e.target_port, "protocol": "TCP" }))
            .collect();
    }
    spec
}

/// Container quantities, falling back to the agent defaults per field
fn resources(container: &Container, defaults: &ContainerResources) -> Value {
    fn quantities(pairs: [(&str, Option<&String>); 2]) -> Map<String, Value> {
        pairs
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), json!(v))))
            .collect()
    }

    let limits = quantities([
        ("cpu", container.cpu_limit.as_ref().or(defaults.limits.cpu.as_ref())),
        (
            "memory",
            container
                .memory_limit
                .as_ref()
                .or(defaults.limits.memory.as_ref()),
        ),
    ]);
    let requests = quantities([
        (
            "cpu",
            container
                .cpu_request
                .as_ref()
                .or(defaults.requests.cpu.as_ref()),
        ),
        (
            "memory",
            container
                .memory_request
                .as_ref()
                .or(defaults.requests.memory.as_ref()),
        ),
    ]);

    let mut resources = Map::new();
    if !limits.is_empty() {
        resources.insert("limits".to_string(), Value::Object(limits));
    }
    if !requests.is_empty() {
        resources.insert("requests".to_string(), Value::Object(requests));
    }
    Value::Object(resources)
}

// =============================================================================
// Remaining resources
// =============================================================================

fn service(devfile: &Devfile, names: &Names, meta: &Meta) -> Value {
    let ports: Vec<Value> = regular_components(devfile)
        .into_iter()
        .filter_map(|c| c.container.as_ref())
        .flat_map(|c| c.endpoints.iter())
        .map(|e| json!({ "name": e.name, "port": e.target_port, "targetPort": e.target_port }))
        .collect();

    json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": meta.metadata(
            &names.workspace,
            &names.namespace,
            meta.owned_by(Some(&names.workspace_inventory), true),
        ),
        "spec": {
            "ports": ports,
            "selector": meta.labels
        }
    })
}

fn persistent_volume_claims(devfile: &Devfile, names: &Names, meta: &Meta) -> Vec<Value> {
    devfile
        .components
        .iter()
        .filter_map(|c| c.volume.as_ref().map(|v| (c, v)))
        .map(|(component, volume)| {
            let size = volume.size.as_deref().unwrap_or(DEFAULT_VOLUME_SIZE);
            json!({
                "apiVersion": "v1",
                "kind": "PersistentVolumeClaim",
                "metadata": meta.metadata(
                    &format!("{}-{}", names.workspace, component.name),
                    &names.namespace,
                    meta.owned_by(Some(&names.workspace_inventory), true),
                ),
                "spec": {
                    "accessModes": ["ReadWriteOnce"],
                    "resources": { "requests": { "storage": size } }
                }
            })
        })
        .collect()
}

fn service_account(names: &Names, meta: &Meta) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "ServiceAccount",
        "automountServiceAccountToken": false,
        "imagePullSecrets": [],
        "metadata": meta.metadata(
            &names.workspace,
            &names.namespace,
            meta.owned_by(Some(&names.workspace_inventory), true),
        ),
    })
}

fn network_policy(config: &AgentConfig, names: &Names, meta: &Meta) -> Value {
    json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "NetworkPolicy",
        "metadata": meta.metadata(
            &names.workspace,
            &names.namespace,
            meta.owned_by(Some(&names.workspace_inventory), true),
        ),
        "spec": {
            "egress": [
                {
                    "ports": [
                        { "port": 53, "protocol": "TCP" },
                        { "port": 53, "protocol": "UDP" }
                    ],
                    "to": [{
                        "namespaceSelector": {
                            "matchLabels": { "kubernetes.io/metadata.name": "kube-system" }
                        }
                    }]
                },
                {
                    "to": [{
                        "ipBlock": { "cidr": "0.0.0.0/0", "except": PRIVATE_IP_RANGES }
                    }]
                }
            ],
            "ingress": [{
                "from": [{
                    "namespaceSelector": {
                        "matchLabels": {
                            "kubernetes.io/metadata.name": config.gitlab_workspaces_proxy_namespace
                        }
                    },
                    "podSelector": {
                        "matchLabels": { "app.kubernetes.io/name": PROXY_POD_NAME }
                    }
                }]
            }],
            "podSelector": {},
            "policyTypes": ["Ingress", "Egress"]
        }
    })
}

/// Runner scripts plus one script per postStart command
fn scripts_config_map(devfile: &Devfile, names: &Names, meta: &Meta) -> Value {
    let mut blocking = Vec::new();
    let mut non_blocking = Vec::new();
    let mut data = Map::new();

    for id in &devfile.events.post_start {
        let Some(exec) = devfile.command(id).and_then(|c| c.exec.as_ref()) else {
            continue;
        };
        if exec.label.as_deref() == Some(INTERNAL_BLOCKING_COMMAND_LABEL) {
            blocking.push(id.as_str());
        } else {
            non_blocking.push(id.as_str());
        }
        data.insert(id.clone(), json!(exec.command_line));
    }

    data.insert(
        RUN_INTERNAL_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME.to_string(),
        json!(scripts::poststart_commands_runner(&blocking)),
    );
    data.insert(
        RUN_NON_BLOCKING_POSTSTART_COMMANDS_SCRIPT_NAME.to_string(),
        json!(scripts::poststart_commands_runner(&non_blocking)),
    );

    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": meta.metadata(
            &names.scripts_config_map,
            &names.namespace,
            meta.owned_by(Some(&names.workspace_inventory), true),
        ),
        "data": data,
    })
}

fn secret(name: &str, names: &Names, meta: &Meta) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": meta.metadata(
            name,
            &names.namespace,
            meta.owned_by(Some(&names.secrets_inventory), false),
        ),
        "data": {},
    })
}
