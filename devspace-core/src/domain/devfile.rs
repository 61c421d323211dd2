//! Devfile document model
//!
//! Typed view of the subset of the devfile 2.2 schema the create pipeline
//! reads and mutates. Every struct keeps the keys it does not model in a
//! flattened `extra` map, so a devfile survives a load/serialize cycle with
//! user content intact.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Component attribute marking the container the editor is injected into
pub const MAIN_COMPONENT_INDICATOR_ATTRIBUTE: &str = "gl/inject-editor";

/// Untyped keys carried through unchanged
pub type Extra = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Devfile {
    #[serde(default)]
    pub schema_version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,

    #[serde(default, skip_serializing_if = "Events::is_empty")]
    pub events: Events,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Value>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,

    /// Other component types (`kubernetes`, `openshift`, `image`) land here
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default)]
    pub image: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<Endpoint>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_pod: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_request: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_request: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub name: String,

    #[serde(default)]
    pub target_port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecCommand>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply: Option<ApplyCommand>,

    /// Unsupported command types (`composite`, ...) land here
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCommand {
    #[serde(default)]
    pub command_line: String,

    #[serde(default)]
    pub component: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_reload_capable: Option<bool>,

    /// Options outside the supported set (`workingDir`, `env`, ...)
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyCommand {
    #[serde(default)]
    pub component: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Events {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_start: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_start: Vec<String>,

    /// `preStop` and `postStop`
    #[serde(flatten)]
    pub extra: Extra,
}

impl Events {
    pub fn is_empty(&self) -> bool {
        self.pre_start.is_empty() && self.post_start.is_empty() && self.extra.is_empty()
    }
}

impl Component {
    /// True when the main component attribute is set to anything but null/false
    pub fn is_main(&self) -> bool {
        match self.attributes.get(MAIN_COMPONENT_INDICATOR_ATTRIBUTE) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(_) => true,
        }
    }
}

impl Devfile {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn main_component(&self) -> Option<&Component> {
        self.components.iter().find(|c| c.is_main())
    }

    pub fn main_component_mut(&mut self) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.is_main())
    }

    pub fn container_components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.container.is_some())
    }

    pub fn command(&self, id: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEVFILE: &str = r#"
schemaVersion: 2.2.0
metadata:
  name: demo
components:
  - name: tooling-container
    attributes:
      gl/inject-editor: true
    container:
      image: registry.example.dev/ubi:latest
      memoryLimit: 2Gi
      mountSources: true
  - name: database
    container:
      image: postgres:16
commands:
  - id: install
    exec:
      component: tooling-container
      commandLine: npm ci
events:
  postStart:
    - install
"#;

    #[test]
    fn test_main_component_lookup() {
        let devfile = Devfile::from_yaml(DEVFILE).unwrap();

        assert_eq!(devfile.main_component().unwrap().name, "tooling-container");
        assert_eq!(devfile.container_components().count(), 2);
        assert_eq!(devfile.events.post_start, vec!["install".to_string()]);
    }

    #[test]
    fn test_unmodelled_keys_survive_serialization() {
        let devfile = Devfile::from_yaml(DEVFILE).unwrap();
        let reparsed = Devfile::from_yaml(&devfile.to_yaml().unwrap()).unwrap();

        assert_eq!(reparsed, devfile);
        assert!(reparsed.extra.contains_key("metadata"));
        let container = reparsed.components[0].container.as_ref().unwrap();
        assert_eq!(container.memory_limit.as_deref(), Some("2Gi"));
        assert!(container.extra.contains_key("mountSources"));
    }

    #[test]
    fn test_false_main_attribute_is_not_main() {
        let mut component = Component {
            name: "c".to_string(),
            ..Default::default()
        };
        component.attributes.insert(
            MAIN_COMPONENT_INDICATOR_ATTRIBUTE.to_string(),
            Value::Bool(false),
        );
        assert!(!component.is_main());

        component.attributes.insert(
            MAIN_COMPONENT_INDICATOR_ATTRIBUTE.to_string(),
            Value::Bool(true),
        );
        assert!(component.is_main());
    }
}
