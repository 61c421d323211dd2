//! Devfile validation
//!
//! `DevfileValidator` turns raw devfile YAML into the processed document.
//! `RestrictionsEnforcer` is the shipped implementation: it parses the
//! document and reports every restriction it violates, not just the first.

use devspace_core::domain::devfile::{Devfile, MAIN_COMPONENT_INDICATOR_ATTRIBUTE};
use serde_yaml::Value;

pub const MAX_DEVFILE_SIZE_BYTES: usize = 3 * 1024 * 1024;
pub const REQUIRED_DEVFILE_SCHEMA_VERSION: &str = "2.2.0";
pub const RESTRICTED_PREFIX: &str = "gl-";

const UNSUPPORTED_COMPONENT_TYPES: [&str; 3] = ["kubernetes", "openshift", "image"];
const UNSUPPORTED_COMPONENT_ATTRIBUTES: [&str; 2] = ["container-overrides", "pod-overrides"];
const SUPPORTED_EXEC_COMMAND_OPTIONS: [&str; 4] =
    ["commandLine", "component", "label", "hotReloadCapable"];

pub trait DevfileValidator: Send + Sync {
    fn validate(&self, raw: &str) -> Result<Devfile, Vec<String>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RestrictionsEnforcer;

impl DevfileValidator for RestrictionsEnforcer {
    fn validate(&self, raw: &str) -> Result<Devfile, Vec<String>> {
        if raw.len() > MAX_DEVFILE_SIZE_BYTES {
            return Err(vec![format!(
                "Devfile size ({} bytes) exceeds the maximum allowed size of {} bytes",
                raw.len(),
                MAX_DEVFILE_SIZE_BYTES
            )]);
        }

        let devfile = Devfile::from_yaml(raw)
            .map_err(|e| vec![format!("Devfile could not be parsed: {}", e)])?;

        let errors = violations(&devfile);
        if errors.is_empty() {
            Ok(devfile)
        } else {
            Err(errors)
        }
    }
}

fn restricted(value: &str) -> bool {
    value.to_lowercase().starts_with(RESTRICTED_PREFIX)
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Sequence(seq)) => !seq.is_empty(),
        Some(Value::Mapping(map)) => !map.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn violations(devfile: &Devfile) -> Vec<String> {
    let mut errors = Vec::new();

    // =============================================================================
    // Document root
    // =============================================================================

    if devfile.schema_version != REQUIRED_DEVFILE_SCHEMA_VERSION {
        errors.push(format!(
            "'schemaVersion' '{}' is not supported, it must be '{}'",
            devfile.schema_version, REQUIRED_DEVFILE_SCHEMA_VERSION
        ));
    }
    if is_present(devfile.extra.get("parent")) {
        errors.push("Inheriting from 'parent' is not yet supported".to_string());
    }
    if is_present(devfile.extra.get("starterProjects")) {
        errors.push("'starterProjects' is not yet supported".to_string());
    }
    if is_present(devfile.extra.get("projects")) {
        errors.push("'projects' is not yet supported".to_string());
    }
    if is_present(
        devfile
            .extra
            .get("attributes")
            .and_then(|attributes| attributes.get("pod-overrides")),
    ) {
        errors.push("Attribute 'pod-overrides' is not yet supported".to_string());
    }

    // =============================================================================
    // Components
    // =============================================================================

    if devfile.components.is_empty() {
        errors.push("No components present in devfile".to_string());
    } else {
        let main: Vec<&str> = devfile
            .components
            .iter()
            .filter(|c| c.is_main())
            .map(|c| c.name.as_str())
            .collect();
        match main.len() {
            0 => errors.push(format!(
                "No component has '{}' attribute",
                MAIN_COMPONENT_INDICATOR_ATTRIBUTE
            )),
            1 => {}
            _ => errors.push(format!(
                "Multiple components '{}' have '{}' attribute",
                main.join(", "),
                MAIN_COMPONENT_INDICATOR_ATTRIBUTE
            )),
        }
    }

    for component in &devfile.components {
        if component.name.is_empty() {
            errors.push("Components must have a 'name'".to_string());
            continue;
        }
        if restricted(&component.name) {
            errors.push(format!(
                "Component name '{}' must not start with '{}'",
                component.name, RESTRICTED_PREFIX
            ));
        }
        for component_type in UNSUPPORTED_COMPONENT_TYPES {
            if is_present(component.extra.get(component_type)) {
                errors.push(format!(
                    "Component type '{}' is not yet supported",
                    component_type
                ));
            }
        }
        for attribute in UNSUPPORTED_COMPONENT_ATTRIBUTES {
            if is_present(component.attributes.get(attribute)) {
                errors.push(format!("Attribute '{}' is not yet supported", attribute));
            }
        }

        let Some(container) = &component.container else {
            continue;
        };
        if container.dedicated_pod == Some(true) {
            errors.push(format!(
                "Property 'dedicatedPod' of component '{}' is not yet supported",
                component.name
            ));
        }
        for endpoint in &container.endpoints {
            if restricted(&endpoint.name) {
                errors.push(format!(
                    "Endpoint name '{}' of component '{}' must not start with '{}'",
                    endpoint.name, component.name, RESTRICTED_PREFIX
                ));
            }
        }
    }

    // =============================================================================
    // Commands
    // =============================================================================

    for command in &devfile.commands {
        if restricted(&command.id) {
            errors.push(format!(
                "Command id '{}' must not start with '{}'",
                command.id, RESTRICTED_PREFIX
            ));
        }

        let (kind, component, label) = match (&command.exec, &command.apply) {
            (Some(exec), _) => ("exec", &exec.component, &exec.label),
            (None, Some(apply)) => ("apply", &apply.component, &apply.label),
            (None, None) => {
                errors.push(format!(
                    "Command '{}' must have one of the supported command types: exec, apply",
                    command.id
                ));
                continue;
            }
        };

        if component.is_empty() {
            errors.push(format!(
                "'{}' command '{}' must specify a 'component'",
                kind, command.id
            ));
        } else if restricted(component) {
            errors.push(format!(
                "Component name '{}' for command id '{}' must not start with '{}'",
                component, command.id, RESTRICTED_PREFIX
            ));
        }
        if let Some(label) = label.as_deref().filter(|l| restricted(l)) {
            errors.push(format!(
                "Label '{}' for command id '{}' must not start with '{}'",
                label, command.id, RESTRICTED_PREFIX
            ));
        }

        if let Some(exec) = &command.exec {
            let unsupported: Vec<&str> = exec
                .extra
                .keys()
                .map(String::as_str)
                .filter(|k| !SUPPORTED_EXEC_COMMAND_OPTIONS.contains(k))
                .collect();
            if !unsupported.is_empty() {
                errors.push(format!(
                    "Unsupported options '{}' for exec command '{}'. Only '{}' are supported.",
                    unsupported.join(", "),
                    command.id,
                    SUPPORTED_EXEC_COMMAND_OPTIONS.join(", ")
                ));
            }
            if exec.hot_reload_capable == Some(true) {
                errors.push(format!(
                    "Property 'hotReloadCapable' for exec command '{}' must be false when specified",
                    command.id
                ));
            }
        }
    }

    // =============================================================================
    // Events
    // =============================================================================

    for (event_type, entries) in &devfile.events.extra {
        if is_present(Some(entries)) {
            errors.push(format!("Event type '{}' is not yet supported", event_type));
        }
    }
    let events = [
        ("preStart", &devfile.events.pre_start),
        ("postStart", &devfile.events.post_start),
    ];
    for (event_type, entries) in events {
        for entry in entries {
            if restricted(entry) {
                errors.push(format!(
                    "Event '{}' of type '{}' must not start with '{}'",
                    entry, event_type, RESTRICTED_PREFIX
                ));
            }
        }
    }
    for entry in &devfile.events.post_start {
        let is_exec = devfile
            .command(entry)
            .is_some_and(|command| command.exec.is_some());
        if !is_exec {
            errors.push(format!(
                "PostStart event references command '{}' which is not an exec command. Only exec commands are supported in postStart events",
                entry
            ));
        }
    }

    // =============================================================================
    // Variables
    // =============================================================================

    for name in devfile.variables.keys() {
        let lower = name.to_lowercase();
        for prefix in [RESTRICTED_PREFIX, "gl_"] {
            if lower.starts_with(prefix) {
                errors.push(format!(
                    "Variable name '{}' must not start with '{}'",
                    name, prefix
                ));
            }
        }
    }

    errors
}
