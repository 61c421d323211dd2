//! Feature flags
//!
//! Flags are enabled globally or for a set of projects. The static
//! implementation reads a compact spec such as
//! `workspaces_shallow_clone_project=*;workspaces_desired_config_snapshot=3,7`.

use devspace_core::domain::project::Project;
use std::collections::{HashMap, HashSet};

pub const SHALLOW_CLONE_PROJECT: &str = "workspaces_shallow_clone_project";
pub const DESIRED_CONFIG_SNAPSHOT: &str = "workspaces_desired_config_snapshot";

pub trait FeatureFlags: Send + Sync {
    fn is_enabled(&self, feature: &str, project: &Project) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rollout {
    Everyone,
    Projects(HashSet<i64>),
}

#[derive(Debug, Clone, Default)]
pub struct StaticFeatureFlags {
    flags: HashMap<String, Rollout>,
}

impl StaticFeatureFlags {
    pub fn parse(spec: &str) -> anyhow::Result<Self> {
        let mut flags = HashMap::new();

        for entry in spec.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, targets) = entry
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("feature flag '{}' has no rollout", entry))?;
            let name = name.trim();
            if name.is_empty() {
                anyhow::bail!("feature flag entry '{}' has no name", entry);
            }

            let rollout = match targets.trim() {
                "*" => Rollout::Everyone,
                ids => {
                    let ids = ids
                        .split(',')
                        .map(|id| {
                            id.trim().parse::<i64>().map_err(|_| {
                                anyhow::anyhow!("invalid project id '{}' for flag '{}'", id, name)
                            })
                        })
                        .collect::<anyhow::Result<HashSet<_>>>()?;
                    Rollout::Projects(ids)
                }
            };
            flags.insert(name.to_string(), rollout);
        }

        Ok(Self { flags })
    }

    pub fn enable(mut self, feature: &str) -> Self {
        self.flags.insert(feature.to_string(), Rollout::Everyone);
        self
    }
}

impl FeatureFlags for StaticFeatureFlags {
    fn is_enabled(&self, feature: &str, project: &Project) -> bool {
        match self.flags.get(feature) {
            Some(Rollout::Everyone) => true,
            Some(Rollout::Projects(ids)) => ids.contains(&project.id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i64) -> Project {
        Project {
            id,
            name: "p".to_string(),
            path: "p".to_string(),
            full_path: "g/p".to_string(),
            organization_id: 1,
            namespace_id: 1,
            namespace_traversal_ids: vec![1],
        }
    }

    #[test]
    fn test_parse_rollouts() {
        let flags = StaticFeatureFlags::parse(
            "workspaces_shallow_clone_project=*; workspaces_desired_config_snapshot=3,7",
        )
        .unwrap();

        assert!(flags.is_enabled(SHALLOW_CLONE_PROJECT, &project(1)));
        assert!(flags.is_enabled(DESIRED_CONFIG_SNAPSHOT, &project(7)));
        assert!(!flags.is_enabled(DESIRED_CONFIG_SNAPSHOT, &project(4)));
        assert!(!flags.is_enabled("unknown", &project(1)));
    }

    #[test]
    fn test_parse_rejects_malformed_entries() {
        assert!(StaticFeatureFlags::parse("no_rollout").is_err());
        assert!(StaticFeatureFlags::parse("flag=1,abc").is_err());
        assert!(StaticFeatureFlags::parse("=*").is_err());
        assert!(StaticFeatureFlags::parse("").unwrap().flags.is_empty());
    }
}
