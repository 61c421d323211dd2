//! Users and projects a workspace belongs to

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
}

/// A project whose repository is cloned into the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,

    /// Last path segment, used as the clone directory name
    pub path: String,

    /// Namespace path plus project path, e.g. `group/sub/project`
    pub full_path: String,

    pub organization_id: i64,
    pub namespace_id: i64,

    /// Ancestor chain of the project's namespace, root first
    pub namespace_traversal_ids: Vec<i64>,
}
