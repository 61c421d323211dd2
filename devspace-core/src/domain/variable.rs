//! Workspace variable domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a variable is exposed inside the workspace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Injected as an environment variable
    #[default]
    Environment,
    /// Mounted as a file named after the key
    File,
}

impl VariableType {
    /// Integer stored in the `variable_type` column
    pub fn as_i16(self) -> i16 {
        match self {
            VariableType::Environment => 0,
            VariableType::File => 1,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(VariableType::Environment),
            1 => Some(VariableType::File),
            _ => None,
        }
    }
}

/// Variable attached to a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceVariable {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub key: String,

    #[serde(skip_serializing)]
    pub value: String,

    pub variable_type: VariableType,

    /// False for variables injected by the create pipeline
    pub user_provided: bool,
}
