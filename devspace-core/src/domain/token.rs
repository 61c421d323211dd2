//! Personal access token issued for a workspace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scopes granted to every workspace token
pub const WORKSPACE_TOKEN_SCOPES: [&str; 2] = ["api", "write_repository"];

/// Upper bound on a workspace token's lifetime
pub const MAX_TOKEN_LIFETIME_DAYS: i64 = 365;

/// Persisted token record
///
/// Only the digest of the secret is stored. The secret itself lives in the
/// workspace's `gl_token` file variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalAccessToken {
    pub id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub scopes: Vec<String>,

    #[serde(skip_serializing)]
    pub token_digest: String,

    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
