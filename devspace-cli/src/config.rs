//! Configuration module

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the orchestrator service
    pub orchestrator_url: String,

    /// Required by commands that act on behalf of a user
    pub user_id: Option<i64>,
}

impl Config {
    pub fn require_user(&self) -> anyhow::Result<i64> {
        self.user_id
            .ok_or_else(|| anyhow::anyhow!("no user given; pass --user or set DEVSPACE_USER"))
    }
}
