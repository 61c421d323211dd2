//! Usage events
//!
//! Product analytics events emitted after a create request finishes.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEvent {
    pub action: String,
    pub category: String,
    pub label: String,
    pub user_id: i64,
    pub project_id: i64,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

pub trait UsageEvents: Send + Sync {
    fn track(&self, event: &UsageEvent) -> anyhow::Result<()>;
}

/// Writes events to the `usage_events` tracing target
pub struct TracingUsageEvents;

impl UsageEvents for TracingUsageEvents {
    fn track(&self, event: &UsageEvent) -> anyhow::Result<()> {
        let properties = serde_json::to_string(&event.properties)?;
        tracing::info!(
            target: "usage_events",
            action = %event.action,
            category = %event.category,
            label = %event.label,
            user_id = event.user_id,
            project_id = event.project_id,
            properties = %properties,
            "usage event"
        );
        Ok(())
    }
}
