//! Post-create usage events
//!
//! Observers run after the outcome is decided. Nothing they do, including a
//! failing or panicking sink, can alter that outcome.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::{Map, json};
use tracing::warn;

use super::constants::{USAGE_EVENT_ACTION, USAGE_EVENT_CATEGORY};
use super::context::{Created, Diagnostics};
use super::error::CreateError;
use crate::service::usage_events::{UsageEvent, UsageEvents};

pub fn on_success(events: &dyn UsageEvents, created: &Created) {
    emit(
        events,
        UsageEvent {
            action: USAGE_EVENT_ACTION.to_string(),
            category: USAGE_EVENT_CATEGORY.to_string(),
            label: "succeed".to_string(),
            user_id: created.params.user.id,
            project_id: created.params.project.id,
            properties: Map::new(),
        },
    );
}

pub fn on_failure(events: &dyn UsageEvents, diagnostics: &Diagnostics, error: &CreateError) {
    let mut properties = Map::new();
    properties.insert("error_type".to_string(), json!(error.kind()));

    emit(
        events,
        UsageEvent {
            action: USAGE_EVENT_ACTION.to_string(),
            category: USAGE_EVENT_CATEGORY.to_string(),
            label: "failed".to_string(),
            user_id: diagnostics.user_id,
            project_id: diagnostics.project_id,
            properties,
        },
    );
}

fn emit(events: &dyn UsageEvents, event: UsageEvent) {
    match catch_unwind(AssertUnwindSafe(|| events.track(&event))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(label = %event.label, "Failed to track usage event: {:#}", e),
        Err(_) => warn!(label = %event.label, "Usage event sink panicked"),
    }
}
