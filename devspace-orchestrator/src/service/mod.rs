//! Service Module
//!
//! Business logic layer for the orchestrator.
//! The create pipeline lives in `create`; its pluggable collaborators
//! (validation, feature flags, usage events) sit next to it.

pub mod create;
pub mod devfile_validator;
pub mod feature_flags;
pub mod usage_events;
pub mod workspace;

// Re-export for convenience
pub use create as create_service;
pub use workspace as workspace_service;
