//! Repository Module
//!
//! Data access layer for the orchestrator.
//! `store` defines the seams the service layer depends on; the remaining
//! modules are the Postgres queries and the git blob reader behind them.

pub mod agent_config;
pub mod agent_state;
pub mod blob;
pub mod catalog;
pub mod mapping;
pub mod postgres;
pub mod records;
pub mod store;
pub mod token;
pub mod variable;
pub mod workspace;

// Re-export for convenience
pub use agent_config as agent_config_repository;
pub use agent_state as agent_state_repository;
pub use catalog as catalog_repository;
pub use mapping as mapping_repository;
pub use token as token_repository;
pub use variable as variable_repository;
pub use workspace as workspace_repository;
