//! Core domain types
//!
//! These types represent the entities the orchestrator reads (users, projects,
//! cluster agents and their grants) and the records it creates for a workspace.

pub mod agent;
pub mod agent_state;
pub mod devfile;
pub mod mapping;
pub mod project;
pub mod token;
pub mod variable;
pub mod workspace;
