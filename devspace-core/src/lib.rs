//! Devspace Core
//!
//! Core types shared by the devspace services.
//!
//! This crate contains:
//! - Domain types: workspaces, their variables and tokens, cluster agents,
//!   agent grants and the devfile document model
//! - DTOs: request and response shapes for the orchestrator API

pub mod domain;
pub mod dto;
