//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate association managers into employee lifecycle APIs.
//! - Keep callers decoupled from store and roster details.

pub mod employee_service;
pub mod skill_match_service;
