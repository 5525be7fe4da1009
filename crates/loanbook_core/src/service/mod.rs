//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI/API layers decoupled from storage details.

pub mod account_service;
pub mod bulk_loader;
pub mod eligibility;
