//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and provider calls into use-case level APIs.
//! - Keep HTTP/UI layers decoupled from storage and model-call details.

pub mod enrichment_service;
pub mod note_service;
pub mod query_service;
pub mod stats_service;
