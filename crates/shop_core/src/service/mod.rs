//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into request-level outcomes.
//! - Keep the request layer decoupled from storage details.

pub mod article_service;
