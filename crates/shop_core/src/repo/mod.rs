//! Repository layer for catalog persistence.
//!
//! # Responsibility
//! - Define the article store contract.
//! - Keep SQL and row mapping out of the service layer.
//!
//! # Invariants
//! - Missing/duplicate outcomes are sentinel values, not errors.

pub mod article_repo;
