//! Catalog domain model.
//!
//! # Invariants
//! - Articles are identified by a caller-assigned integer id.
//! - Tags exist only as a per-article set; there is no standalone tag entity.

pub mod article;
