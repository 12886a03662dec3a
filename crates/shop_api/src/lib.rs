//! Request-boundary adapter for the article catalog.
//!
//! Turns service outcomes into `(status, body)` envelopes following the
//! `/articles` resource contract, independent of any HTTP framework.

pub mod api;

pub use api::{ApiResponse, ArticleApi};
