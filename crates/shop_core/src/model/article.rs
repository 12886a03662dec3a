//! Article aggregate.
//!
//! # Responsibility
//! - Define the in-memory record combining one `Article` row with its
//!   derived tag set.
//!
//! # Invariants
//! - `id` is caller-assigned and unique across the catalog.
//! - `tags` has set semantics; duplicates collapse on construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Primary key of an article, assigned by the caller.
pub type ArticleId = i64;

/// Catalog article with its embedded tag set.
///
/// Serialized as `{id, name, price, tags}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub name: String,
    /// Non-negative by convention; not enforced.
    pub price: f64,
    /// Ordered only so that listings and JSON output are deterministic.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Article {
    /// Creates an article without tags.
    pub fn new(id: ArticleId, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            tags: BTreeSet::new(),
        }
    }

    /// Replaces the tag set, dropping duplicate values.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Returns whether this article carries `tag` (exact match).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::Article;

    #[test]
    fn with_tags_collapses_duplicates() {
        let article = Article::new(1, "Widget", 9.99).with_tags(["new", "sale", "new"]);
        assert_eq!(article.tags.len(), 2);
        assert!(article.has_tag("sale"));
        assert!(!article.has_tag("Sale"));
    }

    #[test]
    fn json_shape_matches_wire_contract() {
        let article = Article::new(7, "Gadget", 19.5).with_tags(["new"]);
        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": 7, "name": "Gadget", "price": 19.5, "tags": ["new"]})
        );
    }

    #[test]
    fn missing_tags_field_deserializes_as_empty_set() {
        let article: Article =
            serde_json::from_str(r#"{"id": 3, "name": "Bolt", "price": 0.25}"#).unwrap();
        assert!(article.tags.is_empty());
    }
}
