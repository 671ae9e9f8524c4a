//! Core data model for the search engine.
//!
//! These types are the contract with the two external collaborators: the
//! content loader hands the engine a flat `RankableItem` corpus snapshot, and
//! the transport layer consumes ranked `RankResult`s or the lighter
//! `SearchHit` projection. The engine never mutates an item it was given.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of results returned when the caller does not ask for more.
pub const DEFAULT_LIMIT: usize = 8;

/// Upper bound on the result limit the transport layer may request.
pub const MAX_LIMIT: usize = 50;

/// Clamp a caller-supplied limit into the recognized `[1, MAX_LIMIT]` range.
/// `None` yields [`DEFAULT_LIMIT`]. This is the transport boundary's
/// validation; the engine itself assumes a pre-validated limit.
pub fn clamp_limit(limit: Option<usize>) -> usize {
    match limit {
        None => DEFAULT_LIMIT,
        Some(n) => n.clamp(1, MAX_LIMIT),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CORPUS INPUT
// ─────────────────────────────────────────────────────────────────────────────

/// One searchable document, owned by the content-loading collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankableItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Route to the document, used as the result slug.
    pub path: String,
    /// Optional per-document score multiplier.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl RankableItem {
    /// A minimal item with just a title and path (tests and fixtures).
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            content: None,
            tags: Vec::new(),
            path: path.into(),
            weight: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RANKED OUTPUT
// ─────────────────────────────────────────────────────────────────────────────

/// Which document field a set of match positions belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Title,
    Description,
    Content,
    Tag,
}

/// Match offsets within a single field, ascending. A document that matches in
/// several tags carries one `Tag` span per matching tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub field: MatchField,
    pub positions: Vec<usize>,
}

/// One ranked document. Produced fresh per query; only the whole ordered list
/// is ever cached, never an individual result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResult {
    pub item: RankableItem,
    pub score: f64,
    pub matches: Vec<MatchSpan>,
}

/// Lightweight projection handed to the transport layer. `anchor` and
/// `heading` exist for wire compatibility and are `None` for whole-document
/// results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub snippet: Option<String>,
    pub anchor: Option<String>,
    pub heading: Option<String>,
    pub score: f64,
}

/// How a query was satisfied, for response metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheOutcome {
    /// Served from the result cache.
    Hit,
    /// Computed fresh by this request.
    Miss,
    /// Joined another request's in-flight computation.
    Coalesced,
}

/// Ranked results plus instrumentation suitable for response metadata.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub cache: CacheOutcome,
}

// ─────────────────────────────────────────────────────────────────────────────
// ERRORS
// ─────────────────────────────────────────────────────────────────────────────

/// Error type for search operations.
///
/// `Clone` is required so a single failed in-flight computation can be fanned
/// out to every coalesced waiter. Failures are scoped to one query resolution
/// and never corrupt cache or ledger state for other keys.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// The corpus collaborator could not produce a snapshot.
    #[error("corpus unavailable: {0}")]
    Corpus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit_default() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn test_clamp_limit_bounds() {
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(500)), MAX_LIMIT);
    }

    #[test]
    fn test_rankable_item_deserializes_with_defaults() {
        let item: RankableItem =
            serde_json::from_str(r#"{"title":"Quickstart","path":"docs/quickstart"}"#).unwrap();
        assert_eq!(item.title, "Quickstart");
        assert_eq!(item.description, None);
        assert!(item.tags.is_empty());
        assert_eq!(item.weight, None);
    }

    #[test]
    fn test_search_error_is_cloneable() {
        let err = SearchError::Corpus("loader offline".into());
        let copy = err.clone();
        assert_eq!(copy.to_string(), "corpus unavailable: loader offline");
    }
}
