//! docsearch - in-memory document search and ranking engine
//!
//! Ranks a flat corpus of documents against free-text queries with either
//! weighted-field scoring or a BM25 variant, generates highlighted snippets,
//! and fronts the ranking pass with a bounded TTL+LRU result cache and
//! single-flight request coalescing.

pub mod bm25;
pub mod cache;
pub mod matcher;
pub mod models;
pub mod ranking;
pub mod service;
pub mod snippet;

pub use cache::{CacheStats, QueryCache};
pub use models::{
    clamp_limit, CacheOutcome, MatchField, MatchSpan, RankResult, RankableItem, SearchError,
    SearchHit, SearchResponse, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use service::{
    normalize_query, CorpusProvider, RankAlgorithm, RecencyBoost, SearchOptions, SearchService,
    StaticCorpus,
};
pub use snippet::{
    generate_snippet, highlight_html, highlight_matches, HighlightSpan, HighlightedText,
    SnippetOptions,
};
