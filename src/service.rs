//! Search service: the shared front door to the ranking engine.
//!
//! A query is normalized, checked against the result cache, and on a miss
//! routed through a single-flight ledger so concurrent identical queries share
//! one ranking computation. The cache and ledger are the only mutable shared
//! state in the engine; both live behind mutexes inside this module and are
//! never handed out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::debug;

use crate::bm25::bm25;
use crate::cache::{CacheStats, QueryCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::models::{
    CacheOutcome, RankResult, RankableItem, SearchError, SearchHit, SearchResponse,
};
use crate::ranking::{self, DEFAULT_MAX_BOOST};
use crate::snippet::{generate_snippet, SnippetOptions};

/// A ranked, truncated result list as stored in the cache and shared between
/// coalesced waiters.
pub type RankedList = Arc<Vec<RankResult>>;

/// One in-flight ranking computation, awaitable by any number of callers.
type PendingSearch = Shared<BoxFuture<'static, Result<RankedList, SearchError>>>;

/// Source of corpus snapshots. This is the engine's only suspension point:
/// everything after the snapshot is in memory is CPU-bound and synchronous.
#[async_trait]
pub trait CorpusProvider: Send + Sync {
    async fn corpus(&self) -> Result<Arc<Vec<RankableItem>>, SearchError>;
}

/// Fixed in-memory corpus snapshot (standalone use and tests).
pub struct StaticCorpus {
    items: Arc<Vec<RankableItem>>,
}

impl StaticCorpus {
    pub fn new(items: Vec<RankableItem>) -> Self {
        Self { items: Arc::new(items) }
    }
}

#[async_trait]
impl CorpusProvider for StaticCorpus {
    async fn corpus(&self) -> Result<Arc<Vec<RankableItem>>, SearchError> {
        Ok(Arc::clone(&self.items))
    }
}

/// Which scoring pass ranks the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankAlgorithm {
    /// Weighted exact/prefix/substring field scoring.
    #[default]
    Weighted,
    /// BM25-style term scoring.
    Bm25,
}

/// Optional recency post-pass configuration.
#[derive(Clone)]
pub struct RecencyBoost {
    /// Multiplier for the newest document; the oldest gets 1.0.
    pub max_boost: f64,
    /// Timestamp extractor; any unit, as long as it is consistent with
    /// `chrono::Utc::now().timestamp_millis()`.
    pub date_of: Arc<dyn Fn(&RankableItem) -> i64 + Send + Sync>,
}

impl RecencyBoost {
    pub fn new<F>(date_of: F) -> Self
    where
        F: Fn(&RankableItem) -> i64 + Send + Sync + 'static,
    {
        Self {
            max_boost: DEFAULT_MAX_BOOST,
            date_of: Arc::new(date_of),
        }
    }
}

/// Service construction knobs.
pub struct SearchOptions {
    pub algorithm: RankAlgorithm,
    pub recency: Option<RecencyBoost>,
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            algorithm: RankAlgorithm::default(),
            recency: None,
            cache_capacity: DEFAULT_CAPACITY,
            cache_ttl: DEFAULT_TTL,
        }
    }
}

/// Document search service: ranking behind a bounded result cache with
/// single-flight request coalescing.
///
/// Concurrency model: many outstanding queries share one service (wrap it in
/// an `Arc`). Cache and ledger mutations are short mutex-guarded critical
/// sections; the check-and-publish of an in-flight computation is atomic, so
/// for a given `(query, limit)` key there is at most one computation in
/// flight and at most one cache entry at any instant.
pub struct SearchService {
    provider: Arc<dyn CorpusProvider>,
    algorithm: RankAlgorithm,
    recency: Option<RecencyBoost>,
    cache: Arc<QueryCache<RankedList>>,
    ledger: Mutex<HashMap<String, PendingSearch>>,
}

impl SearchService {
    pub fn new(provider: Arc<dyn CorpusProvider>) -> Self {
        Self::with_options(provider, SearchOptions::default())
    }

    pub fn with_options(provider: Arc<dyn CorpusProvider>, options: SearchOptions) -> Self {
        Self {
            provider,
            algorithm: options.algorithm,
            recency: options.recency,
            cache: Arc::new(QueryCache::new(options.cache_capacity, options.cache_ttl)),
            ledger: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a query against the corpus.
    ///
    /// The raw query is normalized (lowercased, whitespace collapsed,
    /// trimmed); an empty normalized query is a browse: the first `limit`
    /// corpus items with score 0 and no snippet, bypassing cache and ledger.
    /// `limit` is assumed pre-validated by the transport boundary
    /// ([`crate::models::clamp_limit`]).
    ///
    /// A collaborator failure is propagated to every waiter of the in-flight
    /// computation and is never cached; the next request for the same key
    /// retries fresh.
    pub async fn search(&self, raw_query: &str, limit: usize) -> Result<SearchResponse, SearchError> {
        let query = normalize_query(raw_query);
        if query.is_empty() {
            return self.browse(limit).await;
        }
        let key = cache_key(&query, limit);

        if let Some(results) = self.cache.get(&key) {
            debug!(key = %key, results = results.len(), hit = true, "result cache hit");
            return Ok(respond(&query, &results, CacheOutcome::Hit));
        }

        let (pending, coalesced) = self.join_or_start(&key, &query, limit);
        if coalesced {
            debug!(key = %key, "joined in-flight ranking computation");
        } else {
            debug!(key = %key, hit = false, "result cache miss, ranking");
        }

        let outcome = pending.clone().await;
        self.settle(&key, &pending);

        let results = outcome?;
        let cache = if coalesced { CacheOutcome::Coalesced } else { CacheOutcome::Miss };
        Ok(respond(&query, &results, cache))
    }

    /// Empty-query fallback: the first `limit` corpus items, unranked.
    async fn browse(&self, limit: usize) -> Result<SearchResponse, SearchError> {
        let corpus = self.provider.corpus().await?;
        let hits = corpus
            .iter()
            .take(limit)
            .map(|item| SearchHit {
                slug: item.path.clone(),
                title: item.title.clone(),
                description: item.description.clone(),
                snippet: None,
                anchor: None,
                heading: None,
                score: 0.0,
            })
            .collect();
        Ok(SearchResponse { hits, cache: CacheOutcome::Miss })
    }

    /// Join the pending computation for `key`, or publish a new one. The
    /// lookup and publish happen under one ledger lock, so two concurrent
    /// misses for the same key can never both start ranking.
    fn join_or_start(&self, key: &str, query: &str, limit: usize) -> (PendingSearch, bool) {
        let mut ledger = self.ledger.lock();
        if let Some(pending) = ledger.get(key) {
            return (pending.clone(), true);
        }

        let provider = Arc::clone(&self.provider);
        let cache = Arc::clone(&self.cache);
        let algorithm = self.algorithm;
        let recency = self.recency.clone();
        let key_owned = key.to_string();
        let query_owned = query.to_string();

        let pending: PendingSearch = async move {
            let corpus = provider.corpus().await?;
            let mut results = match algorithm {
                RankAlgorithm::Weighted => ranking::rank(&corpus, &query_owned),
                RankAlgorithm::Bm25 => bm25(&corpus, &query_owned),
            };
            if let Some(recency) = &recency {
                let now = chrono::Utc::now().timestamp_millis();
                results = ranking::boost_recent(results, now, recency.max_boost, |item| {
                    (recency.date_of)(item)
                });
            }
            results.truncate(limit);
            let results: RankedList = Arc::new(results);
            // Publish before resolving so every waiter observes the entry
            cache.insert(key_owned, Arc::clone(&results));
            Ok(results)
        }
        .boxed()
        .shared();

        ledger.insert(key.to_string(), pending.clone());
        (pending, false)
    }

    /// Remove the settled computation from the ledger. Guarded by handle
    /// identity: under the single-writer-per-key protocol nothing should have
    /// replaced it, but a stale waiter must never evict a newer computation.
    fn settle(&self, key: &str, pending: &PendingSearch) {
        let mut ledger = self.ledger.lock();
        if ledger.get(key).is_some_and(|current| current.ptr_eq(pending)) {
            ledger.remove(key);
        }
    }

    /// Cache counters for response metadata or maintenance endpoints.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Sweep expired cache entries; returns the count removed.
    pub fn prune_cache(&self) -> usize {
        self.cache.prune()
    }

    /// Drop all cached result lists (e.g. after a corpus reload).
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Lowercase, collapse internal whitespace, trim. The normalized form is what
/// ranking sees and what the cache key is built from.
pub fn normalize_query(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cache_key(query: &str, limit: usize) -> String {
    format!("{query}::{limit}")
}

/// Project a ranked list into transport-facing hits. Snippets are generated
/// from the content field when present, falling back to the description.
fn respond(query: &str, results: &[RankResult], cache: CacheOutcome) -> SearchResponse {
    let hits = results
        .iter()
        .map(|result| {
            let item = &result.item;
            let snippet = item
                .content
                .as_deref()
                .or(item.description.as_deref())
                .map(|text| generate_snippet(text, query, &SnippetOptions::default()));
            SearchHit {
                slug: item.path.clone(),
                title: item.title.clone(),
                description: item.description.clone(),
                snippet,
                anchor: None,
                heading: None,
                score: result.score,
            }
        })
        .collect();
    SearchResponse { hits, cache }
}
