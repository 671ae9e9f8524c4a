//! BM25-style ranker.
//!
//! Documents are tokenized into a flat term bag (title, description, content
//! and tags joined, whitespace-split, lowercased); query terms are scored with
//! a BM25 variant whose saturation constants are deliberately asymmetric.

use std::collections::HashMap;

use crate::matcher;
use crate::ranking::sort_by_score;
use crate::models::{MatchField, MatchSpan, RankResult, RankableItem};

/// Numerator term-frequency gain. Deliberately not equal to
/// [`BM25_K1_SATURATION`]: canonical BM25 uses one shared `k1` in both places,
/// but this engine's scoring is defined with the asymmetric pair and existing
/// rankings depend on it. Do not unify the two.
pub const BM25_K1_GAIN: f64 = 2.2;

/// Denominator term-frequency saturation constant.
pub const BM25_K1_SATURATION: f64 = 1.2;

/// Document-length normalization strength.
pub const BM25_B: f64 = 0.75;

/// Rank a corpus snapshot against a query with BM25-style scoring.
///
/// Items with a non-positive score are dropped; the result is sorted by score
/// descending with corpus order preserved on ties. Empty corpus or a query
/// with no matching terms yields an empty list.
pub fn bm25(items: &[RankableItem], query: &str) -> Vec<RankResult> {
    if items.is_empty() || query.is_empty() {
        return Vec::new();
    }

    let terms: Vec<String> = query.to_lowercase().split_whitespace().map(String::from).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let docs: Vec<TermBag> = items.iter().map(TermBag::build).collect();
    let total_len: usize = docs.iter().map(|d| d.len).sum();
    let avgdl = total_len as f64 / docs.len() as f64;
    let n = docs.len() as f64;

    // Document frequency per unique query term
    let mut df: HashMap<&str, f64> = HashMap::new();
    for term in &terms {
        let count = docs.iter().filter(|d| d.counts.contains_key(term.as_str())).count();
        df.insert(term.as_str(), count as f64);
    }

    let mut results: Vec<RankResult> = Vec::new();
    for (item, doc) in items.iter().zip(&docs) {
        let mut score = 0.0;
        for term in &terms {
            let tf = doc.counts.get(term.as_str()).copied().unwrap_or(0) as f64;
            if tf == 0.0 {
                continue;
            }
            let idf = ((n - df[term.as_str()] + 0.5) / (df[term.as_str()] + 0.5) + 1.0).ln();
            let norm = 1.0 - BM25_B + BM25_B * doc.len as f64 / avgdl;
            score += idf * (tf * BM25_K1_GAIN) / (tf + BM25_K1_SATURATION * norm);
        }

        if let Some(weight) = item.weight {
            score *= weight;
        }
        if score <= 0.0 {
            continue;
        }

        results.push(RankResult {
            item: item.clone(),
            score,
            matches: collect_matches(item, &terms),
        });
    }

    sort_by_score(&mut results);
    results
}

/// Flat term-count bag for one document.
struct TermBag {
    counts: HashMap<String, usize>,
    len: usize,
}

impl TermBag {
    fn build(item: &RankableItem) -> Self {
        let mut counts = HashMap::new();
        let mut len = 0;
        let fields = [
            Some(item.title.as_str()),
            item.description.as_deref(),
            item.content.as_deref(),
        ];
        let tag_text = item.tags.join(" ");
        for text in fields.into_iter().flatten().chain(std::iter::once(tag_text.as_str())) {
            for token in text.split_whitespace() {
                *counts.entry(token.to_lowercase()).or_insert(0) += 1;
                len += 1;
            }
        }
        Self { counts, len }
    }
}

/// Per-field match spans for the diagnostics side of a BM25 result: union of
/// every query term's occurrence offsets, ascending, one span per field (one
/// per matching tag).
fn collect_matches(item: &RankableItem, terms: &[String]) -> Vec<MatchSpan> {
    let mut matches = Vec::new();

    let mut push_field = |field: MatchField, text: &str| {
        let mut positions: Vec<usize> =
            terms.iter().flat_map(|t| matcher::positions(text, t)).collect();
        positions.sort_unstable();
        positions.dedup();
        if !positions.is_empty() {
            matches.push(MatchSpan { field, positions });
        }
    };

    push_field(MatchField::Title, &item.title);
    if let Some(description) = &item.description {
        push_field(MatchField::Description, description);
    }
    if let Some(content) = &item.content {
        push_field(MatchField::Content, content);
    }
    for tag in &item.tags {
        push_field(MatchField::Tag, tag);
    }

    matches
}
