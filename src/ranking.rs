//! Weighted-field ranker and recency boost.
//!
//! The weighted ranker sums per-field tier scores (exact/prefix/substring via
//! the text matcher) with fixed field weights, title dominating. Ties keep
//! corpus order: the sort is stable and there is no secondary key.

use crate::matcher;
use crate::models::{MatchField, MatchSpan, RankResult, RankableItem};

/// Field weights. Title matches dominate, tags outrank descriptions, body
/// content is a weak signal on its own.
pub const TITLE_WEIGHT: f64 = 10.0;
pub const DESCRIPTION_WEIGHT: f64 = 5.0;
pub const CONTENT_WEIGHT: f64 = 1.0;
pub const TAG_WEIGHT: f64 = 8.0;

/// Default multiplier ceiling for [`boost_recent`].
pub const DEFAULT_MAX_BOOST: f64 = 1.5;

/// Rank a corpus snapshot against a query with weighted field scoring.
///
/// Items with a non-positive total score are dropped. Absent optional fields
/// contribute zero score and zero matches. The result is sorted by score
/// descending; equal scores preserve corpus order.
pub fn rank(items: &[RankableItem], query: &str) -> Vec<RankResult> {
    if items.is_empty() || query.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<RankResult> = items
        .iter()
        .filter_map(|item| score_item(item, query))
        .collect();

    sort_by_score(&mut results);
    results
}

/// Score one item; `None` when nothing matched.
fn score_item(item: &RankableItem, query: &str) -> Option<RankResult> {
    let mut score = 0.0;
    let mut matches = Vec::new();

    score += field_score(&item.title, query, TITLE_WEIGHT, MatchField::Title, &mut matches);
    if let Some(description) = &item.description {
        score += field_score(
            description,
            query,
            DESCRIPTION_WEIGHT,
            MatchField::Description,
            &mut matches,
        );
    }
    if let Some(content) = &item.content {
        score += field_score(content, query, CONTENT_WEIGHT, MatchField::Content, &mut matches);
    }
    for tag in &item.tags {
        score += field_score(tag, query, TAG_WEIGHT, MatchField::Tag, &mut matches);
    }

    if let Some(weight) = item.weight {
        score *= weight;
    }

    if score <= 0.0 {
        return None;
    }

    Some(RankResult {
        item: item.clone(),
        score,
        matches,
    })
}

/// Score a single field and record its match span when it matched.
fn field_score(
    text: &str,
    query: &str,
    weight: f64,
    field: MatchField,
    matches: &mut Vec<MatchSpan>,
) -> f64 {
    let score = matcher::scored(text, query, weight);
    if score > 0.0 {
        let positions = matcher::positions(text, query);
        if !positions.is_empty() {
            matches.push(MatchSpan { field, positions });
        }
    }
    score
}

/// Stable descending sort by score. Equal scores keep their current order,
/// which is how tie-breaking works in this engine: no secondary key.
pub(crate) fn sort_by_score(results: &mut [RankResult]) {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}

/// Multiply every score by a recency factor and re-sort.
///
/// The newest document (per `date_of`, any consistent timestamp unit) gets the
/// full `max_boost` multiplier; the oldest gets 1.0; the span between them is
/// linear. The spread is floored at 1 to avoid dividing by zero when all
/// documents share a timestamp.
///
/// This is a pure, order-sensitive post-pass: applying it twice compounds the
/// boost. Callers apply it exactly once per ranking pass.
pub fn boost_recent<F>(
    mut results: Vec<RankResult>,
    now: i64,
    max_boost: f64,
    date_of: F,
) -> Vec<RankResult>
where
    F: Fn(&RankableItem) -> i64,
{
    if results.is_empty() {
        return results;
    }

    let oldest = results.iter().map(|r| date_of(&r.item)).min().unwrap_or(now);
    let range = (now - oldest).max(1) as f64;

    for result in &mut results {
        let age = (now - date_of(&result.item)) as f64;
        let factor = 1.0 + (max_boost - 1.0) * (1.0 - age / range);
        result.score *= factor;
    }

    sort_by_score(&mut results);
    results
}
