//! Text matcher: case-insensitive field matching primitives.
//!
//! Pure leaf utilities shared by both rankers and by highlighting. Scoring is
//! a three-tier ladder (exact > prefix > substring); position finding is an
//! overlap-permitting scan so repeated and self-overlapping occurrences are
//! all reported.

/// Score a single field against a query: `weight * 3` for exact equality,
/// `weight * 2` for a prefix match, `weight * 1` for a substring match,
/// `0.0` otherwise. Comparison is case-insensitive.
pub fn scored(text: &str, query: &str, weight: f64) -> f64 {
    if text.is_empty() || query.is_empty() {
        return 0.0;
    }
    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    if text_lower == query_lower {
        weight * 3.0
    } else if text_lower.starts_with(&query_lower) {
        weight * 2.0
    } else if text_lower.contains(&query_lower) {
        weight * 1.0
    } else {
        0.0
    }
}

/// Every match start offset of `query` in `text`, case-insensitive, ascending.
/// The scan advances one character past each hit, so overlapping occurrences
/// (e.g. "aa" in "aaa") are all reported.
pub fn positions(text: &str, query: &str) -> Vec<usize> {
    if text.is_empty() || query.is_empty() {
        return Vec::new();
    }
    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    let mut out = Vec::new();
    let mut from = 0;
    while let Some(rel) = text_lower[from..].find(&query_lower) {
        let at = from + rel;
        out.push(at);
        // Step one char, not one byte, to stay on a boundary
        from = at
            + text_lower[at..]
                .chars()
                .next()
                .map_or(1, |c| c.len_utf8());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── scored tests ─────────────────────────────────────────────

    #[test]
    fn test_scored_exact() {
        assert_eq!(scored("Quickstart", "quickstart", 10.0), 30.0);
    }

    #[test]
    fn test_scored_prefix() {
        assert_eq!(scored("Quickstart Guide", "quickstart", 10.0), 20.0);
    }

    #[test]
    fn test_scored_substring() {
        assert_eq!(scored("Advanced Quickstart Guide", "quickstart", 10.0), 10.0);
    }

    #[test]
    fn test_scored_no_match() {
        assert_eq!(scored("Reference", "quickstart", 10.0), 0.0);
    }

    #[test]
    fn test_scored_empty_inputs() {
        assert_eq!(scored("", "query", 10.0), 0.0);
        assert_eq!(scored("text", "", 10.0), 0.0);
    }

    #[test]
    fn test_scored_monotonic_ladder() {
        let w = 8.0;
        let exact = scored("install", "install", w);
        let prefix = scored("installation", "install", w);
        let substring = scored("reinstall", "install", w);
        assert!(exact >= prefix, "exact should score at least prefix");
        assert!(prefix >= substring, "prefix should score at least substring");
        assert!(substring > 0.0);
    }

    // ── positions tests ──────────────────────────────────────────

    #[test]
    fn test_positions_case_insensitive() {
        assert_eq!(positions("Hello hello HELLO", "hello"), vec![0, 6, 12]);
    }

    #[test]
    fn test_positions_overlapping() {
        assert_eq!(positions("aaa", "aa"), vec![0, 1]);
    }

    #[test]
    fn test_positions_none() {
        assert!(positions("hello world", "xyz").is_empty());
    }

    #[test]
    fn test_positions_empty_query() {
        assert!(positions("hello", "").is_empty());
    }

    #[test]
    fn test_positions_ascending() {
        let pos = positions("ababab", "ab");
        assert_eq!(pos, vec![0, 2, 4]);
        assert!(pos.windows(2).all(|w| w[0] < w[1]));
    }
}
