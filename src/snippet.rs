//! Snippet and highlight generation for search-result previews.
//!
//! Snippets are a bounded window of word tokens centered on the first query
//! occurrence, hard-capped at `max_length` characters with `...` markers when
//! the window does not reach a text boundary. Highlighting comes in two
//! shapes: structured ranges for UI layers that render their own marks, and
//! inline `<mark>`-wrapped HTML with everything else escaped.

use serde::{Deserialize, Serialize};

use crate::matcher;

/// Truncation marker. Kept ASCII so a capped snippet is at most
/// `max_length + 3` characters including the trailing marker.
const ELLIPSIS: &str = "...";

/// A half-open `[start, end)` byte range of matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

/// Text plus the ranges inside it that matched the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightedText {
    pub text: String,
    pub ranges: Vec<HighlightSpan>,
}

/// Snippet shaping knobs.
#[derive(Debug, Clone, Copy)]
pub struct SnippetOptions {
    /// Hard character cap on the snippet body (a trailing `...` may follow).
    pub max_length: usize,
    /// Word tokens kept on each side of the match.
    pub surrounding_words: usize,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            max_length: 200,
            surrounding_words: 10,
        }
    }
}

/// All match ranges of `query` in `text`. Empty when the query is empty.
pub fn highlight_matches(text: &str, query: &str) -> HighlightedText {
    HighlightedText {
        text: text.to_string(),
        ranges: term_spans(text, query),
    }
}

/// A bounded context window around the first case-insensitive occurrence of
/// `query` in `text`.
///
/// With no occurrence the head of the text is returned, `...`-terminated if
/// truncated. Otherwise the window spans `surrounding_words` word tokens on
/// each side of the token containing the match, `...`-prefixed/suffixed when
/// it does not reach the corresponding text boundary. Output never exceeds
/// `max_length + 3` characters; the leading marker counts against the cap,
/// the single trailing marker does not.
pub fn generate_snippet(text: &str, query: &str, options: &SnippetOptions) -> String {
    let first = matcher::positions(text, query).into_iter().next();

    let Some(match_at) = first else {
        return head_excerpt(text, options.max_length);
    };

    let words = word_ranges(text);
    if words.is_empty() {
        return head_excerpt(text, options.max_length);
    }

    // Token containing (or last token starting before) the match offset
    let center = words
        .iter()
        .rposition(|&(start, _)| start <= match_at)
        .unwrap_or(0);

    let from = center.saturating_sub(options.surrounding_words);
    let to = (center + options.surrounding_words).min(words.len() - 1);
    let body = &text[words[from].0..words[to].1];

    let mut out = String::new();
    let mut budget = options.max_length;
    if from > 0 {
        out.push_str(ELLIPSIS);
        budget = budget.saturating_sub(ELLIPSIS.len());
    }

    let mut body_truncated = false;
    for (taken, ch) in body.chars().enumerate() {
        if taken >= budget {
            body_truncated = true;
            break;
        }
        out.push(ch);
    }

    if body_truncated || to < words.len() - 1 {
        out.push_str(ELLIPSIS);
    }
    out
}

/// HTML-escape `text` and wrap every occurrence of `query` in `<mark>`.
/// Overlapping occurrences are unioned into one mark; all non-matching text
/// is preserved verbatim, escaped.
pub fn highlight_html(text: &str, query: &str) -> String {
    let spans = merge_spans(term_spans(text, query));

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in spans {
        // Offsets come from a lowercased scan; skip the rare range that does
        // not land on char boundaries of the original text
        if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end) {
            continue;
        }
        push_escaped(&mut out, &text[cursor..span.start]);
        out.push_str("<mark>");
        push_escaped(&mut out, &text[span.start..span.end]);
        out.push_str("</mark>");
        cursor = span.end;
    }
    push_escaped(&mut out, &text[cursor..]);
    out
}

/// Split a query into terms; a double-quoted phrase is one term.
pub fn tokenize(query: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut in_phrase = false;

    for ch in query.chars() {
        match ch {
            '"' => {
                if in_phrase && !current.is_empty() {
                    terms.push(std::mem::take(&mut current));
                }
                in_phrase = !in_phrase;
            }
            c if c.is_whitespace() && !in_phrase => {
                if !current.is_empty() {
                    terms.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        terms.push(current);
    }
    terms
}

/// Union of match ranges for several terms, sorted by start offset.
pub fn fuzzy_highlight(text: &str, terms: &[String]) -> Vec<HighlightSpan> {
    let spans = terms.iter().flat_map(|t| term_spans(text, t)).collect();
    merge_spans(spans)
}

/// Match spans for one term (start offset plus term length).
fn term_spans(text: &str, query: &str) -> Vec<HighlightSpan> {
    let len = query.to_lowercase().len();
    matcher::positions(text, query)
        .into_iter()
        .map(|start| HighlightSpan { start, end: start + len })
        .collect()
}

/// Sort spans and merge any that touch or overlap.
fn merge_spans(mut spans: Vec<HighlightSpan>) -> Vec<HighlightSpan> {
    spans.sort_by_key(|s| (s.start, s.end));
    let mut merged: Vec<HighlightSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Head of the text, `...`-terminated when it had to be cut.
fn head_excerpt(text: &str, max_length: usize) -> String {
    let mut out: String = text.chars().take(max_length).collect();
    if text.chars().count() > max_length {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Byte ranges of whitespace-separated word tokens.
fn word_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = None;
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                ranges.push((s, idx));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        ranges.push((s, text.len()));
    }
    ranges
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
