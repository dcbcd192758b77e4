// src/dedup/similarity.rs
//! Lexical near-duplicate test over composite keys.

use std::collections::HashSet;

use serde::Deserialize;

use crate::dedup::canonical::is_blank_key;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_MIN_TOKEN_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimilaritySettings {
    /// Overlap ratio must be strictly greater than this to match.
    pub threshold: f64,
    /// Tokens must be longer than this many chars to count.
    pub min_token_chars: usize,
}

impl Default for SimilaritySettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_token_chars: DEFAULT_MIN_TOKEN_CHARS,
        }
    }
}

fn significant_tokens(key: &str, min_chars: usize) -> Vec<&str> {
    key.split_whitespace()
        .filter(|t| t.chars().count() > min_chars)
        .collect()
}

/// Shared significant tokens divided by the larger token count.
///
/// Tokens of `a` are counted once per occurrence (repeats are not folded).
/// Returns `None` when neither key has a significant token.
pub fn overlap_ratio(a: &str, b: &str, min_token_chars: usize) -> Option<f64> {
    let ta = significant_tokens(a, min_token_chars);
    let tb = significant_tokens(b, min_token_chars);
    let denom = ta.len().max(tb.len());
    if denom == 0 {
        return None;
    }
    let set_b: HashSet<&str> = tb.into_iter().collect();
    let common = ta.iter().filter(|t| set_b.contains(*t)).count();
    Some(common as f64 / denom as f64)
}

/// `a` is the incoming item's key, `b` the group representative's.
pub fn is_same_news(a: &str, b: &str, settings: &SimilaritySettings) -> bool {
    if is_blank_key(a) && is_blank_key(b) {
        return false;
    }
    if a == b {
        return true;
    }
    overlap_ratio(a, b, settings.min_token_chars).is_some_and(|r| r > settings.threshold)
}
