// src/dedup/mod.rs
//! Near-duplicate grouping: canonical keys, similarity test, greedy
//! grouping engine and recency ranking.

pub mod canonical;
pub mod group;
pub mod rank;
pub mod similarity;

pub use canonical::{canonicalize, composite_key};
pub use group::{group, GroupingEngine, NewsGroup, SourceAttribution};
pub use rank::{rank, Ranked, DEFAULT_MAX_GROUPS};
pub use similarity::{is_same_news, overlap_ratio, SimilaritySettings};

/// Short, stable digest of a group key for logs. Raw text is never logged.
pub(crate) fn key_digest(key: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(key.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
