// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a source lives: a plain RSS/Atom feed, or a Telegram channel
/// reached through the feed-bridge gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Feed,
    Telegram,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub kind: SourceKind,
    /// Display name for feeds, channel handle (without `@`) for Telegram.
    pub name: String,
    /// Direct URL for feeds, channel handle for gateway lookup.
    pub target: String,
}

impl SourceDescriptor {
    pub fn feed(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Feed,
            name: name.into(),
            target: url.into(),
        }
    }

    pub fn telegram(channel: impl Into<String>) -> Self {
        let channel = channel.into();
        let handle = channel.trim().trim_start_matches('@').to_string();
        Self {
            kind: SourceKind::Telegram,
            name: handle.clone(),
            target: handle,
        }
    }
}

/// One entry as yielded by the feed parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    /// Plain-text snippet (HTML stripped).
    pub summary: Option<String>,
    /// Full body as published.
    pub content: Option<String>,
    /// Raw timestamp text; format is source-defined.
    pub pub_date: Option<String>,
}

/// Feed document after parsing: declared channel title plus entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub items: Vec<RawItem>,
}

/// Result of one successful provider fetch.
#[derive(Debug, Clone)]
pub struct FetchedFeed {
    pub source: SourceDescriptor,
    pub feed: ParsedFeed,
    /// Endpoint that actually served the content.
    pub served_by: String,
}

/// Publish time of an item. `None` is the "unknown" sentinel: it orders
/// below every real timestamp, so undated items sink in a recency sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct PublishedAt(pub Option<DateTime<Utc>>);

impl PublishedAt {
    pub const UNKNOWN: PublishedAt = PublishedAt(None);

    pub fn at(ts: DateTime<Utc>) -> Self {
        Self(Some(ts))
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_none()
    }
}

/// Normalized internal unit. Built once by the normalizer, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalItem {
    pub title: String,
    pub content: String,
    pub link: String,
    pub published_at: PublishedAt,
    pub source_name: String,
    pub source_ref: String,
    pub source_kind: SourceKind,
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch(&self) -> Result<FetchedFeed>;
    fn descriptor(&self) -> &SourceDescriptor;
}
