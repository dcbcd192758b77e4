// src/dedup/group.rs
//! Greedy incremental grouping of near-duplicate items.
//!
//! Each incoming item is compared, in group creation order, against the
//! item that opened each group (its representative) and joins the first
//! group that matches. Later members are never compared against, and groups
//! are never merged or split afterwards. This keeps the pass linear in
//! practice and makes the outcome a pure function of arrival order.

use serde::Serialize;

use crate::dedup::canonical::composite_key;
use crate::dedup::key_digest;
use crate::dedup::similarity::{is_same_news, SimilaritySettings};
use crate::ingest::types::{CanonicalItem, PublishedAt, SourceKind};

/// One origin's contribution to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttribution {
    pub source_name: String,
    pub source_ref: String,
    pub source_kind: SourceKind,
    pub published_at: PublishedAt,
    pub original_title: String,
    pub original_link: String,
}

impl From<&CanonicalItem> for SourceAttribution {
    fn from(it: &CanonicalItem) -> Self {
        Self {
            source_name: it.source_name.clone(),
            source_ref: it.source_ref.clone(),
            source_kind: it.source_kind,
            published_at: it.published_at,
            original_title: it.title.clone(),
            original_link: it.link.clone(),
        }
    }
}

/// A deduplicated story. Representative fields are fixed at creation;
/// only `members` and `earliest_published_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsGroup {
    #[serde(rename = "id")]
    group_key: String,
    title: String,
    content: String,
    link: String,
    #[serde(rename = "earliestPubDate")]
    earliest_published_at: PublishedAt,
    #[serde(rename = "sources")]
    members: Vec<SourceAttribution>,
}

impl NewsGroup {
    fn open(group_key: String, rep: &CanonicalItem) -> Self {
        Self {
            group_key,
            title: rep.title.clone(),
            content: rep.content.clone(),
            link: rep.link.clone(),
            earliest_published_at: rep.published_at,
            members: vec![SourceAttribution::from(rep)],
        }
    }

    fn absorb(&mut self, item: &CanonicalItem) {
        self.earliest_published_at = self.earliest_published_at.min(item.published_at);
        self.members.push(SourceAttribution::from(item));
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn earliest_published_at(&self) -> PublishedAt {
        self.earliest_published_at
    }

    pub fn members(&self) -> &[SourceAttribution] {
        &self.members
    }
}

/// Single-pass grouping state. Feed items in arrival order with
/// [`GroupingEngine::push`], then take the groups with
/// [`GroupingEngine::finish`].
#[derive(Debug, Default)]
pub struct GroupingEngine {
    settings: SimilaritySettings,
    groups: Vec<NewsGroup>,
}

impl GroupingEngine {
    pub fn new(settings: SimilaritySettings) -> Self {
        Self {
            settings,
            groups: Vec::new(),
        }
    }

    /// Classify one item. Returns the index of the group it landed in.
    pub fn push(&mut self, item: &CanonicalItem) -> usize {
        let key = composite_key(&item.title, &item.content);
        let settings = &self.settings;

        if let Some(idx) = self
            .groups
            .iter()
            .position(|g| is_same_news(&key, &g.group_key, settings))
        {
            self.groups[idx].absorb(item);
            tracing::debug!(
                target: "dedup",
                group = %key_digest(&self.groups[idx].group_key),
                source = %item.source_name,
                members = self.groups[idx].members.len(),
                "joined group"
            );
            return idx;
        }

        tracing::debug!(
            target: "dedup",
            group = %key_digest(&key),
            source = %item.source_name,
            "opened group"
        );
        self.groups.push(NewsGroup::open(key, item));
        self.groups.len() - 1
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn finish(self) -> Vec<NewsGroup> {
        self.groups
    }
}

/// Group `items` in the order given.
pub fn group(items: &[CanonicalItem], settings: &SimilaritySettings) -> Vec<NewsGroup> {
    let mut engine = GroupingEngine::new(*settings);
    for it in items {
        engine.push(it);
    }
    engine.finish()
}
