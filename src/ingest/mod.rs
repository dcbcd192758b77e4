// src/ingest/mod.rs
pub mod config;
pub mod feed;
pub mod normalize;
pub mod providers;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use metrics::{counter, gauge};

use crate::dedup::{self, NewsGroup, SimilaritySettings, DEFAULT_MAX_GROUPS};
use crate::ingest::normalize::normalize;
use crate::ingest::types::{CanonicalItem, FetchedFeed, SourceProvider};
use crate::metrics::{describe_series, GROUPS_TOTAL, LAST_RUN_TS, SOURCE_ERRORS_TOTAL};

/// Outcome of one aggregation pass.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Ranked, truncated groups.
    pub groups: Vec<NewsGroup>,
    /// Group count before truncation.
    pub total_groups: usize,
    /// Raw item count before grouping.
    pub total_items: usize,
    /// Sources that contributed nothing because they failed.
    pub failed_sources: usize,
}

/// Fetch every provider concurrently. Each provider runs in its own task;
/// a failure, panic or timeout only drops that provider's items. Results come
/// back in provider order.
pub async fn fetch_all(providers: &[Arc<dyn SourceProvider>]) -> (Vec<FetchedFeed>, usize) {
    let handles: Vec<_> = providers
        .iter()
        .map(|p| {
            let p = Arc::clone(p);
            tokio::spawn(async move { p.fetch().await })
        })
        .collect();

    let mut fetched = Vec::with_capacity(handles.len());
    let mut failed = 0usize;
    for (handle, p) in handles.into_iter().zip(providers) {
        let name = &p.descriptor().name;
        match handle.await {
            Ok(Ok(f)) => fetched.push(f),
            Ok(Err(e)) => {
                failed += 1;
                tracing::warn!(error = ?e, source = %name, "source fetch failed");
                counter!(SOURCE_ERRORS_TOTAL).increment(1);
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(error = %e, source = %name, "source task aborted");
                counter!(SOURCE_ERRORS_TOTAL).increment(1);
            }
        }
    }
    (fetched, failed)
}

/// Flatten fetched feeds into canonical items, source by source.
pub fn normalize_all(fetched: Vec<FetchedFeed>) -> Vec<CanonicalItem> {
    let mut out = Vec::new();
    for f in fetched {
        let title = f.feed.title.as_deref();
        out.extend(f.feed.items.into_iter().map(|raw| normalize(raw, &f.source, title)));
    }
    out
}

/// Grouping stage signature; [`dedup::group`] unless replaced.
pub type GroupingFn = fn(&[CanonicalItem], &SimilaritySettings) -> Vec<NewsGroup>;

/// The whole pipeline: fetch -> normalize -> group -> rank.
pub struct Aggregator {
    providers: Vec<Arc<dyn SourceProvider>>,
    similarity: SimilaritySettings,
    max_groups: usize,
    grouping: GroupingFn,
}

impl Aggregator {
    pub fn new(providers: Vec<Arc<dyn SourceProvider>>) -> Self {
        Self {
            providers,
            similarity: SimilaritySettings::default(),
            max_groups: DEFAULT_MAX_GROUPS,
            grouping: dedup::group,
        }
    }

    pub fn with_similarity(mut self, similarity: SimilaritySettings) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_max_groups(mut self, max_groups: usize) -> Self {
        self.max_groups = max_groups;
        self
    }

    pub fn with_grouping(mut self, grouping: GroupingFn) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn source_count(&self) -> usize {
        self.providers.len()
    }

    /// Run one pass. Per-source failures are absorbed; an error here means
    /// the grouping stage itself blew up.
    pub async fn aggregate(&self) -> Result<Aggregation> {
        describe_series();

        let (fetched, failed_sources) = fetch_all(&self.providers).await;
        let items = normalize_all(fetched);
        let total_items = items.len();

        let settings = self.similarity;
        let limit = self.max_groups;
        let grouping = self.grouping;
        let ranked = tokio::task::spawn_blocking(move || {
            let groups = grouping(&items, &settings);
            dedup::rank(groups, limit)
        })
        .await
        .map_err(|e| anyhow!("grouping stage failed: {e}"))?;

        let now = chrono::Utc::now().timestamp().max(0);
        counter!(GROUPS_TOTAL).increment(ranked.total_groups as u64);
        gauge!(LAST_RUN_TS).set(now as f64);

        tracing::info!(
            target: "aggregate",
            items = total_items,
            groups = ranked.total_groups,
            returned = ranked.groups.len(),
            failed_sources,
            "aggregation pass done"
        );

        Ok(Aggregation {
            groups: ranked.groups,
            total_groups: ranked.total_groups,
            total_items,
            failed_sources,
        })
    }
}

/// Time an aggregation and return it with its duration in milliseconds.
pub async fn aggregate_timed(agg: &Aggregator) -> (Result<Aggregation>, u64) {
    let t0 = Instant::now();
    let res = agg.aggregate().await;
    (res, t0.elapsed().as_millis() as u64)
}
