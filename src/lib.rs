// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod dedup;
pub mod history;
pub mod ingest;
pub mod metrics;

pub use crate::api::{router, AppState};
pub use crate::ingest::{Aggregation, Aggregator};

use std::sync::Arc;

use crate::config::AppSettings;
use crate::ingest::config::SourcesConfig;
use crate::ingest::providers::{build_http_client, build_providers};

/// Wire an [`Aggregator`] from a loaded source list: resolves settings
/// (file table, then env), builds the shared HTTP client and one provider
/// per source.
pub fn build_aggregator(cfg: &SourcesConfig) -> anyhow::Result<Aggregator> {
    let settings = AppSettings::resolve(&cfg.settings);
    if !settings.is_stock_similarity() {
        tracing::info!(
            threshold = settings.similarity.threshold,
            min_token_chars = settings.similarity.min_token_chars,
            "non-default similarity settings"
        );
    }

    let client = build_http_client(settings.fetch_timeout)?;
    let gateway = Arc::new(settings.gateway.clone());
    let providers = build_providers(&cfg.sources, &client, &gateway);

    Ok(Aggregator::new(providers)
        .with_similarity(settings.similarity)
        .with_max_groups(settings.max_groups))
}
