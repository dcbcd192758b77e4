// src/ingest/providers/mod.rs
pub mod direct_feed;
pub mod gateway;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::ingest::feed::parse_feed_bytes;
use crate::ingest::types::{ParsedFeed, SourceDescriptor, SourceKind, SourceProvider};

pub use direct_feed::DirectFeedProvider;
pub use gateway::{GatewayChannelProvider, GatewayConfig};

const USER_AGENT: &str = concat!("news-aggregator/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client. `timeout` bounds every single request (connect + body).
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("building http client")
}

/// GET `url` with `query`, require a 2xx status, parse the body as a feed.
pub(crate) async fn get_feed(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<ParsedFeed> {
    let bytes = client
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("http get {url}"))?
        .error_for_status()
        .with_context(|| format!("error status from {url}"))?
        .bytes()
        .await
        .with_context(|| format!("reading body from {url}"))?;

    parse_feed_bytes(&bytes).with_context(|| format!("parsing feed from {url}"))
}

/// Run `attempt` against each endpoint in order and return the first
/// success together with the index of the endpoint that served it.
/// Failures are logged; `None` means every endpoint failed.
pub async fn try_in_order<'a, T, F, Fut>(endpoints: &'a [String], mut attempt: F) -> Option<(usize, T)>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for (idx, endpoint) in endpoints.iter().enumerate() {
        match attempt(endpoint).await {
            Ok(v) => return Some((idx, v)),
            Err(e) => {
                tracing::warn!(
                    endpoint = %endpoint,
                    attempt = idx + 1,
                    of = endpoints.len(),
                    error = ?e,
                    "endpoint attempt failed"
                );
            }
        }
    }
    None
}

/// One provider per descriptor, in the same order.
pub fn build_providers(
    sources: &[SourceDescriptor],
    client: &reqwest::Client,
    gateway: &Arc<GatewayConfig>,
) -> Vec<Arc<dyn SourceProvider>> {
    sources
        .iter()
        .map(|s| -> Arc<dyn SourceProvider> {
            match s.kind {
                SourceKind::Feed => Arc::new(DirectFeedProvider::new(s.clone(), client.clone())),
                SourceKind::Telegram => Arc::new(GatewayChannelProvider::new(
                    s.clone(),
                    client.clone(),
                    Arc::clone(gateway),
                )),
            }
        })
        .collect()
}
