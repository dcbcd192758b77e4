// src/ingest/providers/gateway.rs
//! Telegram channels through an RSS-Bridge style gateway.
//!
//! Request shape: `GET {endpoint}?action=display&bridge=<bridge>&username=<channel>&format=<format>`.
//! The primary endpoint is tried first; on any failure the identical query
//! goes to the secondary endpoint exactly once.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::providers::{get_feed, try_in_order};
use crate::ingest::types::{FetchedFeed, SourceDescriptor, SourceProvider};
use crate::metrics::{FETCH_MS, GATEWAY_FALLBACK_TOTAL, ITEMS_TOTAL};

pub const DEFAULT_GATEWAY_PRIMARY: &str = "https://rss-bridge.org/bridge01/";
pub const DEFAULT_GATEWAY_SECONDARY: &str = "https://rss-bridge.bb8.fun/";
pub const DEFAULT_GATEWAY_BRIDGE: &str = "Telegram";
pub const DEFAULT_GATEWAY_FORMAT: &str = "Mrss";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub primary: String,
    pub secondary: String,
    pub bridge: String,
    pub format: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            primary: DEFAULT_GATEWAY_PRIMARY.to_string(),
            secondary: DEFAULT_GATEWAY_SECONDARY.to_string(),
            bridge: DEFAULT_GATEWAY_BRIDGE.to_string(),
            format: DEFAULT_GATEWAY_FORMAT.to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn endpoints(&self) -> Vec<String> {
        vec![self.primary.clone(), self.secondary.clone()]
    }
}

pub struct GatewayChannelProvider {
    source: SourceDescriptor,
    client: reqwest::Client,
    gateway: Arc<GatewayConfig>,
}

impl GatewayChannelProvider {
    pub fn new(source: SourceDescriptor, client: reqwest::Client, gateway: Arc<GatewayConfig>) -> Self {
        Self {
            source,
            client,
            gateway,
        }
    }
}

#[async_trait]
impl SourceProvider for GatewayChannelProvider {
    async fn fetch(&self) -> Result<FetchedFeed> {
        let t0 = std::time::Instant::now();
        let endpoints = self.gateway.endpoints();
        let query = [
            ("action", "display"),
            ("bridge", self.gateway.bridge.as_str()),
            ("username", self.source.target.as_str()),
            ("format", self.gateway.format.as_str()),
        ];
        let client = &self.client;
        let query = &query;

        let (idx, feed) = try_in_order(&endpoints, |ep| async move { get_feed(client, ep, query).await })
            .await
            .ok_or_else(|| anyhow!("all gateway endpoints failed for channel @{}", self.source.target))?;

        if idx > 0 {
            counter!(GATEWAY_FALLBACK_TOTAL).increment(1);
            tracing::info!(channel = %self.source.target, endpoint = %endpoints[idx], "served by fallback gateway");
        }
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!(FETCH_MS).record(ms);
        counter!(ITEMS_TOTAL).increment(feed.items.len() as u64);

        Ok(FetchedFeed {
            source: self.source.clone(),
            feed,
            served_by: endpoints[idx].clone(),
        })
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.source
    }
}
