// src/config/settings.rs
//! Runtime tunables. Defaults reproduce the stock behavior; the sources
//! file `[settings]` table overrides them, and env vars override both.

use serde::Deserialize;
use std::time::Duration;

use crate::dedup::similarity::{DEFAULT_MIN_TOKEN_CHARS, DEFAULT_SIMILARITY_THRESHOLD};
use crate::dedup::{SimilaritySettings, DEFAULT_MAX_GROUPS};
use crate::ingest::providers::GatewayConfig;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

pub const ENV_SIMILARITY_THRESHOLD: &str = "NEWS_SIMILARITY_THRESHOLD";
pub const ENV_MIN_TOKEN_CHARS: &str = "NEWS_MIN_TOKEN_CHARS";
pub const ENV_MAX_GROUPS: &str = "NEWS_MAX_GROUPS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "NEWS_FETCH_TIMEOUT_SECS";
pub const ENV_GATEWAY_PRIMARY: &str = "NEWS_GATEWAY_PRIMARY";
pub const ENV_GATEWAY_SECONDARY: &str = "NEWS_GATEWAY_SECONDARY";

/// `[settings]` table of the sources file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsSection {
    pub similarity_threshold: Option<f64>,
    pub min_token_chars: Option<usize>,
    pub max_groups: Option<usize>,
    pub fetch_timeout_secs: Option<u64>,
    pub gateway: Option<GatewayConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub similarity: SimilaritySettings,
    pub max_groups: usize,
    pub fetch_timeout: Duration,
    pub gateway: GatewayConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            similarity: SimilaritySettings::default(),
            max_groups: DEFAULT_MAX_GROUPS,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            gateway: GatewayConfig::default(),
        }
    }
}

// parse optional float and clamp to <0.0..=1.0>
fn parse_threshold(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

fn parse_positive<T: std::str::FromStr + PartialOrd + Default>(raw: Option<String>) -> Option<T> {
    raw.and_then(|s| s.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl AppSettings {
    /// Resolve with process env.
    pub fn resolve(section: &SettingsSection) -> Self {
        Self::resolve_with(section, |k| std::env::var(k).ok())
    }

    /// Resolve with an injected env lookup (tests pass a map).
    pub fn resolve_with(section: &SettingsSection, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut out = Self::default();

        if let Some(t) = section.similarity_threshold.filter(|t| t.is_finite()) {
            out.similarity.threshold = t.clamp(0.0, 1.0);
        }
        if let Some(n) = section.min_token_chars {
            out.similarity.min_token_chars = n;
        }
        if let Some(n) = section.max_groups.filter(|n| *n > 0) {
            out.max_groups = n;
        }
        if let Some(s) = section.fetch_timeout_secs.filter(|s| *s > 0) {
            out.fetch_timeout = Duration::from_secs(s);
        }
        if let Some(gw) = &section.gateway {
            out.gateway = gw.clone();
        }

        if let Some(t) = parse_threshold(env(ENV_SIMILARITY_THRESHOLD)) {
            out.similarity.threshold = t;
        }
        if let Some(n) = env(ENV_MIN_TOKEN_CHARS).and_then(|s| s.trim().parse::<usize>().ok()) {
            out.similarity.min_token_chars = n;
        }
        if let Some(n) = parse_positive::<usize>(env(ENV_MAX_GROUPS)) {
            out.max_groups = n;
        }
        if let Some(s) = parse_positive::<u64>(env(ENV_FETCH_TIMEOUT_SECS)) {
            out.fetch_timeout = Duration::from_secs(s);
        }
        if let Some(p) = non_blank(env(ENV_GATEWAY_PRIMARY)) {
            out.gateway.primary = p;
        }
        if let Some(p) = non_blank(env(ENV_GATEWAY_SECONDARY)) {
            out.gateway.secondary = p;
        }

        out
    }

    pub fn is_stock_similarity(&self) -> bool {
        self.similarity.threshold == DEFAULT_SIMILARITY_THRESHOLD
            && self.similarity.min_token_chars == DEFAULT_MIN_TOKEN_CHARS
    }
}
