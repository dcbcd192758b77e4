// src/ingest/config.rs
//! Source list loading: TOML or JSON file with `feeds` and `telegram`
//! entries plus an optional `[settings]` table.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::settings::SettingsSection;
use crate::ingest::types::{SourceDescriptor, SourceKind};

pub const ENV_SOURCES_PATH: &str = "NEWS_SOURCES_PATH";
pub const DEFAULT_SOURCES_TOML: &str = "config/sources.toml";
pub const DEFAULT_SOURCES_JSON: &str = "config/sources.json";

/// Sources of the original deployment, used when no file is configured.
const BUILTIN_FEEDS: &[(&str, &str)] = &[
    ("Лента.ру", "https://lenta.ru/rss/news"),
    ("РИА Новости", "https://ria.ru/export/rss2/index.xml"),
    ("Коммерсантъ", "https://www.kommersant.ru/rss/news.xml"),
    ("ТАСС", "https://tass.ru/rss/v2.xml"),
    ("Ведомости", "https://www.vedomosti.ru/rss/news"),
];
const BUILTIN_CHANNELS: &[&str] = &["rian_ru", "tass_agency", "rbc_news"];

#[derive(Debug, Clone, Default)]
pub struct SourcesConfig {
    pub sources: Vec<SourceDescriptor>,
    pub settings: SettingsSection,
}

impl SourcesConfig {
    pub fn builtin() -> Self {
        let mut sources: Vec<SourceDescriptor> = BUILTIN_FEEDS
            .iter()
            .map(|(name, url)| SourceDescriptor::feed(*name, *url))
            .collect();
        sources.extend(BUILTIN_CHANNELS.iter().map(|c| SourceDescriptor::telegram(*c)));
        Self {
            sources,
            settings: SettingsSection::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    feeds: Vec<FeedEntry>,
    #[serde(default)]
    telegram: Vec<ChannelEntry>,
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    #[serde(default)]
    name: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChannelEntry {
    channel: String,
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<SourcesConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load sources using env var + fallbacks:
/// 1) $NEWS_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in list
pub fn load_sources_default() -> Result<SourcesConfig> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from(DEFAULT_SOURCES_TOML);
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from(DEFAULT_SOURCES_JSON);
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(SourcesConfig::builtin())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<SourcesConfig> {
    let file: SourcesFile = if hint_ext == "json" {
        serde_json::from_str(s).context("parsing sources json")?
    } else if hint_ext == "toml" {
        toml::from_str(s).context("parsing sources toml")?
    } else {
        // No usable extension: try TOML, then JSON
        match toml::from_str(s) {
            Ok(v) => v,
            Err(_) => serde_json::from_str(s).map_err(|_| anyhow!("unsupported sources format"))?,
        }
    };
    Ok(SourcesConfig {
        sources: clean_list(file.feeds, file.telegram),
        settings: file.settings,
    })
}

/// Trim, drop blanks, drop repeated targets (first one wins).
fn clean_list(feeds: Vec<FeedEntry>, channels: Vec<ChannelEntry>) -> Vec<SourceDescriptor> {
    let feeds = feeds.into_iter().filter_map(|f| {
        let url = f.url.trim();
        if url.is_empty() {
            return None;
        }
        let name = f
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(url);
        Some(SourceDescriptor::feed(name, url))
    });
    let channels = channels
        .into_iter()
        .map(|c| SourceDescriptor::telegram(c.channel))
        .filter(|d| !d.target.is_empty());

    // Channel handles are case-insensitive; feed URL paths are not.
    let mut seen: HashSet<(SourceKind, String)> = HashSet::new();
    feeds
        .chain(channels)
        .filter(|d| {
            let target = match d.kind {
                SourceKind::Feed => d.target.clone(),
                SourceKind::Telegram => d.target.to_lowercase(),
            };
            seen.insert((d.kind, target))
        })
        .collect()
}
