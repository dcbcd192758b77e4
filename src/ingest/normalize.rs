// src/ingest/normalize.rs
use chrono::{DateTime, Utc};
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::types::{CanonicalItem, PublishedAt, RawItem, SourceDescriptor, SourceKind};

/// Label prefix for items that came through the Telegram gateway.
pub const TELEGRAM_LABEL_PREFIX: &str = "Telegram: @";

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    let dt = OffsetDateTime::parse(ts, &Rfc2822).ok()?;
    let utc = dt.to_offset(UtcOffset::UTC);
    DateTime::from_timestamp(utc.unix_timestamp(), utc.nanosecond())
}

fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a feed timestamp. RSS `pubDate` is RFC 2822, Atom and `dc:date`
/// are RFC 3339. Anything else becomes [`PublishedAt::UNKNOWN`].
pub fn parse_published(raw: Option<&str>) -> PublishedAt {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return PublishedAt::UNKNOWN;
    };
    // chrono is more lenient than `time` about RFC 2822 day names and zones.
    let parsed = parse_rfc2822(s)
        .or_else(|| DateTime::parse_from_rfc2822(s).ok().map(|d| d.with_timezone(&Utc)))
        .or_else(|| parse_rfc3339(s));
    PublishedAt(parsed)
}

/// Display label for a source: the feed's own title when it declares one,
/// a synthesized `Telegram: @handle` for gateway channels.
pub fn source_label(source: &SourceDescriptor, feed_title: Option<&str>) -> String {
    match source.kind {
        SourceKind::Feed => feed_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(source.name.as_str())
            .to_string(),
        SourceKind::Telegram => format!("{TELEGRAM_LABEL_PREFIX}{}", source.name),
    }
}

pub fn normalize(raw: RawItem, source: &SourceDescriptor, feed_title: Option<&str>) -> CanonicalItem {
    let content = [raw.summary, raw.content]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    CanonicalItem {
        title: raw.title,
        content,
        link: raw.link,
        published_at: parse_published(raw.pub_date.as_deref()),
        source_name: source_label(source, feed_title),
        source_ref: source.target.clone(),
        source_kind: source.kind,
    }
}
