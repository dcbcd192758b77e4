// src/ingest/feed.rs
//! Feed parser: RSS 2.0, RSS 1.0 (RDF) and Atom documents into [`ParsedFeed`].
//!
//! Event-driven over `quick_xml::Reader` so that namespaced elements
//! (`content:encoded`, `dc:date`) and Atom `<link href=".."/>` are matched by
//! local name. Timestamps are passed through as raw text; the normalizer owns
//! parsing them.

use anyhow::{bail, Context, Result};
use once_cell::sync::OnceCell;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::ingest::types::{ParsedFeed, RawItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Summary,
    Content,
    Published,
    DcDate,
    Updated,
}

impl Field {
    /// Media RSS (`media:title`, `media:description`) repeats item fields
    /// and is skipped.
    fn from_element(e: &BytesStart<'_>) -> Option<Self> {
        if e.name().prefix().is_some_and(|p| p.as_ref() == b"media") {
            return None;
        }
        match e.local_name().as_ref() {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" | b"summary" => Some(Field::Summary),
            b"content" | b"encoded" => Some(Field::Content),
            b"pubDate" | b"published" | b"issued" => Some(Field::Published),
            b"date" => Some(Field::DcDate),
            b"updated" | b"modified" => Some(Field::Updated),
            _ => None,
        }
    }
}

#[derive(Default)]
struct EntryBuf {
    title: String,
    link: String,
    summary: String,
    content: String,
    published: String,
    dc_date: String,
    updated: String,
}

impl EntryBuf {
    fn slot(&mut self, f: Field) -> &mut String {
        match f {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Published => &mut self.published,
            Field::DcDate => &mut self.dc_date,
            Field::Updated => &mut self.updated,
        }
    }

    fn into_raw(self) -> Option<RawItem> {
        let title = clean_html(&self.title);
        let link = self.link.trim().to_string();
        if title.is_empty() && link.is_empty() {
            return None;
        }
        let pub_date = [self.published, self.dc_date, self.updated]
            .into_iter()
            .map(|d| d.trim().to_string())
            .find(|d| !d.is_empty());
        Some(RawItem {
            title,
            link,
            summary: non_empty(clean_html(&self.summary)),
            content: non_empty(self.content.trim().to_string()),
            pub_date,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parse a feed from raw response bytes. Invalid UTF-8 is replaced lossily.
pub fn parse_feed_bytes(bytes: &[u8]) -> Result<ParsedFeed> {
    let text = String::from_utf8_lossy(bytes);
    parse_feed_str(&text)
}

/// Parse a feed document held in memory.
pub fn parse_feed_str(xml: &str) -> Result<ParsedFeed> {
    let xml = scrub_html_entities_for_xml(xml);
    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut out = ParsedFeed::default();
    let mut root_seen = false;
    // local names of currently open elements
    let mut stack: Vec<Vec<u8>> = Vec::new();
    // depth at which the current <item>/<entry> was opened
    let mut entry_depth: Option<usize> = None;
    let mut entry = EntryBuf::default();
    let mut field: Option<(Field, usize)> = None;
    let mut channel_title: Option<String> = None;
    let mut in_channel_title = false;

    loop {
        let ev = reader
            .read_event()
            .with_context(|| format!("feed xml error at byte {}", reader.buffer_position()))?;
        match ev {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                let depth = stack.len();
                if depth == 0 && matches!(name.as_slice(), b"rss" | b"feed" | b"RDF") {
                    root_seen = true;
                }
                match entry_depth {
                    None if matches!(name.as_slice(), b"item" | b"entry") => {
                        entry_depth = Some(depth);
                        entry = EntryBuf::default();
                    }
                    None if name == b"title" && channel_title.is_none() => {
                        in_channel_title = is_channel_level(&stack);
                    }
                    Some(d) if depth == d + 1 && field.is_none() => {
                        // First element of a kind wins; a repeat never appends.
                        let fresh = Field::from_element(&e).filter(|f| entry.slot(*f).is_empty());
                        if let Some(f) = fresh {
                            if f == Field::Link {
                                take_link_href(&e, &mut entry)?;
                            }
                            field = Some((f, depth));
                        }
                    }
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                if let Some(d) = entry_depth {
                    if stack.len() == d + 1 && e.local_name().as_ref() == b"link" {
                        take_link_href(&e, &mut entry)?;
                    }
                }
            }
            Event::End(_) => {
                stack.pop();
                let depth = stack.len();
                if matches!(field, Some((_, d)) if d == depth) {
                    field = None;
                }
                if entry_depth == Some(depth) {
                    entry_depth = None;
                    if let Some(item) = std::mem::take(&mut entry).into_raw() {
                        out.items.push(item);
                    }
                }
                in_channel_title = false;
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                push_text(&text, field, &mut entry, &mut channel_title, in_channel_title);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                push_text(&text, field, &mut entry, &mut channel_title, in_channel_title);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        bail!("document is not an RSS or Atom feed");
    }
    out.title = channel_title
        .map(|t| clean_html(&t))
        .and_then(non_empty);
    Ok(out)
}

/// `<title>` directly under `<channel>` (RSS) or `<feed>` (Atom).
fn is_channel_level(stack: &[Vec<u8>]) -> bool {
    matches!(stack.last().map(Vec::as_slice), Some(b"channel" | b"feed"))
}

fn push_text(
    text: &str,
    field: Option<(Field, usize)>,
    entry: &mut EntryBuf,
    channel_title: &mut Option<String>,
    in_channel_title: bool,
) {
    if let Some((f, _)) = field {
        let slot = entry.slot(f);
        if !slot.is_empty() {
            slot.push(' ');
        }
        slot.push_str(text);
    } else if in_channel_title {
        channel_title.get_or_insert_with(String::new).push_str(text);
    }
}

/// Atom links carry the URL in `href`; only `rel="alternate"` (or no rel)
/// counts as the article link.
fn take_link_href(e: &BytesStart<'_>, entry: &mut EntryBuf) -> Result<()> {
    let rel = match e.try_get_attribute("rel")? {
        Some(a) => a.unescape_value()?.into_owned(),
        None => String::new(),
    };
    if !(rel.is_empty() || rel == "alternate") || !entry.link.is_empty() {
        return Ok(());
    }
    if let Some(href) = e.try_get_attribute("href")? {
        entry.link = href.unescape_value()?.trim().to_string();
    }
    Ok(())
}

/// Decode entities, strip tags, collapse whitespace.
pub(crate) fn clean_html(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    let stripped = re_tags.replace_all(&decoded, " ");

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// HTML-only named entities are not valid XML; rewrite the common ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&laquo;", "&#171;")
        .replace("&raquo;", "&#187;")
        .replace("&ldquo;", "&#8220;")
        .replace("&rdquo;", "&#8221;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rsquo;", "&#8217;")
        .replace("&hellip;", "&#8230;")
}
