// src/dedup/canonical.rs
//! Text canonicalization: the comparison key used for duplicate matching.

/// Max chars kept from a canonicalized string.
pub const MAX_CANONICAL_CHARS: usize = 200;
/// Max chars of canonicalized content that go into a composite key.
pub const KEY_CONTENT_CHARS: usize = 100;
/// Joins title and content in a composite key. `|` never survives
/// [`canonicalize`], and the surrounding spaces keep it a standalone token.
pub const KEY_SEPARATOR: &str = " | ";

fn is_cyrillic_letter(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c) && c.is_alphabetic()
}

fn keep(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_cyrillic_letter(c) || c.is_whitespace()
}

fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Lower-case, map everything except ASCII alphanumerics, Cyrillic letters
/// and whitespace to a space, collapse whitespace, trim, cap at 200 chars.
pub fn canonicalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if keep(c) { c } else { ' ' })
        .collect();

    let collapsed = mapped.split_whitespace().collect::<Vec<_>>().join(" ");
    take_chars(&collapsed, MAX_CANONICAL_CHARS).trim_end().to_string()
}

/// `canonical(title) | first 100 chars of canonical(content)`.
///
/// Serves both as the exact-match fast path and as the group id.
pub fn composite_key(title: &str, content: &str) -> String {
    let title = canonicalize(title);
    let content = canonicalize(content);
    let content = take_chars(&content, KEY_CONTENT_CHARS).trim_end();
    format!("{title}{KEY_SEPARATOR}{content}")
}

/// A key built from two empty texts carries nothing comparable.
pub fn is_blank_key(key: &str) -> bool {
    key.trim() == KEY_SEPARATOR.trim()
}
