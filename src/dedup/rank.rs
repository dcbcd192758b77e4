// src/dedup/rank.rs
use crate::dedup::group::NewsGroup;

/// Max groups handed to the API layer.
pub const DEFAULT_MAX_GROUPS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    /// Newest first, at most `limit` entries.
    pub groups: Vec<NewsGroup>,
    /// Group count before truncation.
    pub total_groups: usize,
}

/// Stable sort by `earliest_published_at`, newest first, then truncate.
/// Equal timestamps keep arrival order; undated groups sink to the end.
pub fn rank(mut groups: Vec<NewsGroup>, limit: usize) -> Ranked {
    let total_groups = groups.len();
    groups.sort_by(|a, b| b.earliest_published_at().cmp(&a.earliest_published_at()));
    groups.truncate(limit);
    Ranked {
        groups,
        total_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::group::group;
    use crate::dedup::similarity::SimilaritySettings;
    use crate::ingest::types::{CanonicalItem, PublishedAt, SourceKind};
    use chrono::{TimeZone, Utc};

    fn item(title: &str, ts: Option<i64>) -> CanonicalItem {
        CanonicalItem {
            title: title.to_string(),
            content: String::new(),
            link: String::new(),
            published_at: PublishedAt(ts.map(|s| Utc.timestamp_opt(s, 0).unwrap())),
            source_name: "src".into(),
            source_ref: "https://src.test/rss".into(),
            source_kind: SourceKind::Feed,
        }
    }

    fn groups_of(items: &[CanonicalItem]) -> Vec<NewsGroup> {
        group(items, &SimilaritySettings::default())
    }

    #[test]
    fn newest_first_and_undated_last() {
        let groups = groups_of(&[
            item("первая новость дня", Some(10)),
            item("вторая история часа", None),
            item("третья заметка утра", Some(30)),
        ]);
        let ranked = rank(groups, DEFAULT_MAX_GROUPS);
        let titles: Vec<_> = ranked.groups.iter().map(|g| g.title()).collect();
        assert_eq!(
            titles,
            vec!["третья заметка утра", "первая новость дня", "вторая история часа"]
        );
    }

    #[test]
    fn ties_keep_arrival_order() {
        let groups = groups_of(&[
            item("первая новость дня", Some(5)),
            item("вторая история часа", Some(5)),
            item("третья заметка утра", Some(5)),
        ]);
        let ranked = rank(groups, DEFAULT_MAX_GROUPS);
        let titles: Vec<_> = ranked.groups.iter().map(|g| g.title()).collect();
        assert_eq!(
            titles,
            vec!["первая новость дня", "вторая история часа", "третья заметка утра"]
        );
    }

    #[test]
    fn truncates_and_reports_total() {
        let items: Vec<_> = (0..150)
            .map(|i| item(&format!("уникальная{i} новость{i}"), Some(i)))
            .collect();
        let ranked = rank(groups_of(&items), DEFAULT_MAX_GROUPS);
        assert_eq!(ranked.total_groups, 150);
        assert_eq!(ranked.groups.len(), DEFAULT_MAX_GROUPS);
        assert_eq!(ranked.groups[0].title(), "уникальная149 новость149");
    }
}
