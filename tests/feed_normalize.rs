// tests/feed_normalize.rs
//
// Fixture documents through the parser and normalizer, then the grouping
// stage, without any HTTP.

use chrono::{TimeZone, Utc};

use news_aggregator::dedup::{group, rank, SimilaritySettings, DEFAULT_MAX_GROUPS};
use news_aggregator::ingest::feed::parse_feed_str;
use news_aggregator::ingest::normalize::normalize;
use news_aggregator::ingest::types::{CanonicalItem, PublishedAt, SourceDescriptor, SourceKind};

const LENTA: &str = include_str!("fixtures/lenta_rss.xml");
const TELEGRAM: &str = include_str!("fixtures/telegram_mrss.xml");

fn normalized(xml: &str, source: &SourceDescriptor) -> Vec<CanonicalItem> {
    let feed = parse_feed_str(xml).expect("fixture parses");
    let title = feed.title.clone();
    feed.items
        .into_iter()
        .map(|raw| normalize(raw, source, title.as_deref()))
        .collect()
}

#[test]
fn rss_fixture_normalizes_with_channel_title_and_clean_text() {
    let src = SourceDescriptor::feed("lenta", "https://lenta.ru/rss/news");
    let items = normalized(LENTA, &src);
    assert_eq!(items.len(), 3);

    let first = &items[0];
    assert_eq!(first.title, "ЦБ поднял ставку");
    assert_eq!(first.content, "Банк России повысил ключевую ставку до 16 процентов");
    assert_eq!(first.link, "https://lenta.ru/news/2024/01/01/cb/");
    assert_eq!(first.source_name, "Лента.ру");
    assert_eq!(first.source_ref, "https://lenta.ru/rss/news");
    assert_eq!(first.source_kind, SourceKind::Feed);
    assert_eq!(
        first.published_at,
        PublishedAt::at(Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap())
    );
}

#[test]
fn unparseable_date_is_kept_as_unknown() {
    let src = SourceDescriptor::feed("lenta", "https://lenta.ru/rss/news");
    let items = normalized(LENTA, &src);
    let usd = items
        .iter()
        .find(|i| i.title == "Курс доллара упал")
        .expect("item with bad date is still present");
    assert!(usd.published_at.is_unknown());
    assert_eq!(usd.content, "");

    let ranked = rank(group(&items, &SimilaritySettings::default()), DEFAULT_MAX_GROUPS);
    assert_eq!(ranked.groups.len(), 3);
    assert_eq!(ranked.groups.last().map(|g| g.title()), Some("Курс доллара упал"));
}

#[test]
fn gateway_fixture_gets_synthesized_label() {
    let src = SourceDescriptor::telegram("@rbc_news");
    let items = normalized(TELEGRAM, &src);
    assert_eq!(items.len(), 2);
    for it in &items {
        assert_eq!(it.source_name, "Telegram: @rbc_news");
        assert_eq!(it.source_ref, "rbc_news");
        assert_eq!(it.source_kind, SourceKind::Telegram);
    }
    assert_eq!(items[0].content, "Банк России повысил ключевую ставку до 16%");
    assert_eq!(items[0].link, "https://t.me/rbc_news/1001");
}

#[test]
fn feed_and_channel_copies_of_one_story_merge() {
    let mut items = normalized(
        LENTA,
        &SourceDescriptor::feed("lenta", "https://lenta.ru/rss/news"),
    );
    items.extend(normalized(TELEGRAM, &SourceDescriptor::telegram("rbc_news")));
    assert_eq!(items.len(), 5);

    let ranked = rank(group(&items, &SimilaritySettings::default()), DEFAULT_MAX_GROUPS);
    assert_eq!(ranked.total_groups, 4);

    let titles: Vec<_> = ranked.groups.iter().map(|g| g.title()).collect();
    assert_eq!(
        titles,
        vec![
            "Футбольный матч завершился",
            "Нефть подорожала на мировых биржах",
            "ЦБ поднял ставку",
            "Курс доллара упал",
        ]
    );

    let rate = &ranked.groups[2];
    // Lenta arrived first and stays representative; the channel copy is earlier.
    assert_eq!(rate.link(), "https://lenta.ru/news/2024/01/01/cb/");
    assert_eq!(
        rate.earliest_published_at(),
        PublishedAt::at(Utc.with_ymd_and_hms(2024, 1, 1, 6, 55, 0).unwrap())
    );
    assert_eq!(rate.members().len(), 2);
}

#[test]
fn item_with_pub_date_and_dc_date_keeps_its_timestamp() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>ТАСС</title>
    <item>
      <title>Заголовок</title>
      <media:title>Медиа</media:title>
      <link>https://tass.ru/1</link>
      <pubDate>Mon, 01 Jan 2024 10:00:00 +0300</pubDate>
      <dc:date>2024-01-01T07:00:00Z</dc:date>
    </item>
  </channel>
</rss>"#;
    let items = normalized(xml, &SourceDescriptor::feed("tass", "https://tass.ru/rss/v2.xml"));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Заголовок");
    assert_eq!(
        items[0].published_at,
        PublishedAt::at(Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap())
    );
}
