// tests/api_http.rs
//
// HTTP-level tests for the public Router without opening sockets.
// Providers are in-process fakes, so no network is touched.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use news_aggregator::ingest::types::{
    FetchedFeed, ParsedFeed, RawItem, SourceDescriptor, SourceProvider,
};
use news_aggregator::{router, AppState, Aggregator};

const BODY_LIMIT: usize = 1024 * 1024;

struct Canned {
    source: SourceDescriptor,
    title: Option<&'static str>,
    items: Vec<(&'static str, &'static str)>,
}

#[async_trait]
impl SourceProvider for Canned {
    async fn fetch(&self) -> Result<FetchedFeed> {
        Ok(FetchedFeed {
            source: self.source.clone(),
            feed: ParsedFeed {
                title: self.title.map(str::to_string),
                items: self
                    .items
                    .iter()
                    .map(|(title, date)| RawItem {
                        title: title.to_string(),
                        link: format!("https://example.test/{}", title.len()),
                        summary: Some(format!("{title}. Подробности позже")),
                        content: None,
                        pub_date: Some(date.to_string()),
                    })
                    .collect(),
            },
            served_by: self.source.target.clone(),
        })
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.source
    }
}

struct Down(SourceDescriptor);

#[async_trait]
impl SourceProvider for Down {
    async fn fetch(&self) -> Result<FetchedFeed> {
        Err(anyhow!("connection reset"))
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.0
    }
}

fn test_router() -> Router {
    let providers: Vec<Arc<dyn SourceProvider>> = vec![
        Arc::new(Canned {
            source: SourceDescriptor::feed("lenta", "https://lenta.test/rss"),
            title: Some("Лента.ру"),
            items: vec![
                ("ЦБ поднял ставку", "Mon, 01 Jan 2024 10:00:00 +0300"),
                ("Футбольный матч завершился", "Mon, 01 Jan 2024 12:30:00 +0300"),
            ],
        }),
        Arc::new(Down(SourceDescriptor::feed("ria", "https://ria.test/rss"))),
        Arc::new(Canned {
            source: SourceDescriptor::telegram("@rbc_news"),
            title: Some("РБК - Telegram"),
            items: vec![("ЦБ поднял ставку", "Mon, 01 Jan 2024 06:55:00 +0000")],
        }),
    ];
    router(AppState::new(Aggregator::new(providers)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn health_returns_200_and_ok_body() {
    let (status, bytes) = get(test_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).expect("utf8"), "ok");
}

#[tokio::test]
async fn test_route_reports_server_alive() {
    let (status, bytes) = get(test_router(), "/api/test").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(v["message"], "Сервер работает!");
}

#[tokio::test]
async fn news_returns_grouped_ranked_payload() {
    let (status, bytes) = get(test_router(), "/api/news").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&bytes).expect("json");

    assert_eq!(v["success"], true);
    assert_eq!(v["count"], 2, "two stories after grouping");
    assert_eq!(v["totalSources"], 3, "raw items, failed source contributes none");

    let news = v["news"].as_array().expect("news array");
    assert_eq!(news.len(), 2);

    // Football (09:30Z) is newer than the rate story's earliest copy (06:55Z).
    assert_eq!(news[0]["title"], "Футбольный матч завершился");
    let rate = &news[1];
    assert_eq!(rate["title"], "ЦБ поднял ставку");
    assert_eq!(rate["earliestPubDate"], "2024-01-01T06:55:00Z");

    let sources = rate["sources"].as_array().expect("sources array");
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["sourceName"], "Лента.ру");
    assert_eq!(sources[1]["sourceName"], "Telegram: @rbc_news");
    assert_eq!(sources[1]["sourceKind"], "telegram");
    for key in ["id", "content", "link"] {
        assert!(rate.get(key).is_some(), "missing '{key}'");
    }
}

#[tokio::test]
async fn debug_runs_records_each_news_call() {
    let app = test_router();

    let (_, bytes) = get(app.clone(), "/debug/runs").await;
    let v: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(v.as_array().map(Vec::len), Some(0));

    let (status, _) = get(app.clone(), "/api/news").await;
    assert_eq!(status, StatusCode::OK);

    let (_, bytes) = get(app, "/debug/runs").await;
    let v: Json = serde_json::from_slice(&bytes).expect("json");
    let runs = v.as_array().expect("runs array");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["ok"], true);
    assert_eq!(runs[0]["failed_sources"], 1);
    assert_eq!(runs[0]["total_groups"], 2);
}

#[tokio::test]
async fn news_with_no_sources_is_empty_success() {
    let app = router(AppState::new(Aggregator::new(Vec::new())));
    let (status, bytes) = get(app, "/api/news").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(v["success"], true);
    assert_eq!(v["count"], 0);
    assert_eq!(v["news"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn news_returns_500_when_grouping_stage_fails() {
    let providers: Vec<Arc<dyn SourceProvider>> = vec![Arc::new(Canned {
        source: SourceDescriptor::feed("lenta", "https://lenta.test/rss"),
        title: Some("Лента.ру"),
        items: vec![("ЦБ поднял ставку", "Mon, 01 Jan 2024 10:00:00 +0300")],
    })];
    let aggregator = Aggregator::new(providers).with_grouping(|_, _| panic!("grouping bug"));
    let app = router(AppState::new(aggregator));

    let (status, bytes) = get(app.clone(), "/api/news").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let v: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(v["success"], false);
    assert_eq!(v["error"], "Ошибка при получении новостей");
    assert!(v.get("news").is_none());

    let (_, bytes) = get(app, "/debug/runs").await;
    let v: Json = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(v[0]["ok"], false);
}
