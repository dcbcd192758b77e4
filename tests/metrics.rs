// tests/metrics.rs
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shuttle_axum::axum::body::{self, Body};
use shuttle_axum::axum::http::{Request, StatusCode};
use tower::ServiceExt;

use news_aggregator::ingest::types::{
    FetchedFeed, ParsedFeed, RawItem, SourceDescriptor, SourceProvider,
};
use news_aggregator::metrics::Metrics;
use news_aggregator::Aggregator;

struct OneItem(SourceDescriptor);

#[async_trait]
impl SourceProvider for OneItem {
    async fn fetch(&self) -> Result<FetchedFeed> {
        Ok(FetchedFeed {
            source: self.0.clone(),
            feed: ParsedFeed {
                title: None,
                items: vec![RawItem {
                    title: "Нефть подорожала на мировых биржах".into(),
                    ..RawItem::default()
                }],
            },
            served_by: self.0.target.clone(),
        })
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.0
    }
}

struct Failing(SourceDescriptor);

#[async_trait]
impl SourceProvider for Failing {
    async fn fetch(&self) -> Result<FetchedFeed> {
        Err(anyhow!("timed out"))
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.0
    }
}

// Single test in this binary: the Prometheus recorder is process-global.
#[tokio::test]
async fn metrics_endpoint_contains_aggregation_series() {
    let metrics = Metrics::init().expect("install recorder");

    let providers: Vec<Arc<dyn SourceProvider>> = vec![
        Arc::new(OneItem(SourceDescriptor::feed("ok", "https://ok.test/rss"))),
        Arc::new(Failing(SourceDescriptor::feed("down", "https://down.test/rss"))),
    ];
    let out = Aggregator::new(providers).aggregate().await.expect("aggregate");
    assert_eq!(out.total_groups, 1);

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "aggregate_groups_total",
        "aggregate_last_run_ts",
        "aggregate_source_errors_total",
    ] {
        assert!(text.contains(needle), "missing metric series '{needle}' in:\n{text}");
    }
}
