//! Prometheus exposition for the aggregation pipeline.

use anyhow::Context;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use shuttle_axum::axum::{http::header, response::IntoResponse, routing::get, Router};

pub const ITEMS_TOTAL: &str = "aggregate_items_total";
pub const GROUPS_TOTAL: &str = "aggregate_groups_total";
pub const SOURCE_ERRORS_TOTAL: &str = "aggregate_source_errors_total";
pub const GATEWAY_FALLBACK_TOTAL: &str = "aggregate_gateway_fallback_total";
pub const FETCH_MS: &str = "aggregate_fetch_ms";
pub const LAST_RUN_TS: &str = "aggregate_last_run_ts";

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Register help text for every series once per process, so they are
/// listed on `/metrics` even before the first aggregation.
pub fn describe_series() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(ITEMS_TOTAL, "Raw items parsed from sources.");
        describe_counter!(GROUPS_TOTAL, "Groups produced by deduplication.");
        describe_counter!(
            SOURCE_ERRORS_TOTAL,
            "Sources that contributed zero items due to fetch/parse errors."
        );
        describe_counter!(
            GATEWAY_FALLBACK_TOTAL,
            "Gateway fetches served by the secondary endpoint."
        );
        describe_histogram!(FETCH_MS, "Per-source fetch+parse time in milliseconds.");
        describe_gauge!(LAST_RUN_TS, "Unix ts when aggregation last ran.");
    });
}

pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if a recorder is
    /// already installed in this process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe_series();
        Ok(Self { handle })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// `GET /metrics` in the text exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let body = handle.render();
                async move { ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body).into_response() }
            }),
        )
    }
}
