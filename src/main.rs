//! News aggregator binary entrypoint.
//! Boots the Axum HTTP server with the aggregation pipeline and /metrics.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_aggregator::ingest::config::load_sources_default;
use news_aggregator::metrics::Metrics;
use news_aggregator::{build_aggregator, router, AppState};

fn dev_env() -> bool {
    if cfg!(debug_assertions) {
        return true;
    }
    let env = std::env::var("SHUTTLE_ENV").unwrap_or_default();
    ["local", "development", "dev"]
        .iter()
        .any(|e| env.eq_ignore_ascii_case(e))
}

/// Install a local subscriber when `NEWS_DEV_LOG=1` in a dev environment.
/// `NEWS_LOG_JSON=1` switches the compact format to JSON lines.
fn enable_dev_tracing() {
    let flag = |name: &str| std::env::var(name).is_ok_and(|v| v == "1");
    if !(flag("NEWS_DEV_LOG") && dev_env()) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("aggregate=info,dedup=debug,warn"));

    // Shuttle may already own the global subscriber; losing that race is fine.
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if flag("NEWS_LOG_JSON") {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let sources = load_sources_default()?;
    tracing::info!(sources = sources.sources.len(), "sources loaded");

    let aggregator = build_aggregator(&sources)?;
    let metrics = Metrics::init()?;

    let app = router(AppState::new(aggregator)).merge(metrics.router());
    Ok(app.into())
}
