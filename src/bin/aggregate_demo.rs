//! Runs one aggregation pass against the configured sources and prints the
//! `/api/news` payload to stdout.

use news_aggregator::api::NewsResponse;
use news_aggregator::build_aggregator;
use news_aggregator::ingest::config::load_sources_default;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let sources = load_sources_default()?;
    let agg = build_aggregator(&sources)?.aggregate().await?;

    if agg.failed_sources > 0 {
        tracing::warn!(failed = agg.failed_sources, "some sources returned nothing");
    }
    println!("{}", serde_json::to_string_pretty(&NewsResponse::from(agg))?);
    Ok(())
}
