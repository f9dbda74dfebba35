//! tunes-clock - Hourly tune selection by device local time
//!
//! This is the composition root that wires together all the components.
//! Invocations are read as JSON lines from stdin; replies go to stdout.

use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tunes_clock::adapters::inbound::InvocationHandler;
use tunes_clock::adapters::outbound::{
    AlexaAddressResolver, DashMapProcessCache, GoogleMapsClient, SqliteOffsetCache,
};
use tunes_clock::infrastructure::build_http_client;
use tunes_clock::{load_config, OffsetResolutionPipeline, TuneService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging (stderr; stdout carries replies)
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "starting tunes-clock db={} timeout={}s",
        cfg.db_path,
        cfg.http_timeout_secs
    );

    // ===== COMPOSITION ROOT =====

    // 1. Create outbound adapters
    let http = build_http_client(&cfg.http_client())?;

    let address_resolver = Arc::new(AlexaAddressResolver::new(http.clone()));
    let maps = Arc::new(GoogleMapsClient::new(cfg.google_maps(), http));

    let durable_cache = match SqliteOffsetCache::open(&cfg.db_path) {
        Ok(cache) => {
            tracing::info!("offset store opened at {}", cfg.db_path);
            Arc::new(cache)
        }
        Err(e) => {
            tracing::error!("failed to open offset store at {}: {:?}", cfg.db_path, e);
            return Err(e);
        }
    };

    // Lives as long as the process
    let process_cache = Arc::new(DashMapProcessCache::new());

    // 2. Create application services
    let pipeline = OffsetResolutionPipeline::new(
        address_resolver,
        maps.clone(),
        maps,
        durable_cache,
        process_cache,
    );
    let service = Arc::new(TuneService::new(pipeline).with_debug_time(cfg.debug_time_millis));

    // 3. Create inbound adapter and run
    let handler = InvocationHandler::new(service);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let handled = handler.run(stdin, tokio::io::stdout()).await?;

    tracing::info!("input closed after {} invocations", handled);
    Ok(())
}
