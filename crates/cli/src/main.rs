mod probe;

use std::sync::Arc;

use anyhow::Context;
use pricelight_core::config::PricelightCfg;
use pricelight_core::indicator::MemoryIndicator;
use pricelight_core::runtime::{Runtime, Scheduler};
use pricelight_fetch::{HttpPriceSource, PriceSource};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Configuration errors stop the process before anything is shown.
    let cfg = PricelightCfg::from_env().context("failed to load configuration")?;
    let endpoint = cfg.endpoint();
    let scheduler = Scheduler::from_config(&cfg, MemoryIndicator::new())
        .context("invalid appearance configuration")?;

    let source = HttpPriceSource::new();
    tracing::info!(
        name = source.name(),
        url = %endpoint.url(),
        profile = ?cfg.profile,
        "price source initialized"
    );

    let (mut runtime, event_tx, _status_rx) =
        Runtime::new(scheduler, Arc::new(source), cfg.profile.tick_interval());
    runtime.listen_for_signals();
    let token = runtime.token();

    match endpoint.authority() {
        Some(authority) => {
            probe::spawn(
                authority,
                cfg.profile.probe_interval(),
                cfg.profile.fetch_timeout(),
                event_tx,
                token.clone(),
            );
        }
        None => tracing::warn!(url = %endpoint.url(), "endpoint has no host, link probe disabled"),
    }

    let result = runtime.run().await;
    token.cancel();
    result.context("pricelight stopped on a fatal error")?;
    Ok(())
}

/// `RUST_LOG` filter (default `info`); `PRICELIGHT_LOG_JSON=1` for JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("PRICELIGHT_LOG_JSON")
        .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}
