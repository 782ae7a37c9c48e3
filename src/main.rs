//! vpn-compare: binary entrypoint.
//! Boots the Axum HTTP server, the refresh scheduler, and shared state.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vpn_compare::ingest::scheduler::{spawn_refresh_scheduler, RefreshSchedulerCfg};
use vpn_compare::metrics::Metrics;
use vpn_compare::{build_state, router, AppConfig};

/// Compact logs; `RUST_LOG` overrides the default filter. A no-op when the
/// runtime already installed a subscriber.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vpn_compare=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load_default()?;
    // Recorder goes in before the first refresh can emit anything.
    let metrics = Metrics::init(cfg.cache_max_age_secs)
        .map_err(|e| tracing::warn!(error = ?e, "metrics endpoint disabled"))
        .ok();
    let state = build_state(&cfg)?;

    spawn_refresh_scheduler(
        RefreshSchedulerCfg {
            interval_secs: cfg.refresh_interval_secs,
            run_immediately: cfg.refresh_on_startup,
        },
        Arc::clone(&state.refresher),
    );

    let mut app = router(state);
    if let Some(m) = metrics {
        app = app.merge(m.router());
    }

    Ok(app.into())
}
