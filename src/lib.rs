// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod refresh;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

pub use crate::api::{router, AppState};
pub use crate::config::AppConfig;
pub use crate::refresh::{RefreshOutcome, Refresher, SkipReason};
pub use crate::store::{Snapshot, SnapshotStore};

use crate::ingest::types::AdapterContext;

/// Wire store, adapters and refresher from config. Does not start the scheduler.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("vpn-compare/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4))
        .build()
        .context("building http client")?;
    let ctx = AdapterContext::new(http, cfg.adapters.clone());

    let store = SnapshotStore::from_config(&cfg.store)?;
    let adapters = ingest::providers::registered_adapters(cfg);
    tracing::info!(
        adapters = ?adapters.iter().map(|a| a.name()).collect::<Vec<_>>(),
        backend = ?cfg.store.backend,
        "pipeline configured"
    );

    let refresher = Arc::new(Refresher::new(adapters, ctx, store));
    Ok(AppState::new(
        refresher,
        cfg.cache_max_age_secs,
        cfg.trigger_token.clone(),
    ))
}
