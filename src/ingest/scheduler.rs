// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::refresh::{RefreshOutcome, Refresher};

#[derive(Clone, Copy, Debug)]
pub struct RefreshSchedulerCfg {
    pub interval_secs: u64,
    /// Fire the first refresh immediately instead of after one interval.
    pub run_immediately: bool,
}

/// Spawn the in-process cron: call `refresh_now` every `interval_secs`.
/// Returns `None` when the interval is 0 (an external trigger drives refreshes).
pub fn spawn_refresh_scheduler(
    cfg: RefreshSchedulerCfg,
    refresher: Arc<Refresher>,
) -> Option<JoinHandle<()>> {
    if cfg.interval_secs == 0 {
        tracing::info!(target: "scheduler", "in-process refresh scheduler disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let period = Duration::from_secs(cfg.interval_secs);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        if !cfg.run_immediately {
            // interval() completes its first tick at once
            ticker.tick().await;
        }
        loop {
            ticker.tick().await;
            tracing::info!(target: "scheduler", "cron refresh started");
            match refresher.refresh_now().await {
                RefreshOutcome::Published { records, .. } => {
                    tracing::info!(target: "scheduler", records, "cron refresh published")
                }
                RefreshOutcome::Skipped(reason) => {
                    tracing::warn!(target: "scheduler", ?reason, "cron refresh skipped")
                }
            }
        }
    }))
}
