//! Refresh orchestrator: collect, gate, publish.
//!
//! One invocation ends in exactly one of two states. `Published` means the
//! stored snapshot was replaced wholesale; `Skipped` means it was left exactly
//! as it was.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tokio::sync::Mutex;

use crate::ingest::{self, types::AdapterContext, types::SourceAdapter};
use crate::store::{Snapshot, SnapshotStore, StoreError};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("refresh_runs_total", "Refresh invocations by outcome.");
        describe_gauge!(
            "refresh_last_published_ts",
            "Unix ts of the last published snapshot."
        );
        describe_gauge!(
            "refresh_last_batch_size",
            "Records in the last published snapshot."
        );
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Every adapter failed; the previous snapshot stays.
    EmptyBatch,
    /// The store could not be reached; the batch was dropped.
    StoreUnavailable(String),
    /// The snapshot itself was refused on write; the batch was dropped.
    WriteRejected(String),
    /// Another refresh was still in flight.
    AlreadyRunning,
}

impl SkipReason {
    fn label(&self) -> &'static str {
        match self {
            SkipReason::EmptyBatch => "skipped_empty",
            SkipReason::StoreUnavailable(_) => "skipped_store",
            SkipReason::WriteRejected(_) => "skipped_rejected",
            SkipReason::AlreadyRunning => "skipped_busy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Published {
        records: usize,
        created_at: DateTime<Utc>,
    },
    Skipped(SkipReason),
}

pub struct Refresher {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    ctx: Arc<AdapterContext>,
    store: SnapshotStore,
    in_flight: Mutex<()>,
}

impl Refresher {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        ctx: AdapterContext,
        store: SnapshotStore,
    ) -> Self {
        Self {
            adapters,
            ctx: Arc::new(ctx),
            store,
            in_flight: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one refresh cycle. Overlapping calls are rejected, not queued.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        ensure_metrics_described();

        let outcome = match self.in_flight.try_lock() {
            Ok(_guard) => self.run_cycle().await,
            Err(_) => {
                tracing::info!(target: "refresh", "refresh already in flight; skipping");
                RefreshOutcome::Skipped(SkipReason::AlreadyRunning)
            }
        };

        let label = match &outcome {
            RefreshOutcome::Published { .. } => "published",
            RefreshOutcome::Skipped(reason) => reason.label(),
        };
        counter!("refresh_runs_total", "outcome" => label).increment(1);
        outcome
    }

    async fn run_cycle(&self) -> RefreshOutcome {
        let report = ingest::run(&self.adapters, Arc::clone(&self.ctx)).await;

        if report.batch.is_empty() {
            tracing::error!(
                target: "refresh",
                failed = report.failures.len(),
                "no provider data collected; keeping previous snapshot"
            );
            return RefreshOutcome::Skipped(SkipReason::EmptyBatch);
        }

        let snapshot = Snapshot::new(report.batch, Utc::now());
        let records = snapshot.records.len();
        if let Err(e) = self.store.put(&snapshot).await {
            tracing::error!(target: "refresh", error = %e, "snapshot write failed");
            let reason = match e {
                StoreError::Unavailable(msg) => SkipReason::StoreUnavailable(msg),
                other => SkipReason::WriteRejected(other.to_string()),
            };
            return RefreshOutcome::Skipped(reason);
        }

        gauge!("refresh_last_published_ts").set(snapshot.created_at.timestamp() as f64);
        gauge!("refresh_last_batch_size").set(records as f64);
        tracing::info!(
            target: "refresh",
            records,
            failed = report.failures.len(),
            "published snapshot"
        );
        RefreshOutcome::Published {
            records,
            created_at: snapshot.created_at,
        }
    }
}
