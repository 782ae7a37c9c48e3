// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use std::sync::Arc;

use crate::ingest::types::{AdapterContext, AdapterFailure, ProviderRecord, SourceAdapter};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;

/// Successful records from one collection run, in completion-independent order.
pub type Batch = Vec<ProviderRecord>;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "collector_adapter_success_total",
            "Adapter fetches that produced a record."
        );
        describe_counter!(
            "collector_adapter_failures_total",
            "Adapter fetches that failed, timed out or panicked."
        );
        describe_histogram!(
            "collector_adapter_fetch_ms",
            "Adapter fetch time in milliseconds."
        );
        describe_histogram!(
            "adapter_endpoint_fetch_ms",
            "Extraction endpoint round trip in milliseconds."
        );
    });
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdapterError {
    pub adapter: &'static str,
    pub failure: AdapterFailure,
}

#[derive(Debug, Clone, Default)]
pub struct CollectReport {
    pub batch: Batch,
    pub failures: Vec<AdapterError>,
}

/// Run every adapter concurrently and wait for all of them to settle.
/// Never fails as a whole: an all-failed run yields an empty batch.
pub async fn run(adapters: &[Arc<dyn SourceAdapter>], ctx: Arc<AdapterContext>) -> CollectReport {
    ensure_metrics_described();

    let handles: Vec<_> = adapters
        .iter()
        .map(|adapter| {
            let adapter = Arc::clone(adapter);
            let ctx = Arc::clone(&ctx);
            let name = adapter.name();
            let handle = tokio::spawn(async move { fetch_one(adapter.as_ref(), &ctx).await });
            (name, handle)
        })
        .collect();

    let mut report = CollectReport {
        batch: Vec::with_capacity(handles.len()),
        failures: Vec::new(),
    };

    for (name, handle) in handles {
        let outcome = match handle.await {
            Ok(res) => res,
            Err(e) => Err(AdapterFailure::new(format!("adapter task aborted: {e}"))),
        };
        match outcome {
            Ok(record) => {
                counter!("collector_adapter_success_total", "adapter" => name).increment(1);
                report.batch.push(record);
            }
            Err(failure) => {
                tracing::warn!(adapter = name, error = %failure, "adapter failed");
                counter!("collector_adapter_failures_total", "adapter" => name).increment(1);
                report.failures.push(AdapterError {
                    adapter: name,
                    failure,
                });
            }
        }
    }

    tracing::info!(
        target: "collector",
        ok = report.batch.len(),
        failed = report.failures.len(),
        "collection settled"
    );
    report
}

/// Fetch under the adapter's time budget. Also guards against an adapter
/// that returns an invalid record as success.
async fn fetch_one(
    adapter: &dyn SourceAdapter,
    ctx: &AdapterContext,
) -> Result<ProviderRecord, AdapterFailure> {
    let budget = adapter.timeout(ctx);
    let t0 = std::time::Instant::now();
    let res = tokio::time::timeout(budget, adapter.fetch(ctx)).await;
    histogram!("collector_adapter_fetch_ms", "adapter" => adapter.name())
        .record(t0.elapsed().as_secs_f64() * 1_000.0);

    let record = res.map_err(|_| AdapterFailure::timed_out(budget))??;
    record.validate()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdapterSettings;
    use crate::ingest::providers::nordvpn::NordVpnAdapter;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Broken;

    #[async_trait]
    impl SourceAdapter for Broken {
        async fn fetch(&self, _ctx: &AdapterContext) -> Result<ProviderRecord, AdapterFailure> {
            Err(AdapterFailure::rejected("403"))
        }
        fn name(&self) -> &'static str {
            "Broken"
        }
    }

    struct Panicky;

    #[async_trait]
    impl SourceAdapter for Panicky {
        async fn fetch(&self, _ctx: &AdapterContext) -> Result<ProviderRecord, AdapterFailure> {
            panic!("parser blew up")
        }
        fn name(&self) -> &'static str {
            "Panicky"
        }
    }

    struct Sleepy;

    #[async_trait]
    impl SourceAdapter for Sleepy {
        async fn fetch(&self, _ctx: &AdapterContext) -> Result<ProviderRecord, AdapterFailure> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(NordVpnAdapter::reference_record())
        }
        fn name(&self) -> &'static str {
            "Sleepy"
        }
    }

    struct Blank;

    #[async_trait]
    impl SourceAdapter for Blank {
        async fn fetch(&self, _ctx: &AdapterContext) -> Result<ProviderRecord, AdapterFailure> {
            let mut r = NordVpnAdapter::reference_record();
            r.provider = String::new();
            Ok(r)
        }
        fn name(&self) -> &'static str {
            "Blank"
        }
    }

    #[tokio::test]
    async fn failures_and_panics_are_omitted_not_propagated() {
        let adapters: Vec<Arc<dyn SourceAdapter>> =
            vec![Arc::new(Broken), Arc::new(NordVpnAdapter), Arc::new(Panicky)];
        let report = run(&adapters, Arc::new(AdapterContext::default())).await;
        assert_eq!(report.batch.len(), 1);
        assert_eq!(report.batch[0].provider, "NordVPN");
        let failed: Vec<_> = report.failures.iter().map(|f| f.adapter).collect();
        assert_eq!(failed, vec!["Broken", "Panicky"]);
    }

    #[tokio::test]
    async fn adapter_over_budget_counts_as_failure() {
        let mut settings = std::collections::HashMap::new();
        settings.insert(
            "sleepy".to_string(),
            AdapterSettings {
                timeout_ms: Some(20),
                ..Default::default()
            },
        );
        let ctx = Arc::new(AdapterContext::new(reqwest::Client::new(), settings));
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(Sleepy)];
        let report = run(&adapters, ctx).await;
        assert!(report.batch.is_empty());
        assert_eq!(report.failures[0].failure.message, "timed out after 20ms");
    }

    #[tokio::test]
    async fn invalid_record_is_not_a_success() {
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(Blank)];
        let report = run(&adapters, Arc::new(AdapterContext::default())).await;
        assert!(report.batch.is_empty());
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn no_adapters_is_an_empty_batch() {
        let report = run(&[], Arc::new(AdapterContext::default())).await;
        assert!(report.batch.is_empty());
        assert!(report.failures.is_empty());
    }
}
