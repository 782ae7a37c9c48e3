// src/ingest/providers/mod.rs
pub mod expressvpn;
pub mod nordvpn;

use std::sync::Arc;

use metrics::histogram;

use crate::config::AppConfig;
use crate::ingest::types::{AdapterContext, AdapterFailure, ProviderRecord, SourceAdapter};

/// All built-in adapters that are enabled in `cfg`.
pub fn registered_adapters(cfg: &AppConfig) -> Vec<Arc<dyn SourceAdapter>> {
    let all: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(nordvpn::NordVpnAdapter),
        Arc::new(expressvpn::ExpressVpnAdapter),
    ];
    all.into_iter()
        .filter(|a| cfg.adapter_enabled(a.name()))
        .collect()
}

/// Shared fetch path for adapters that delegate extraction to an external
/// service: GET `endpoint`, expect one JSON record for `expected_provider`.
pub(crate) async fn fetch_from_endpoint(
    ctx: &AdapterContext,
    adapter: &'static str,
    expected_provider: &str,
) -> Result<Option<ProviderRecord>, AdapterFailure> {
    let Some(settings) = ctx.settings_for(adapter) else {
        return Ok(None);
    };
    let Some(endpoint) = settings.endpoint.as_deref() else {
        return Ok(None);
    };

    let t0 = std::time::Instant::now();
    let mut req = ctx
        .http
        .get(endpoint)
        .header(reqwest::header::ACCEPT, "application/json");
    if let Some(key) = settings.api_key.as_deref() {
        req = req.bearer_auth(key);
    }

    let sent = req.send().await;
    histogram!("adapter_endpoint_fetch_ms", "adapter" => adapter)
        .record(t0.elapsed().as_secs_f64() * 1_000.0);
    let resp = sent.map_err(AdapterFailure::network)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AdapterFailure::rejected(format!("HTTP {status}")));
    }
    let body = resp.bytes().await.map_err(AdapterFailure::network)?;
    let record: ProviderRecord =
        serde_json::from_slice(&body).map_err(AdapterFailure::malformed)?;

    if !record.provider.trim().eq_ignore_ascii_case(expected_provider) {
        return Err(AdapterFailure::malformed(format!(
            "expected provider {expected_provider}, got {:?}",
            record.provider
        )));
    }
    record.validate()?;
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdapterSettings;

    #[test]
    fn disabled_adapters_are_not_registered() {
        let mut cfg = AppConfig::default();
        assert_eq!(registered_adapters(&cfg).len(), 2);

        cfg.adapters.insert(
            "nordvpn".into(),
            AdapterSettings {
                enabled: false,
                ..Default::default()
            },
        );
        let names: Vec<_> = registered_adapters(&cfg).iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["ExpressVPN"]);
    }

    #[tokio::test]
    async fn no_endpoint_means_no_remote_record() {
        let ctx = AdapterContext::default();
        let out = fetch_from_endpoint(&ctx, "NordVPN", "NordVPN").await.unwrap();
        assert!(out.is_none());
    }
}
