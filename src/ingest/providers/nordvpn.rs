// src/ingest/providers/nordvpn.rs
use async_trait::async_trait;

use crate::ingest::providers::fetch_from_endpoint;
use crate::ingest::types::{AdapterContext, AdapterFailure, ProviderRecord, SourceAdapter};

const PROVIDER: &str = "NordVPN";

/// NordVPN. Uses the configured extraction endpoint when there is one,
/// otherwise the curated reference row.
pub struct NordVpnAdapter;

impl NordVpnAdapter {
    pub fn reference_record() -> ProviderRecord {
        ProviderRecord {
            provider: PROVIDER.to_string(),
            encryption: "AES-256, RSA-4096, PFS".to_string(),
            protocols: "NordLynx (WireGuard), OpenVPN".to_string(),
            nologs: "Audited (Deloitte)".to_string(),
            killswitch: true,
            multihop: "Yes (Double VPN)".into(),
            obfuscation: true.into(),
            ramonly: true,
            connections: Some(10),
            countries: 111,
            benefits: "Threat Protection, high speed, dedicated IP".to_string(),
            price: 3.99,
        }
    }
}

#[async_trait]
impl SourceAdapter for NordVpnAdapter {
    async fn fetch(&self, ctx: &AdapterContext) -> Result<ProviderRecord, AdapterFailure> {
        tracing::debug!(adapter = PROVIDER, "fetching");
        match fetch_from_endpoint(ctx, self.name(), PROVIDER).await? {
            Some(record) => Ok(record),
            None => Ok(Self::reference_record()),
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
