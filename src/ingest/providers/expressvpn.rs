// src/ingest/providers/expressvpn.rs
use async_trait::async_trait;

use crate::ingest::providers::fetch_from_endpoint;
use crate::ingest::types::{AdapterContext, AdapterFailure, ProviderRecord, SourceAdapter};

const PROVIDER: &str = "ExpressVPN";

pub struct ExpressVpnAdapter;

impl ExpressVpnAdapter {
    pub fn reference_record() -> ProviderRecord {
        ProviderRecord {
            provider: PROVIDER.to_string(),
            encryption: "AES-256, RSA-4096, PFS".to_string(),
            protocols: "Lightway, OpenVPN, IKEv2".to_string(),
            nologs: "Audited (KPMG & Cure53)".to_string(),
            killswitch: true,
            multihop: "No".into(),
            obfuscation: "Yes (Automatic)".into(),
            ramonly: true,
            connections: Some(8),
            countries: 105,
            benefits: "TrustedServer tech, best for restrictive regions".to_string(),
            price: 6.67,
        }
    }
}

#[async_trait]
impl SourceAdapter for ExpressVpnAdapter {
    async fn fetch(&self, ctx: &AdapterContext) -> Result<ProviderRecord, AdapterFailure> {
        tracing::debug!(adapter = PROVIDER, "fetching");
        Ok(fetch_from_endpoint(ctx, self.name(), PROVIDER)
            .await?
            .unwrap_or_else(Self::reference_record))
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reference_mode_returns_valid_record() {
        let rec = ExpressVpnAdapter
            .fetch(&AdapterContext::default())
            .await
            .expect("reference record");
        assert_eq!(rec.provider, "ExpressVPN");
        assert!(rec.validate().is_ok());
    }
}
