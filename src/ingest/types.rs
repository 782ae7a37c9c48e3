// src/ingest/types.rs
use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AdapterSettings;

/// Default per-adapter time budget when config does not set `timeout_ms`.
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(10);

/// A capability the provider either simply has/lacks, or describes in prose
/// (e.g. `"Yes (Double VPN)"`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Capability {
    Flag(bool),
    Detail(String),
}

impl From<bool> for Capability {
    fn from(b: bool) -> Self {
        Capability::Flag(b)
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        Capability::Detail(s.to_string())
    }
}

/// One provider's normalized comparison row. The pipeline never looks inside
/// beyond `provider`; fields are serialized flat for the read endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderRecord {
    pub provider: String,
    pub encryption: String,
    pub protocols: String,
    pub nologs: String,
    pub killswitch: bool,
    pub multihop: Capability,
    pub obfuscation: Capability,
    pub ramonly: bool,
    /// Simultaneous devices; `None` means unlimited.
    pub connections: Option<u32>,
    pub countries: u32,
    pub benefits: String,
    /// USD per month on the cheapest advertised plan.
    pub price: f64,
}

impl ProviderRecord {
    /// Rejects records that must not be reported as a successful fetch.
    pub fn validate(&self) -> Result<(), AdapterFailure> {
        if self.provider.trim().is_empty() {
            return Err(AdapterFailure::malformed("record has empty provider name"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AdapterFailure::malformed(format!(
                "record for {} has invalid price {}",
                self.provider, self.price
            )));
        }
        Ok(())
    }
}

/// Everything that can go wrong inside one adapter, folded into one outcome.
/// The collector only cares that this source failed and why, for the log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AdapterFailure {
    pub message: String,
}

impl AdapterFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::new(format!("network error: {err}"))
    }

    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("malformed response: {detail}"))
    }

    pub fn rejected(detail: impl std::fmt::Display) -> Self {
        Self::new(format!("rejected by provider: {detail}"))
    }

    pub fn timed_out(budget: Duration) -> Self {
        Self::new(format!("timed out after {}ms", budget.as_millis()))
    }
}

/// Shared execution context handed to every adapter in a cycle.
#[derive(Debug, Clone, Default)]
pub struct AdapterContext {
    pub http: reqwest::Client,
    pub settings: HashMap<String, AdapterSettings>,
}

impl AdapterContext {
    pub fn new(http: reqwest::Client, settings: HashMap<String, AdapterSettings>) -> Self {
        Self { http, settings }
    }

    /// Settings are keyed by lowercase adapter name.
    pub fn settings_for(&self, adapter: &str) -> Option<&AdapterSettings> {
        self.settings.get(&adapter.to_ascii_lowercase())
    }
}

#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, ctx: &AdapterContext) -> Result<ProviderRecord, AdapterFailure>;

    fn name(&self) -> &'static str;

    /// Time budget for one fetch. Adapter-local; overridable from config.
    fn timeout(&self, ctx: &AdapterContext) -> Duration {
        ctx.settings_for(self.name())
            .and_then(|s| s.timeout_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ADAPTER_TIMEOUT)
    }
}
