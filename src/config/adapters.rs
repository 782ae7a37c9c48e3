// src/config/adapters.rs
use serde::{Deserialize, Serialize};
use std::env;

fn default_enabled() -> bool {
    true
}

/// Per-adapter knobs from `[adapters.<name>]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdapterSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Extraction endpoint returning a JSON record. Absent → reference data.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// "ENV" means: read from `<NAME>_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            api_key: None,
            timeout_ms: None,
        }
    }
}

impl AdapterSettings {
    /// Resolve `api_key = "ENV"` against the environment and drop blank values.
    pub fn resolve(mut self, adapter: &str) -> anyhow::Result<Self> {
        if let Some(key) = self.api_key.as_deref() {
            if key.trim().eq_ignore_ascii_case("env") {
                let var = api_key_env_var(adapter);
                let v = env::var(&var)
                    .map_err(|_| anyhow::anyhow!("Missing {var} env var"))?;
                self.api_key = Some(v);
            }
        }
        if self.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.api_key = None;
        }
        if self.endpoint.as_deref().is_some_and(|e| e.trim().is_empty()) {
            self.endpoint = None;
        }
        if self.timeout_ms == Some(0) {
            self.timeout_ms = None;
        }
        Ok(self)
    }
}

/// `nordvpn` → `NORDVPN_API_KEY`
pub fn api_key_env_var(adapter: &str) -> String {
    let mut s: String = adapter
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    s.push_str("_API_KEY");
    s
}
