// src/config/mod.rs
pub mod adapters;

pub use adapters::AdapterSettings;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "VPN_COMPARE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/vpn_compare.toml";

fn default_refresh_interval_secs() -> u64 {
    3600
}
fn default_cache_max_age_secs() -> u64 {
    3600
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Directory for the file backend.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("state/kv")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// 0 disables the in-process scheduler (external cron only).
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_true")]
    pub refresh_on_startup: bool,
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,
    /// Bearer token guarding `POST /internal/refresh`. None → open.
    #[serde(default)]
    pub trigger_token: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    /// Keyed by lowercase adapter name.
    #[serde(default)]
    pub adapters: HashMap<String, AdapterSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_on_startup: true,
            cache_max_age_secs: default_cache_max_age_secs(),
            trigger_token: None,
            store: StoreConfig::default(),
            adapters: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: AppConfig = toml::from_str(s).context("parsing vpn-compare config")?;
        raw.normalized()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load config using env var + fallbacks, then apply env overrides:
    /// 1) $VPN_COMPARE_CONFIG (must exist)
    /// 2) config/vpn_compare.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if p.exists() {
                Self::load_from(&p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var("REFRESH_INTERVAL_SECS") {
            self.refresh_interval_secs = v
                .trim()
                .parse()
                .with_context(|| format!("REFRESH_INTERVAL_SECS={v}"))?;
        }
        if let Ok(v) = std::env::var("CACHE_MAX_AGE_SECS") {
            self.cache_max_age_secs = v
                .trim()
                .parse()
                .with_context(|| format!("CACHE_MAX_AGE_SECS={v}"))?;
        }
        if let Ok(v) = std::env::var("SNAPSHOT_STORE_PATH") {
            self.store.backend = StoreBackend::File;
            self.store.path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("REFRESH_TRIGGER_TOKEN") {
            self.trigger_token = Some(v);
        }
        self.trigger_token = self.trigger_token.take().filter(|t| !t.trim().is_empty());
        Ok(())
    }

    fn normalized(self) -> Result<Self> {
        let mut adapters = HashMap::with_capacity(self.adapters.len());
        for (name, s) in self.adapters {
            let name = name.to_ascii_lowercase();
            let resolved = s.resolve(&name)?;
            adapters.insert(name, resolved);
        }
        Ok(Self { adapters, ..self })
    }

    /// Whether the adapter named `name` should be registered.
    pub fn adapter_enabled(&self, name: &str) -> bool {
        self.adapters
            .get(&name.to_ascii_lowercase())
            .map(|s| s.enabled)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.cache_max_age_secs, 3600);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn adapters_are_keyed_lowercase() {
        let cfg = AppConfig::from_toml_str(
            r#"
refresh_interval_secs = 900

[store]
backend = "file"
path = "/tmp/kv"

[adapters.NordVPN]
enabled = false

[adapters.expressvpn]
endpoint = "http://extract.local/expressvpn"
timeout_ms = 2500
"#,
        )
        .unwrap();
        assert_eq!(cfg.refresh_interval_secs, 900);
        assert_eq!(cfg.store.backend, StoreBackend::File);
        assert!(!cfg.adapter_enabled("nordvpn"));
        assert!(cfg.adapter_enabled("ExpressVPN"));
        assert!(cfg.adapter_enabled("unconfigured"));
        let ex = &cfg.adapters["expressvpn"];
        assert_eq!(ex.timeout_ms, Some(2500));
        assert_eq!(ex.endpoint.as_deref(), Some("http://extract.local/expressvpn"));
    }

    #[test]
    fn unknown_backend_is_an_error() {
        assert!(AppConfig::from_toml_str("[store]\nbackend = \"redis\"").is_err());
    }
}
