// src/store/mod.rs
//! Single-slot snapshot cache on top of a key-value backend.

pub mod file;
pub mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{StoreBackend, StoreConfig};
use crate::ingest::Batch;

pub use file::FileKv;
pub use memory::MemoryKv;

/// The one logical key this service ever writes.
pub const SNAPSHOT_KEY: &str = "latest_vpn_data";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub created_at: DateTime<Utc>,
    pub records: Batch,
}

impl Snapshot {
    pub fn new(records: Batch, created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            records,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
    /// Read side only: the stored bytes do not decode as a snapshot.
    #[error("stored snapshot is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
    /// Write side: the value was refused (failed to encode, or the backend
    /// will not take it). Retrying the same snapshot will not help.
    #[error("snapshot write rejected: {0}")]
    Rejected(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Whole-value key-value storage. `put` replaces atomically: a concurrent
/// `get` sees the old bytes or the new bytes, never a mix.
#[async_trait::async_trait]
pub trait KvBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
}

/// Typed view over a backend, pinned to [`SNAPSHOT_KEY`].
#[derive(Clone)]
pub struct SnapshotStore {
    kv: Arc<dyn KvBackend>,
}

impl SnapshotStore {
    pub fn new(kv: Arc<dyn KvBackend>) -> Self {
        Self { kv }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKv::default()))
    }

    pub fn from_config(cfg: &StoreConfig) -> anyhow::Result<Self> {
        let kv: Arc<dyn KvBackend> = match cfg.backend {
            StoreBackend::Memory => Arc::new(MemoryKv::default()),
            StoreBackend::File => Arc::new(FileKv::open(&cfg.path)?),
        };
        Ok(Self::new(kv))
    }

    /// `Ok(None)` means nothing has been published yet.
    pub async fn get(&self) -> Result<Option<Snapshot>, StoreError> {
        match self.kv.get(SNAPSHOT_KEY).await? {
            None => Ok(None),
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        }
    }

    pub async fn put(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(snapshot)
            .map_err(|e| StoreError::Rejected(format!("encoding snapshot: {e}")))?;
        self.kv.put(SNAPSHOT_KEY, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::providers::{expressvpn::ExpressVpnAdapter, nordvpn::NordVpnAdapter};

    #[tokio::test]
    async fn get_before_put_is_not_found() {
        let store = SnapshotStore::in_memory();
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_then_get_round_trips_and_replaces_wholesale() {
        let store = SnapshotStore::in_memory();
        let first = Snapshot::new(
            vec![
                NordVpnAdapter::reference_record(),
                ExpressVpnAdapter::reference_record(),
            ],
            Utc::now(),
        );
        store.put(&first).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(first));

        let second = Snapshot::new(vec![ExpressVpnAdapter::reference_record()], Utc::now());
        store.put(&second).await.unwrap();
        let got = store.get().await.unwrap().unwrap();
        assert_eq!(got.records.len(), 1);
        assert_eq!(got, second);
    }

    #[tokio::test]
    async fn garbage_bytes_are_corrupt_not_missing() {
        let kv = Arc::new(MemoryKv::default());
        kv.put(SNAPSHOT_KEY, b"{not json".to_vec()).await.unwrap();
        let store = SnapshotStore::new(kv);
        assert!(matches!(store.get().await, Err(StoreError::Corrupt(_))));
    }
}
