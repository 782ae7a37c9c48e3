// src/store/memory.rs
use std::collections::HashMap;
use std::sync::RwLock;

use super::{KvBackend, StoreError};

/// Process-local backend; lost on restart.
#[derive(Debug, Default)]
pub struct MemoryKv {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

#[async_trait::async_trait]
impl KvBackend for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("memory kv lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("memory kv lock poisoned".into()))?;
        guard.insert(key.to_string(), value);
        Ok(())
    }
}
