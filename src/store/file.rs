// src/store/file.rs
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use tokio::fs;

use super::{KvBackend, StoreError};

/// One file per key under `dir`. Writes go to a sibling temp file which is
/// then renamed over the target, so readers never observe a torn value.
#[derive(Debug)]
pub struct FileKv {
    dir: PathBuf,
    seq: AtomicU64,
}

impl FileKv {
    pub fn open(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating snapshot store dir {}", dir.display()))?;
        Ok(Self {
            dir,
            seq: AtomicU64::new(0),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

#[async_trait::async_trait]
impl KvBackend for FileKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            // a missing file only means "nothing yet" while the store dir exists
            Err(e) if e.kind() == ErrorKind::NotFound => match fs::try_exists(&self.dir).await {
                Ok(true) => Ok(None),
                Ok(false) => Err(StoreError::Unavailable(format!(
                    "store dir {} is gone",
                    self.dir.display()
                ))),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let target = self.path_for(key);
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        let tmp = target.with_extension(format!("json.tmp{}.{n}", std::process::id()));

        fs::write(&tmp, &value).await?;
        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
