//! Implements the `BlobStore` trait with one file per key inside a directory.

use crate::error::Res;
use crate::store::BlobStore;
use crate::utils;
use anyhow::bail;
use std::path::PathBuf;
use tracing::trace;

/// Stores each key as `{dir}/{key}.json`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The path of the file backing `key`.
    pub fn path(&self, key: &str) -> Res<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            bail!("'{key}' cannot be used as a storage key");
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait::async_trait]
impl BlobStore for FileStore {
    async fn get(&self, key: &str) -> Res<Option<Vec<u8>>> {
        let path = self.path(key)?;
        trace!("get {}", path.display());
        utils::read_if_exists(&path).await
    }

    async fn set(&self, key: &str, data: &[u8]) -> Res<()> {
        let path = self.path(key)?;
        trace!("set {} ({} bytes)", path.display(), data.len());
        utils::write(&path, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("transactions").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.set("transactions", b"[1]").await.unwrap();
        store.set("transactions", b"[]").await.unwrap();
        assert_eq!(
            store.get("transactions").await.unwrap(),
            Some(b"[]".to_vec())
        );
        assert!(dir.path().join("transactions.json").is_file());
    }

    #[test]
    fn test_bad_keys() {
        let store = FileStore::new("/tmp");
        assert!(store.path("").is_err());
        assert!(store.path("../etc/passwd").is_err());
        assert!(store.path(".hidden").is_err());
        assert!(store.path("transactions").is_ok());
    }
}
