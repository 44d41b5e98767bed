//! Implements the `BlobStore` trait in memory.
//!
//! Note: this is compiled even in the "production" version of this app so that the ledger can be
//! driven top-to-bottom without a data directory.

use crate::error::Res;
use crate::store::BlobStore;
use std::collections::HashMap;
use std::sync::Mutex;

/// A `BlobStore` that holds every value in a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `data` under `key`.
    pub fn with_blob(key: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let mut map = HashMap::new();
        map.insert(key.into(), data.into());
        Self {
            data: Mutex::new(map),
        }
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> Res<Option<Vec<u8>>> {
        let data = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("The memory store lock is poisoned"))?;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, data: &[u8]) -> Res<()> {
        let mut map = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("The memory store lock is poisoned"))?;
        map.insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::with_blob("a", "1");
        assert_eq!(store.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert!(store.get("b").await.unwrap().is_none());
        store.set("b", b"2").await.unwrap();
        assert_eq!(store.get("b").await.unwrap(), Some(b"2".to_vec()));
    }
}
