//! The blob store: opaque key-value storage that the ledger is persisted into.
//!
//! Two implementations exist. `FileStore` keeps each key as a JSON file in the data directory.
//! `MemoryStore` keeps everything in memory and is used to exercise the ledger without touching
//! the disk.

mod file;
mod memory;

use crate::error::Res;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A very simple key-value store holding whole serialized values. Writes overwrite the previous
/// value for a key; there is no partial write or transaction support.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the bytes stored under `key`, or `None` if nothing has been stored yet.
    async fn get(&self, key: &str) -> Res<Option<Vec<u8>>>;

    /// Replaces whatever is stored under `key` with `data`.
    async fn set(&self, key: &str, data: &[u8]) -> Res<()>;
}
