//! # Storage Adapters
//!
//! [`NodeStore`] picks the backend named by [`StorageConfig`] at startup.
//! Each registry variant gets its own store so the two keyspaces never mix.
//!
//! ## Usage
//!
//! Enable the `rocksdb` feature to use RocksDB:
//!
//! ```toml
//! registry-node = { path = "...", features = ["rocksdb"] }
//! ```

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

use crate::container::config::{StorageBackend, StorageConfig};
use sr_01_compact_list::{
    BatchOperation, FileBackedKVStore, InMemoryKVStore, KVStoreError, KeyValueStore,
};
use std::fs;
use tracing::info;

/// The store behind one registry variant.
pub enum NodeStore {
    Memory(InMemoryKVStore),
    File(FileBackedKVStore),
    #[cfg(feature = "rocksdb")]
    RocksDb(RocksDbStore),
}

impl NodeStore {
    /// Open the store called `name` (e.g. `plaintext`) under `config`.
    ///
    /// File journals live at `<data_dir>/<name>.journal`, RocksDB databases
    /// at `<data_dir>/<name>/`.
    pub fn open(config: &StorageConfig, name: &str) -> Result<Self, KVStoreError> {
        if config.backend.is_persistent() {
            fs::create_dir_all(&config.data_dir)?;
        }

        let store = match config.backend {
            StorageBackend::Memory => NodeStore::Memory(InMemoryKVStore::new()),
            StorageBackend::File => {
                let path = config.data_dir.join(format!("{name}.journal"));
                NodeStore::File(FileBackedKVStore::open(path)?)
            }
            #[cfg(feature = "rocksdb")]
            StorageBackend::RocksDb => {
                NodeStore::RocksDb(RocksDbStore::open_default(config.data_dir.join(name))?)
            }
            #[cfg(not(feature = "rocksdb"))]
            StorageBackend::RocksDb => {
                return Err(KVStoreError::IOError {
                    message: "RocksDB support is not compiled in".to_string(),
                })
            }
        };

        info!(
            backend = %config.backend,
            store = name,
            data_dir = ?config.data_dir,
            "Storage opened"
        );
        Ok(store)
    }

    fn inner(&self) -> &dyn KeyValueStore {
        match self {
            NodeStore::Memory(store) => store,
            NodeStore::File(store) => store,
            #[cfg(feature = "rocksdb")]
            NodeStore::RocksDb(store) => store,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn KeyValueStore {
        match self {
            NodeStore::Memory(store) => store,
            NodeStore::File(store) => store,
            #[cfg(feature = "rocksdb")]
            NodeStore::RocksDb(store) => store,
        }
    }
}

impl KeyValueStore for NodeStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.inner().get(key)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.inner().exists(key)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.inner_mut().atomic_batch_write(operations)
    }
}
