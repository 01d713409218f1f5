//! # RocksDB Storage Adapter
//!
//! RocksDB implementation of the registry's `KeyValueStore` port.
//!
//! ## Features
//!
//! - Atomic batch writes (WriteBatch)
//! - Insert-if-absent resolved under the write lock
//! - Snappy compression
//! - Bloom filters for read optimization
//! - fsync on write for durability
//!
//! Every registry key is already namespaced by prefix (`tx/`, `sig/`, `reg/`,
//! `key/`, `dup/`), so a single column family is enough.

use parking_lot::RwLock;
use rocksdb::{Options, WriteBatch, WriteOptions, DB};
use sr_01_compact_list::{BatchOperation, KVStoreError, KeyValueStore};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/rocksdb".to_string(),
            block_cache_size: 64 * 1024 * 1024,  // 64MB
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,  // 8MB
            write_buffer_size: 4 * 1024 * 1024, // 4MB
            sync_writes: false,
        }
    }
}

/// RocksDB-backed key-value store implementing the KeyValueStore trait
pub struct RocksDbStore {
    db: Arc<RwLock<DB>>,
    config: RocksDbConfig,
}

impl RocksDbStore {
    /// Open or create a RocksDB database
    pub fn open(config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        // Bloom filter for faster lookups
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path).map_err(|e| KVStoreError::IOError {
            message: format!("Failed to open RocksDB: {}", e),
        })?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
            config,
        })
    }

    /// Open with default tuning
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        let config = RocksDbConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        };
        Self::open(config)
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        let db = self.db.read();
        db.get(key).map_err(|e| KVStoreError::IOError {
            message: format!("RocksDB get failed: {}", e),
        })
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        let db = self.db.read();
        db.get_pinned(key)
            .map(|v| v.is_some())
            .map_err(|e| KVStoreError::IOError {
                message: format!("RocksDB exists check failed: {}", e),
            })
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let db = self.db.write();
        let mut batch = WriteBatch::default();
        let mut staged: HashSet<Vec<u8>> = HashSet::new();

        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    batch.put(&key, &value);
                    staged.insert(key);
                }
                BatchOperation::InsertIfAbsent { key, value } => {
                    if staged.contains(&key) {
                        continue;
                    }
                    let present = db
                        .get_pinned(&key)
                        .map_err(|e| KVStoreError::IOError {
                            message: format!("RocksDB exists check failed: {}", e),
                        })?
                        .is_some();
                    if !present {
                        batch.put(&key, &value);
                        staged.insert(key);
                    }
                }
            }
        }

        if batch.is_empty() {
            return Ok(());
        }
        db.write_opt(batch, &self.write_options())
            .map_err(|e| KVStoreError::IOError {
                message: format!("RocksDB batch write failed: {}", e),
            })
    }
}
