//! # Outbound Ports (Driven Ports)
//!
//! The storage interface every registry store is written against.

use crate::domain::errors::KVStoreError;

/// Abstract interface for the registry's key-value storage.
///
/// The registry never deletes and never updates ledger entries in place, so
/// the write surface is a single atomic batch of puts and inserts.
///
/// Production: `FileBackedKVStore` (below) or `RocksDbStore`
/// (registry-node/adapters/storage/rocksdb_adapter.rs)
/// Testing: `InMemoryKVStore`
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Execute an atomic batch write.
    ///
    /// ## Atomicity Guarantee
    ///
    /// Either ALL operations in the batch are applied, or NONE are.
    /// Operations apply in order, so an `InsertIfAbsent` sees a `Put` to the
    /// same key earlier in the batch.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::put(key, value)])
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Write a key-value pair, replacing any previous value.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Write a key-value pair only if the key is not present yet.
    /// An existing value is left untouched and the operation is a no-op.
    InsertIfAbsent { key: Vec<u8>, value: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create an InsertIfAbsent operation.
    pub fn insert_if_absent(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::InsertIfAbsent {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The key this operation writes.
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOperation::Put { key, .. } | BatchOperation::InsertIfAbsent { key, .. } => key,
        }
    }
}
