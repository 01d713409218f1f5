//! # Block Log
//!
//! Records emitted while a block was being written, kept in the same store
//! (and committed in the same batch) as the state they describe, so they
//! can be read back after a restart.
//!
//! ```text
//! ns ‖ "blocks/" -> CompactIndexedList<u64> of blocks holding records
//! ns ‖ "block/" ‖ block (u64 BE) -> bincode(Vec<T>)
//! ```

use super::errors::ListError;
use super::list::CompactIndexedList;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Handle to one block log inside a key-value store.
pub struct BlockLog<T> {
    namespace: Vec<u8>,
    blocks: CompactIndexedList<u64>,
    _records: PhantomData<fn() -> T>,
}

impl<T> BlockLog<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(namespace: impl Into<Vec<u8>>) -> Self {
        let namespace = namespace.into();
        let mut blocks = namespace.clone();
        blocks.extend_from_slice(b"blocks/");
        Self {
            namespace,
            blocks: CompactIndexedList::new(blocks),
            _records: PhantomData,
        }
    }

    fn block_key(&self, block_number: u64) -> Vec<u8> {
        let mut key = self.namespace.clone();
        key.extend_from_slice(b"block/");
        key.extend_from_slice(&block_number.to_be_bytes());
        key
    }

    /// Records of `block_number` in emission order; empty if there are none.
    pub fn records<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        block_number: u64,
    ) -> Result<Vec<T>, ListError> {
        match store.get(&self.block_key(block_number))? {
            None => Ok(Vec::new()),
            Some(bytes) => bincode::deserialize(&bytes).map_err(|e| ListError::CorruptRecord {
                message: format!("block {block_number}: {e}"),
            }),
        }
    }

    /// Writes appending `records` to the log of `block_number`.
    ///
    /// Like `CompactIndexedList::append_operations`, the result reflects the
    /// committed store, so stage at most one call per block in a batch.
    pub fn append_operations<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        block_number: u64,
        records: &[T],
    ) -> Result<Vec<BatchOperation>, ListError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut operations = Vec::with_capacity(3);
        let mut existing = self.records(store, block_number)?;
        if existing.is_empty() {
            let (_, index_ops) = self.blocks.append_operations(store, &block_number)?;
            operations.extend(index_ops);
        }
        existing.extend_from_slice(records);

        let bytes = bincode::serialize(&existing).map_err(|e| ListError::CorruptRecord {
            message: format!("block {block_number}: {e}"),
        })?;
        operations.push(BatchOperation::put(self.block_key(block_number), bytes));
        Ok(operations)
    }

    /// Blocks holding at least one record, in the order they were first written.
    pub fn blocks<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<Vec<u64>, ListError> {
        self.blocks.collect(store, self.blocks.iter(store)?)
    }

    /// Highest block holding a record.
    pub fn last_block<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Option<u64>, ListError> {
        Ok(self.blocks(store)?.into_iter().max())
    }

    /// Every block with its records.
    pub fn load<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Vec<(u64, Vec<T>)>, ListError> {
        self.blocks(store)?
            .into_iter()
            .map(|block| Ok((block, self.records(store, block)?)))
            .collect()
    }
}
