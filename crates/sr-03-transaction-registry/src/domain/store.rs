//! # Transaction Store and Signature Ledger
//!
//! Storage views over a `KeyValueStore`. Writes are returned as batch
//! operations so the service can commit one call's mutations together.
//!
//! ```text
//! tx/  ‖ digest                 -> bincode(SafeTransaction)
//! sig/ ‖ H(signer,safe,chain,n) -> CompactIndexedList<SignatureEntry>
//! dup/ ‖ H(listId, r, vs)       -> marker (DuplicatePolicy::Reject only)
//! log/plain/ ‖ ...               -> BlockLog<RegistryEvent>
//! ```

use super::entities::{SignatureEntry, SignatureLedgerKey, TransactionRecord};
use super::errors::RegistryError;
use shared_bus::RegistryEvent;
use shared_types::{Hash, SafeTransaction};
use sr_01_compact_list::{BatchOperation, BlockLog, CompactIndexedList, KeyValueStore, Page};
use sr_02_signature_verification::hash_words;

const TX_PREFIX: &[u8] = b"tx/";
const SIG_PREFIX: &[u8] = b"sig/";
const DUP_PREFIX: &[u8] = b"dup/";
const LOG_PREFIX: &[u8] = b"log/plain/";

/// The events this registry emitted, by block.
pub fn event_log() -> BlockLog<RegistryEvent> {
    BlockLog::new(LOG_PREFIX)
}

fn prefixed(prefix: &[u8], id: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + id.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(id);
    key
}

/// Digest-keyed, insert-if-absent transaction records.
pub struct TransactionStore;

impl TransactionStore {
    /// Storage key of a digest.
    pub fn key(digest: &Hash) -> Vec<u8> {
        prefixed(TX_PREFIX, digest)
    }

    /// Read a record; unknown digests yield the zero-valued record.
    pub fn get<S: KeyValueStore + ?Sized>(
        store: &S,
        digest: &Hash,
    ) -> Result<TransactionRecord, RegistryError> {
        match store.get(&Self::key(digest))? {
            None => Ok(TransactionRecord::default()),
            Some(bytes) => {
                let transaction: SafeTransaction =
                    bincode::deserialize(&bytes).map_err(|e| RegistryError::CorruptRecord {
                        message: e.to_string(),
                    })?;
                Ok(TransactionRecord::stored(transaction))
            }
        }
    }

    /// The write that stores `transaction` under `digest`, or `None` when the
    /// digest is already stored. The first writer wins; a later transaction
    /// with the same digest is never written.
    pub fn insert_operation<S: KeyValueStore + ?Sized>(
        store: &S,
        digest: &Hash,
        transaction: &SafeTransaction,
    ) -> Result<Option<BatchOperation>, RegistryError> {
        let key = Self::key(digest);
        if store.exists(&key)? {
            return Ok(None);
        }
        let bytes = bincode::serialize(transaction).map_err(|e| RegistryError::CorruptRecord {
            message: e.to_string(),
        })?;
        Ok(Some(BatchOperation::insert_if_absent(key, bytes)))
    }
}

/// The append-only signature list of one `(signer, safe, chainId, nonce)`.
pub struct SignatureLedger {
    list_id: Hash,
    list: CompactIndexedList<SignatureEntry>,
}

impl SignatureLedger {
    pub fn for_key(key: &SignatureLedgerKey) -> Self {
        let list_id = key.list_id();
        Self {
            list_id,
            list: CompactIndexedList::new(prefixed(SIG_PREFIX, &list_id)),
        }
    }

    pub fn list_id(&self) -> Hash {
        self.list_id
    }

    /// Number of entries.
    pub fn count<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<u64, RegistryError> {
        Ok(self.list.length(store)?)
    }

    /// Up to `count` entries from `start`, with the ledger length.
    pub fn retrieve<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        start: u64,
        count: u64,
    ) -> Result<Page<SignatureEntry>, RegistryError> {
        Ok(self.list.retrieve(store, start, count)?)
    }

    /// Writes appending `entry`, and the index it will take.
    pub fn append_operations<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        entry: &SignatureEntry,
    ) -> Result<(u64, Vec<BatchOperation>), RegistryError> {
        Ok(self.list.append_operations(store, entry)?)
    }

    /// Marker key recording that `entry`'s signature is in this ledger.
    pub fn duplicate_key(&self, entry: &SignatureEntry) -> Vec<u8> {
        prefixed(DUP_PREFIX, &hash_words(&[self.list_id, entry.r, entry.vs]))
    }
}
