//! # Registration Ledger and Key Directory
//!
//! ```text
//! reg/ ‖ H(chain,safe,n,notary) -> CompactIndexedList<RegistrationPointer>
//! key/ ‖ signer                 -> context ‖ publicKey
//! log/enc/ ‖ ...                 -> BlockLog<RegistryEvent>
//! ```
//!
//! The block log is where a `RegistrationPointer` leads: the payload of a
//! registration is stored nowhere else.

use super::entities::{EncryptionKeyRegistration, RegistrationLedgerKey, RegistrationPointer};
use super::errors::EncryptedRegistryError;
use shared_bus::RegistryEvent;
use shared_types::{Address, Hash};
use sr_01_compact_list::{BatchOperation, BlockLog, CompactIndexedList, KeyValueStore, Page};

const REG_PREFIX: &[u8] = b"reg/";
const KEY_PREFIX: &[u8] = b"key/";
const LOG_PREFIX: &[u8] = b"log/enc/";

/// The events this registry emitted, by block.
pub fn event_log() -> BlockLog<RegistryEvent> {
    BlockLog::new(LOG_PREFIX)
}

/// The append-only pointer list of one `(chainId, safe, nonce, notary)`.
pub struct RegistrationLedger {
    key: RegistrationLedgerKey,
    list: CompactIndexedList<RegistrationPointer>,
}

impl RegistrationLedger {
    pub fn for_key(key: &RegistrationLedgerKey) -> Self {
        let mut namespace = REG_PREFIX.to_vec();
        namespace.extend_from_slice(&key.list_id());
        Self {
            key: *key,
            list: CompactIndexedList::new(namespace),
        }
    }

    pub fn count<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<u64, EncryptedRegistryError> {
        Ok(self.list.length(store)?)
    }

    pub fn retrieve<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        start: u64,
        count: u64,
    ) -> Result<Page<RegistrationPointer>, EncryptedRegistryError> {
        Ok(self.list.retrieve(store, start, count)?)
    }

    /// Writes registering a payload emitted in `block_number`.
    ///
    /// Returns the index, the pointer that will be stored, and the writes.
    pub fn append_operations<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        block_number: u64,
    ) -> Result<(u64, RegistrationPointer, Vec<BatchOperation>), EncryptedRegistryError> {
        let index = self.list.length(store)?;
        let pointer = RegistrationPointer {
            block_number,
            uid: self.key.uid(index),
        };
        let (appended_at, operations) = self.list.append_operations(store, &pointer)?;
        debug_assert_eq!(appended_at, index);
        Ok((index, pointer, operations))
    }
}

/// Signer-owned, overwritable encryption keys.
pub struct EncryptionKeyDirectory;

impl EncryptionKeyDirectory {
    fn key(signer: &Address) -> Vec<u8> {
        let mut key = KEY_PREFIX.to_vec();
        key.extend_from_slice(signer);
        key
    }

    pub fn get<S: KeyValueStore + ?Sized>(
        store: &S,
        signer: &Address,
    ) -> Result<Option<EncryptionKeyRegistration>, EncryptedRegistryError> {
        match store.get(&Self::key(signer))? {
            None => Ok(None),
            Some(bytes) => EncryptionKeyRegistration::from_bytes(&bytes)
                .map(Some)
                .ok_or(EncryptedRegistryError::CorruptKeyRecord { signer: *signer }),
        }
    }

    /// Public keys of `signers`, zero for any signer without one.
    pub fn public_keys<S: KeyValueStore + ?Sized>(
        store: &S,
        signers: &[Address],
    ) -> Result<Vec<Hash>, EncryptedRegistryError> {
        signers
            .iter()
            .map(|signer| {
                Ok(Self::get(store, signer)?
                    .map(|registration| registration.public_key)
                    .unwrap_or_default())
            })
            .collect()
    }

    /// The write replacing `signer`'s key.
    pub fn put_operation(signer: &Address, registration: EncryptionKeyRegistration) -> BatchOperation {
        BatchOperation::put(Self::key(signer), registration.to_bytes())
    }
}
