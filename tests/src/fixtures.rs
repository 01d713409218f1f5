//! # Test Fixtures
//!
//! Shared builders for the integration tests and benchmarks.

use k256::ecdsa::SigningKey;
use shared_bus::InMemoryEventBus;
use shared_types::{Address, Hash, SafeTransaction, U256};
use sr_01_compact_list::{InMemoryKVStore, KeyValueStore};
use sr_02_signature_verification::test_helpers::sign_digest;
use sr_02_signature_verification::DomainHasher;
use sr_03_transaction_registry::{EnqueueRequest, RegistryConfig, TransactionRegistryService};
use sr_04_encrypted_registry::EncryptedRegistryService;
use std::sync::Arc;

pub use sr_02_signature_verification::test_helpers::{address_of, generate_key, malleate};

/// The Safe most tests talk about.
pub const SAFE: Address = [0x5A; 20];

/// The relayer submitting calls.
pub const RELAYER: Address = [0xCA; 20];

/// A native transfer of `value` wei to a fixed recipient.
pub fn transfer(value: u64) -> SafeTransaction {
    SafeTransaction {
        to: [0x11; 20],
        value: U256::from(value),
        ..SafeTransaction::default()
    }
}

/// Digest owners sign for `tx` at `nonce`.
pub fn digest(chain_id: U256, safe: Address, tx: &SafeTransaction, nonce: U256) -> Hash {
    DomainHasher::new(chain_id, safe).transaction_hash(tx, nonce)
}

/// An enqueue request for `tx`, signed by `key` over its digest.
pub fn signed_enqueue(
    key: &SigningKey,
    chain_id: U256,
    safe: Address,
    nonce: U256,
    tx: SafeTransaction,
) -> EnqueueRequest {
    let signature = sign_digest(&digest(chain_id, safe, &tx, nonce), key);
    EnqueueRequest {
        safe,
        chain_id,
        nonce,
        transaction: tx,
        signature: signature.to_vec(),
    }
}

/// A plaintext registry over `store` and a fresh bus.
pub fn plaintext_registry<S: KeyValueStore>(
    store: S,
    config: RegistryConfig,
) -> (TransactionRegistryService<S, InMemoryEventBus>, Arc<InMemoryEventBus>) {
    let bus = Arc::new(InMemoryEventBus::new());
    (TransactionRegistryService::new(store, Arc::clone(&bus), config), bus)
}

/// A plaintext registry in memory with the default config.
pub fn memory_plaintext_registry() -> (
    TransactionRegistryService<InMemoryKVStore, InMemoryEventBus>,
    Arc<InMemoryEventBus>,
) {
    plaintext_registry(InMemoryKVStore::new(), RegistryConfig::default())
}

/// An encrypted registry over `store` and a fresh bus.
pub fn encrypted_registry<S: KeyValueStore>(
    store: S,
) -> (EncryptedRegistryService<S, InMemoryEventBus>, Arc<InMemoryEventBus>) {
    let bus = Arc::new(InMemoryEventBus::new());
    (EncryptedRegistryService::new(store, Arc::clone(&bus)), bus)
}
