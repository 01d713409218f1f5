//! # Encrypted Registry Errors

use shared_types::Address;
use sr_01_compact_list::{KVStoreError, ListError};
use sr_02_signature_verification::SignatureError;
use thiserror::Error;

/// Errors raised by the encrypted registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncryptedRegistryError {
    /// Neither a signature nor a payload was supplied.
    #[error("nothing to enqueue: signature and payload are both empty")]
    NothingToEnqueue,

    /// The signature is malformed or does not recover a signer.
    #[error("signature rejected: {0}")]
    Signature(#[from] SignatureError),

    /// A ledger could not be read or extended.
    #[error(transparent)]
    List(#[from] ListError),

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    /// A stored encryption key failed to decode.
    #[error("corrupt encryption key record for {signer:?}")]
    CorruptKeyRecord { signer: Address },
}
