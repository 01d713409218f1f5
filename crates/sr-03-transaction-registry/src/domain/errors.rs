//! # Registry Errors

use shared_types::Address;
use sr_01_compact_list::{KVStoreError, ListError};
use sr_02_signature_verification::SignatureError;
use thiserror::Error;

/// Errors raised by the plaintext registry.
///
/// Every error leaves storage untouched: validation happens before the
/// single batch write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The signature is malformed or does not recover a signer.
    #[error("signature rejected: {0}")]
    Signature(#[from] SignatureError),

    /// A ledger could not be read or extended.
    #[error(transparent)]
    List(#[from] ListError),

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    /// A stored transaction record failed to decode.
    #[error("corrupt transaction record: {message}")]
    CorruptRecord { message: String },

    /// The exact signature is already in this signer's ledger.
    /// Only raised under `DuplicatePolicy::Reject`.
    #[error("duplicate signature from {signer:?}")]
    DuplicateSignature { signer: Address },
}
