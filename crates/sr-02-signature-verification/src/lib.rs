//! # Signature Verification (sr-02)
//!
//! Hashing and signer recovery for Safe transactions.
//!
//! ## Architecture
//!
//! Pure domain logic, no I/O:
//! - [`DomainHasher`] computes the EIP-712 digest a Safe owner signs
//! - [`RawSignature`] decodes the submitted 65-byte form and folds it into
//!   the stored [`CompactSignature`](shared_types::CompactSignature)
//! - [`recover_signer`] validates a signature and recovers its address
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: Signatures with S > n/2 are rejected,
//!   so for any accepted signature its `(r, n - s)` twin is refused
//! - **eth_sign**: v ∈ {31, 32} is recovered over the prefixed message hash
//! - The compact form drops the scheme; an `eth_sign` signature read back
//!   from a ledger expands with v ∈ {27, 28}

pub mod domain;

// Re-export public API
pub use domain::codec::{RawSignature, SignatureScheme};
pub use domain::ecdsa::{
    address_from_pubkey, keccak256, recover_compact, recover_signer, RecoveredSignature,
};
pub use domain::errors::SignatureError;
pub use domain::hasher::{
    address_word, eth_signed_message_hash, hash_words, uint_word, DomainHasher, DOMAIN_TYPEHASH,
    SAFE_TX_TYPEHASH,
};

#[cfg(any(test, feature = "test-utils"))]
pub use domain::ecdsa::test_helpers;
