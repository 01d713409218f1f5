//! # Domain Entities
//!
//! The encrypted registry stores two words per registration; the payload
//! itself is only ever emitted.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, U256};
use sr_01_compact_list::FixedWidth;
use sr_02_signature_verification::{address_word, hash_words, uint_word};

/// Where to find a registration's payload: the block it was emitted in and
/// the uid to filter that block's logs by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RegistrationPointer {
    pub block_number: u64,
    /// Opaque handle; only meaningful as an event-filter value.
    pub uid: Hash,
}

impl FixedWidth for RegistrationPointer {
    const WIDTH: usize = 64;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[0u8; 24]);
        out.extend_from_slice(&self.block_number.to_be_bytes());
        out.extend_from_slice(&self.uid);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut block = [0u8; 8];
        block.copy_from_slice(&bytes[24..32]);
        let mut uid = [0u8; 32];
        uid.copy_from_slice(&bytes[32..64]);
        Self {
            block_number: u64::from_be_bytes(block),
            uid,
        }
    }
}

/// The four dimensions a registration ledger is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationLedgerKey {
    pub chain_id: U256,
    pub safe: Address,
    pub nonce: U256,
    /// The account that submitted the registrations.
    pub notary: Address,
}

impl RegistrationLedgerKey {
    pub fn new(chain_id: U256, safe: Address, nonce: U256, notary: Address) -> Self {
        Self {
            chain_id,
            safe,
            nonce,
            notary,
        }
    }

    /// `H(chainId, safe, nonce, notary)`.
    pub fn list_id(&self) -> Hash {
        hash_words(&[
            uint_word(self.chain_id),
            address_word(&self.safe),
            uint_word(self.nonce),
            address_word(&self.notary),
        ])
    }

    /// uid of the registration at `index`: `H(listId, index)`.
    pub fn uid(&self, index: u64) -> Hash {
        hash_words(&[self.list_id(), uint_word(U256::from(index))])
    }
}

/// An encrypted registration. Either part may be empty, not both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterRequest {
    pub chain_id: U256,
    pub safe: Address,
    pub nonce: U256,
    /// EIP-712 struct hash of the (undisclosed) transaction.
    pub struct_hash: Hash,
    /// 65-byte signature over the digest of `struct_hash`, or empty.
    pub signature: Vec<u8>,
    /// Ciphertext for the recipients, or empty.
    pub encrypted_payload: Vec<u8>,
}

/// What a registration call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Registration {
    /// uid of the payload registration, when a payload was given.
    pub uid: Option<Hash>,
    /// Ledger index of the payload registration.
    pub list_index: Option<u64>,
    /// Recovered signer, when a signature was given.
    pub signer: Option<Address>,
}

/// A signer's current encryption key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncryptionKeyRegistration {
    pub context: Hash,
    pub public_key: Hash,
}

impl EncryptionKeyRegistration {
    pub(crate) fn to_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        out.extend_from_slice(&self.context);
        out.extend_from_slice(&self.public_key);
        out
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 64 {
            return None;
        }
        let mut registration = Self::default();
        registration.context.copy_from_slice(&bytes[..32]);
        registration.public_key.copy_from_slice(&bytes[32..]);
        Some(registration)
    }
}
