//! # Domain Entities
//!
//! What the plaintext registry stores: transaction records keyed by digest
//! and signature entries in per-signer ledgers.

use serde::{Deserialize, Serialize};
use shared_types::{Address, CompactSignature, Hash, SafeTransaction, U256};
use sr_01_compact_list::FixedWidth;
use sr_02_signature_verification::{address_word, hash_words, uint_word};

/// A transaction as read back from the store.
///
/// Unknown digests read back as a zero-valued record with `stored == false`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// True once the digest has been stored.
    pub stored: bool,
    /// The transaction parameters (zero-valued when not stored).
    pub transaction: SafeTransaction,
}

impl TransactionRecord {
    /// A record for a stored transaction.
    pub fn stored(transaction: SafeTransaction) -> Self {
        Self {
            stored: true,
            transaction,
        }
    }
}

/// One signature in a signer's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SignatureEntry {
    /// R component.
    pub r: [u8; 32],
    /// Canonical S with the recovery parity in bit 255.
    pub vs: [u8; 32],
    /// Digest the signature was made over.
    pub tx_hash: Hash,
}

impl SignatureEntry {
    pub fn new(signature: CompactSignature, tx_hash: Hash) -> Self {
        Self {
            r: signature.r,
            vs: signature.vs,
            tx_hash,
        }
    }

    /// The signature in compact form.
    pub fn signature(&self) -> CompactSignature {
        CompactSignature {
            r: self.r,
            vs: self.vs,
        }
    }
}

impl FixedWidth for SignatureEntry {
    const WIDTH: usize = 96;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.vs);
        out.extend_from_slice(&self.tx_hash);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut entry = SignatureEntry::default();
        entry.r.copy_from_slice(&bytes[..32]);
        entry.vs.copy_from_slice(&bytes[32..64]);
        entry.tx_hash.copy_from_slice(&bytes[64..96]);
        entry
    }
}

/// The four dimensions a signature ledger is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureLedgerKey {
    pub signer: Address,
    pub safe: Address,
    pub chain_id: U256,
    pub nonce: U256,
}

impl SignatureLedgerKey {
    pub fn new(signer: Address, safe: Address, chain_id: U256, nonce: U256) -> Self {
        Self {
            signer,
            safe,
            chain_id,
            nonce,
        }
    }

    /// `H(signer, safe, chainId, nonce)`, the ledger's identity in storage.
    pub fn list_id(&self) -> Hash {
        hash_words(&[
            address_word(&self.signer),
            address_word(&self.safe),
            uint_word(self.chain_id),
            uint_word(self.nonce),
        ])
    }
}

/// What an accepted enqueue produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Enqueued {
    /// Index of the new entry in the signer's ledger.
    pub list_index: u64,
    /// The call stored the transaction; false when its digest was known.
    pub newly_stored: bool,
}

/// A plaintext proposal: the transaction, where it targets, and a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueRequest {
    pub safe: Address,
    pub chain_id: U256,
    pub nonce: U256,
    pub transaction: SafeTransaction,
    /// 65-byte `r ‖ s ‖ v` signature over the transaction digest.
    pub signature: Vec<u8>,
}
