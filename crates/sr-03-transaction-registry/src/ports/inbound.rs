//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the plaintext registry.

use crate::domain::entities::{
    EnqueueRequest, Enqueued, SignatureEntry, SignatureLedgerKey, TransactionRecord,
};
use crate::domain::errors::RegistryError;
use shared_types::{CallContext, Hash};
use sr_01_compact_list::Page;

/// Primary API of the plaintext registry.
pub trait TransactionRegistryApi {
    /// Store a transaction proposal with one signature over it.
    ///
    /// Recomputes the digest, recovers the signer, stores the transaction if
    /// its digest is new, and appends the signature to the signer's ledger.
    /// Returns the ledger index of the new entry and whether the transaction
    /// was stored by this call.
    ///
    /// ## Atomicity
    ///
    /// All writes of one call, including the block log of the events it
    /// emits, are committed in a single batch; an error leaves the store
    /// unchanged.
    ///
    /// ## Errors
    ///
    /// - `Signature`: wrong length, bad v, non-canonical s, zero signer
    /// - `DuplicateSignature`: exact resubmission under `DuplicatePolicy::Reject`
    fn enqueue_transaction(
        &mut self,
        ctx: &CallContext,
        request: EnqueueRequest,
    ) -> Result<Enqueued, RegistryError>;

    /// Read a transaction by digest. Unknown digests are not an error.
    fn retrieve_transaction(&self, digest: &Hash) -> Result<TransactionRecord, RegistryError>;

    /// A page of one signer's ledger, with its total length.
    ///
    /// Out-of-range `start`/`count` clip to the ledger.
    fn retrieve_signatures(
        &self,
        key: &SignatureLedgerKey,
        start: u64,
        count: u64,
    ) -> Result<Page<SignatureEntry>, RegistryError>;

    /// Length of one signer's ledger.
    fn retrieve_signatures_count(&self, key: &SignatureLedgerKey) -> Result<u64, RegistryError>;
}
