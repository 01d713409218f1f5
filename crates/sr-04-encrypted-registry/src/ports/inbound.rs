//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the encrypted registry.

use crate::domain::entities::{
    EncryptionKeyRegistration, RegisterRequest, Registration, RegistrationLedgerKey,
    RegistrationPointer,
};
use crate::domain::errors::EncryptedRegistryError;
use shared_types::{Address, CallContext, Hash};
use sr_01_compact_list::Page;

/// Primary API of the encrypted registry.
pub trait EncryptedRegistryApi {
    /// Register a signature, an encrypted payload, or both.
    ///
    /// The struct hash is never checked against a plaintext; recipients
    /// decrypt the payload and verify it themselves. A signature emits
    /// `SafeTransactionSigned`; a payload is appended to the caller's
    /// registration ledger and emits `SafeTransactionRegistered`. The emitted
    /// events are committed to the block log in the same batch.
    ///
    /// ## Errors
    ///
    /// - `NothingToEnqueue`: both signature and payload are empty
    /// - `Signature`: a supplied signature is invalid
    fn register_transaction(
        &mut self,
        ctx: &CallContext,
        request: RegisterRequest,
    ) -> Result<Registration, EncryptedRegistryError>;

    /// Set or replace the caller's encryption key.
    fn register_encryption_key(
        &mut self,
        ctx: &CallContext,
        registration: EncryptionKeyRegistration,
    ) -> Result<(), EncryptedRegistryError>;

    /// A page of registration pointers, with the ledger length.
    fn retrieve_registrations(
        &self,
        key: &RegistrationLedgerKey,
        start: u64,
        count: u64,
    ) -> Result<Page<RegistrationPointer>, EncryptedRegistryError>;

    /// Length of one registration ledger.
    fn retrieve_registration_count(
        &self,
        key: &RegistrationLedgerKey,
    ) -> Result<u64, EncryptedRegistryError>;

    /// Public keys of `signers`, zero for any signer without one.
    fn retrieve_encryption_public_keys(
        &self,
        signers: &[Address],
    ) -> Result<Vec<Hash>, EncryptedRegistryError>;
}
