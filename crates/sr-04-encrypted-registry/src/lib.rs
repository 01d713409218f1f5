//! # Encrypted Registry (sr-04)
//!
//! A registry whose transaction payloads are encrypted for the Safe's
//! owners and live only in emitted logs. Storage holds a two-word pointer
//! per registration, `(blockNumber, uid)`, which turns finding a payload
//! into one block-scoped log query filtered by uid.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Something to enqueue | A call carries a signature, a payload, or both |
//! | 2 | Append-only ledgers | Pointers are never removed or rewritten |
//! | 3 | Owned keys | A signer's encryption key is written only by that signer |
//!
//! The struct hash is not checked against any plaintext. Recipients decrypt,
//! recompute the digest and discard registrations that disagree.

pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types
pub use domain::entities::{
    EncryptionKeyRegistration, RegisterRequest, Registration, RegistrationLedgerKey,
    RegistrationPointer,
};
pub use domain::errors::EncryptedRegistryError;
pub use domain::store::{event_log, EncryptionKeyDirectory, RegistrationLedger};
pub use ports::inbound::EncryptedRegistryApi;
pub use service::EncryptedRegistryService;
