//! # Transaction Registry (sr-03)
//!
//! The plaintext registry: anyone may publish a Safe transaction proposal
//! together with a signature over it, and anyone can read both back knowing
//! only the Safe, the chain, the nonce and the owner set.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Store once | One record per digest; the first writer wins |
//! | 2 | Append-only ledgers | Signature entries are never removed or rewritten |
//! | 3 | Canonical signatures | High-s twins of accepted signatures are rejected |
//! | 4 | Atomic calls | A failed call changes nothing and emits nothing |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - records, ledger keys, storage views, config, errors
//! - `ports/` - `TransactionRegistryApi`
//! - `service.rs` - the service wiring store, hasher and event bus

pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types
pub use domain::config::{DuplicatePolicy, RegistryConfig};
pub use domain::entities::{
    EnqueueRequest, Enqueued, SignatureEntry, SignatureLedgerKey, TransactionRecord,
};
pub use domain::errors::RegistryError;
pub use domain::store::{event_log, SignatureLedger, TransactionStore};
pub use ports::inbound::TransactionRegistryApi;
pub use service::TransactionRegistryService;
