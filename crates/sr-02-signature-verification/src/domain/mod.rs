//! # Domain Layer
//!
//! - `hasher`: EIP-712 domain and struct hashing
//! - `codec`: raw and compact signature forms
//! - `ecdsa`: secp256k1 signer recovery
//! - `errors`: error types

pub mod codec;
pub mod ecdsa;
pub mod errors;
pub mod hasher;
