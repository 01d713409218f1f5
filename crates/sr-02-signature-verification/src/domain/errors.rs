//! # Signature Errors
//!
//! Error types for signature decoding and signer recovery.

use thiserror::Error;

/// Errors that can occur while decoding a signature or recovering its signer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Raw signatures are `r ‖ s ‖ v`, exactly 65 bytes.
    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),

    /// R or S is zero or not below the curve order.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has a high S value (EIP-2 malleability protection).
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// v must be 27, 28, or the eth_sign variants 31, 32.
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature.
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// Recovery produced the zero address.
    #[error("Recovered signer is the zero address")]
    ZeroAddress,
}
