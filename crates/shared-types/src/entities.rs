//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Primitives**: `Hash`, `Address`, `U256`
//! - **Safe Transactions**: `Operation`, `SafeTransaction`
//! - **Signatures**: `CompactSignature`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: PRIMITIVES
// =============================================================================

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// The zero address, used as the "unset" sentinel.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// The zero hash, used as the "unregistered" sentinel.
pub const ZERO_HASH: Hash = [0u8; 32];

// =============================================================================
// CLUSTER B: SAFE TRANSACTIONS
// =============================================================================

/// How a Safe executes its transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operation {
    /// Regular call.
    #[default]
    #[serde(rename = "CALL")]
    Call,
    /// Delegate call into the target.
    #[serde(rename = "DELEGATECALL")]
    DelegateCall,
}

impl Operation {
    /// The uint8 encoding used in the struct hash.
    pub fn as_u8(self) -> u8 {
        match self {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Operation::Call),
            1 => Ok(Operation::DelegateCall),
            other => Err(other),
        }
    }
}

/// The parameters of a Safe transaction, excluding the nonce.
///
/// The nonce is part of every lookup key and is therefore passed next to
/// this struct rather than inside it.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafeTransaction {
    /// Call target.
    pub to: Address,
    /// Native value forwarded with the call.
    pub value: U256,
    /// Call data.
    #[serde_as(as = "Bytes")]
    pub data: Vec<u8>,
    /// Call or delegate call.
    pub operation: Operation,
    /// Gas reserved for the inner call.
    pub safe_tx_gas: U256,
    /// Gas costs independent of the inner call.
    pub base_gas: U256,
    /// Gas price used for the refund computation.
    pub gas_price: U256,
    /// Token used for the refund (zero address for native).
    pub gas_token: Address,
    /// Refund receiver (zero address for `tx.origin`).
    pub refund_receiver: Address,
}

// =============================================================================
// CLUSTER C: SIGNATURES
// =============================================================================

/// A 64-byte ECDSA signature in compact `(r, vs)` form.
///
/// `vs` holds a canonical (low) `s` with the recovery parity folded into its
/// top bit. Canonical `s` is always below 2^255, so the bit is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CompactSignature {
    /// R component.
    pub r: [u8; 32],
    /// Canonical S with the y-parity in bit 255.
    pub vs: [u8; 32],
}

impl CompactSignature {
    /// Recovery parity (0 or 1) stored in the top bit of `vs`.
    pub fn parity(&self) -> u8 {
        self.vs[0] >> 7
    }

    /// The `s` component with the parity bit cleared.
    pub fn s(&self) -> [u8; 32] {
        let mut s = self.vs;
        s[0] &= 0x7f;
        s
    }

    /// The legacy `v` value (27 or 28).
    pub fn v(&self) -> u8 {
        27 + self.parity()
    }
}
