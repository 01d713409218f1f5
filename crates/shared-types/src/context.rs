//! # Call Context
//!
//! The execution environment of a single registry write.

use crate::entities::Address;
use serde::{Deserialize, Serialize};

/// Who is calling, and in which block the call is included.
///
/// The host fills this in. The registry never derives identity from a
/// request payload, so `caller` is the only identity it ever acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// The account submitting the call (the "notary" for registrations).
    pub caller: Address,
    /// Block number the call is included in.
    pub block_number: u64,
}

impl CallContext {
    /// Create a new call context.
    pub fn new(caller: Address, block_number: u64) -> Self {
        Self {
            caller,
            block_number,
        }
    }
}
