//! # Registry Configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happens when a signer resubmits an identical signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// The ledger is a log: the resubmission is appended with a new index.
    #[default]
    Append,
    /// The resubmission fails with `DuplicateSignature`.
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown duplicate policy '{other}'")),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => f.write_str("append"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

/// Configuration of the plaintext registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub duplicate_signatures: DuplicatePolicy,
}
