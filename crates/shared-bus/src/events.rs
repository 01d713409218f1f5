//! # Registry Events
//!
//! The log entries both registry variants emit. Field order follows the
//! emitted log layout and is part of the public contract.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::{Address, CompactSignature, Hash, SafeTransaction, U256};

/// Every event a registry can emit.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    // =========================================================================
    // PLAINTEXT REGISTRY
    // =========================================================================
    /// A signature was appended to a signer's ledger.
    SignatureStored {
        signer: Address,
        safe: Address,
        digest: Hash,
        chain_id: U256,
        nonce: U256,
        /// Index of the entry in the `(signer, safe, chainId, nonce)` ledger.
        list_index: u64,
    },

    /// A digest was stored for the first time.
    /// Published before the `SignatureStored` of the same call.
    TransactionStored {
        digest: Hash,
        safe: Address,
        chain_id: U256,
        nonce: U256,
        transaction: SafeTransaction,
    },

    // =========================================================================
    // ENCRYPTED REGISTRY
    // =========================================================================
    /// A signature over a struct hash was submitted.
    SafeTransactionSigned {
        signer: Address,
        safe: Address,
        chain_id: U256,
        nonce: U256,
        struct_hash: Hash,
        signature: CompactSignature,
    },

    /// An encrypted payload was registered. The payload exists only here.
    SafeTransactionRegistered {
        uid: Hash,
        notary: Address,
        safe: Address,
        chain_id: U256,
        nonce: U256,
        #[serde_as(as = "Bytes")]
        encrypted_payload: Vec<u8>,
    },

    /// A signer set or replaced their encryption key.
    EncryptionKeyRegistered {
        signer: Address,
        context: Hash,
        public_key: Hash,
    },
}

impl RegistryEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::SignatureStored { .. } => EventTopic::SignatureStored,
            Self::TransactionStored { .. } => EventTopic::TransactionStored,
            Self::SafeTransactionSigned { .. } => EventTopic::SafeTransactionSigned,
            Self::SafeTransactionRegistered { .. } => EventTopic::SafeTransactionRegistered,
            Self::EncryptionKeyRegistered { .. } => EventTopic::EncryptionKeyRegistered,
        }
    }

    /// The Safe this event concerns, if any.
    #[must_use]
    pub fn safe(&self) -> Option<Address> {
        match self {
            Self::SignatureStored { safe, .. }
            | Self::TransactionStored { safe, .. }
            | Self::SafeTransactionSigned { safe, .. }
            | Self::SafeTransactionRegistered { safe, .. } => Some(*safe),
            Self::EncryptionKeyRegistered { .. } => None,
        }
    }

    /// The registration uid, for `SafeTransactionRegistered`.
    #[must_use]
    pub fn uid(&self) -> Option<Hash> {
        match self {
            Self::SafeTransactionRegistered { uid, .. } => Some(*uid),
            _ => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    SignatureStored,
    TransactionStored,
    SafeTransactionSigned,
    SafeTransactionRegistered,
    EncryptionKeyRegistered,
}

/// An emitted event with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Block the emitting call was included in.
    pub block_number: u64,
    /// Position among the events of that block, from 0.
    pub log_index: u64,
    pub event: RegistryEvent,
}

/// Filter for subscriptions and log queries.
///
/// Every set criterion must match; empty `topics` accepts every topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Only events about this Safe.
    pub safe: Option<Address>,
    /// Only the registration with this uid.
    pub uid: Option<Hash>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    /// The `SafeTransactionRegistered` entry a registration pointer refers to.
    #[must_use]
    pub fn registration(uid: Hash) -> Self {
        Self {
            topics: vec![EventTopic::SafeTransactionRegistered],
            safe: None,
            uid: Some(uid),
        }
    }

    /// Restrict to events about `safe`.
    #[must_use]
    pub fn with_safe(mut self, safe: Address) -> Self {
        self.safe = Some(safe);
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &RegistryEvent) -> bool {
        let topic_match = self.topics.is_empty() || self.topics.contains(&event.topic());
        let safe_match = self.safe.is_none() || self.safe == event.safe();
        let uid_match = self.uid.is_none() || self.uid == event.uid();

        topic_match && safe_match && uid_match
    }
}
