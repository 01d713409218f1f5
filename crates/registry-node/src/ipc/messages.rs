//! # Wire Messages
//!
//! One JSON object per line in each direction. Requests are tagged by
//! `method`; responses echo the request `id` and carry either a `result`
//! (tagged by `kind`) or an `error`.
//!
//! ```text
//! {"id":1,"method":"retrieve_signatures_count","signer":"0x..","safe":"0x..","chain_id":"0x1","nonce":"0x5"}
//! {"id":1,"result":{"kind":"count","count":1}}
//! ```

use super::hex::{HexAddress, HexBytes, HexHash};
use serde::{Deserialize, Serialize};
use shared_bus::{EventRecord, EventTopic, RegistryEvent};
use shared_types::{Operation, SafeTransaction, U256};
use sr_03_transaction_registry::SignatureEntry;
use sr_04_encrypted_registry::RegistrationPointer;

/// A request line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Echoed in the response.
    #[serde(default)]
    pub id: u64,
    #[serde(flatten)]
    pub request: RegistryRequest,
}

/// Every operation the node serves.
///
/// Writes carry `from`, the caller identity the host vouches for. The node
/// does not authenticate it: whatever owns the stdin pipe must only forward
/// a `from` it has verified, since `register_encryption_key` overwrites the
/// key of exactly that address and `register_transaction` files payloads
/// under it as notary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RegistryRequest {
    // =========================================================================
    // PLAINTEXT REGISTRY
    // =========================================================================
    EnqueueTransaction {
        from: HexAddress,
        safe: HexAddress,
        chain_id: U256,
        nonce: U256,
        transaction: TransactionDto,
        signature: HexBytes,
    },
    RetrieveTransaction {
        digest: HexHash,
    },
    RetrieveSignatures {
        signer: HexAddress,
        safe: HexAddress,
        chain_id: U256,
        nonce: U256,
        start: u64,
        count: u64,
    },
    RetrieveSignaturesCount {
        signer: HexAddress,
        safe: HexAddress,
        chain_id: U256,
        nonce: U256,
    },
    /// The digest owners sign for `transaction` at `nonce`.
    TransactionHash {
        chain_id: U256,
        safe: HexAddress,
        nonce: U256,
        transaction: TransactionDto,
    },

    // =========================================================================
    // ENCRYPTED REGISTRY
    // =========================================================================
    RegisterTransaction {
        from: HexAddress,
        chain_id: U256,
        safe: HexAddress,
        nonce: U256,
        struct_hash: HexHash,
        #[serde(default)]
        signature: HexBytes,
        #[serde(default)]
        encrypted_payload: HexBytes,
    },
    /// Replaces the key of `from`; see the note on authenticating `from`.
    RegisterEncryptionKey {
        from: HexAddress,
        context: HexHash,
        public_key: HexHash,
    },
    RetrieveRegistrations {
        chain_id: U256,
        safe: HexAddress,
        nonce: U256,
        notary: HexAddress,
        start: u64,
        count: u64,
    },
    RetrieveRegistrationCount {
        chain_id: U256,
        safe: HexAddress,
        nonce: U256,
        notary: HexAddress,
    },
    RetrieveEncryptionPublicKeys {
        signers: Vec<HexAddress>,
    },

    // =========================================================================
    // LOGS & DIAGNOSTICS
    // =========================================================================
    /// Emitted events in `[from_block, to_block]`.
    GetLogs {
        from_block: u64,
        to_block: u64,
        #[serde(default)]
        topics: Vec<EventTopic>,
        #[serde(default)]
        safe: Option<HexAddress>,
        #[serde(default)]
        uid: Option<HexHash>,
    },
    /// Prometheus text exposition of the node's metrics.
    Metrics,
}

impl RegistryRequest {
    /// Method name, for logs and metric labels.
    pub fn method(&self) -> &'static str {
        match self {
            Self::EnqueueTransaction { .. } => "enqueue_transaction",
            Self::RetrieveTransaction { .. } => "retrieve_transaction",
            Self::RetrieveSignatures { .. } => "retrieve_signatures",
            Self::RetrieveSignaturesCount { .. } => "retrieve_signatures_count",
            Self::TransactionHash { .. } => "transaction_hash",
            Self::RegisterTransaction { .. } => "register_transaction",
            Self::RegisterEncryptionKey { .. } => "register_encryption_key",
            Self::RetrieveRegistrations { .. } => "retrieve_registrations",
            Self::RetrieveRegistrationCount { .. } => "retrieve_registration_count",
            Self::RetrieveEncryptionPublicKeys { .. } => "retrieve_encryption_public_keys",
            Self::GetLogs { .. } => "get_logs",
            Self::Metrics => "metrics",
        }
    }
}

/// A response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryResponse {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResponseBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl RegistryResponse {
    pub fn ok(id: u64, result: ResponseBody) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: u64, error: ErrorBody) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Successful results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseBody {
    /// A signature was appended.
    Enqueued {
        block_number: u64,
        list_index: u64,
        /// The transaction was stored by this call.
        newly_stored: bool,
    },
    /// An encrypted registration was accepted.
    Registered {
        block_number: u64,
        #[serde(default)]
        uid: Option<HexHash>,
        #[serde(default)]
        list_index: Option<u64>,
        #[serde(default)]
        signer: Option<HexAddress>,
    },
    KeyRegistered { block_number: u64 },
    Transaction { stored: bool, transaction: TransactionDto },
    Signatures { items: Vec<SignatureEntryDto>, total: u64 },
    Registrations { items: Vec<RegistrationDto>, total: u64 },
    Count { count: u64 },
    PublicKeys { keys: Vec<HexHash> },
    TransactionHash { digest: HexHash },
    Logs { logs: Vec<LogDto> },
    Metrics { text: String },
}

/// Failure classes a client can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The line is not a valid request.
    InvalidRequest,
    /// The signature failed to decode or recover.
    InvalidSignature,
    /// Exact resubmission under the reject policy.
    DuplicateSignature,
    /// Encrypted registration with neither signature nor payload.
    NothingToEnqueue,
    /// Storage failed or holds corrupt data.
    Storage,
    /// Metrics could not be rendered.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// =============================================================================
// DATA TRANSFER OBJECTS
// =============================================================================

/// `SafeTransaction` with hex byte fields. Omitted fields are zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionDto {
    pub to: HexAddress,
    pub value: U256,
    pub data: HexBytes,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: HexAddress,
    pub refund_receiver: HexAddress,
}

impl From<TransactionDto> for SafeTransaction {
    fn from(dto: TransactionDto) -> Self {
        SafeTransaction {
            to: dto.to.0,
            value: dto.value,
            data: dto.data.0,
            operation: dto.operation,
            safe_tx_gas: dto.safe_tx_gas,
            base_gas: dto.base_gas,
            gas_price: dto.gas_price,
            gas_token: dto.gas_token.0,
            refund_receiver: dto.refund_receiver.0,
        }
    }
}

impl From<SafeTransaction> for TransactionDto {
    fn from(tx: SafeTransaction) -> Self {
        TransactionDto {
            to: tx.to.into(),
            value: tx.value,
            data: tx.data.into(),
            operation: tx.operation,
            safe_tx_gas: tx.safe_tx_gas,
            base_gas: tx.base_gas,
            gas_price: tx.gas_price,
            gas_token: tx.gas_token.into(),
            refund_receiver: tx.refund_receiver.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntryDto {
    pub r: HexHash,
    pub vs: HexHash,
    pub tx_hash: HexHash,
}

impl From<SignatureEntry> for SignatureEntryDto {
    fn from(entry: SignatureEntry) -> Self {
        Self {
            r: entry.r.into(),
            vs: entry.vs.into(),
            tx_hash: entry.tx_hash.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDto {
    pub block_number: u64,
    pub uid: HexHash,
}

impl From<RegistrationPointer> for RegistrationDto {
    fn from(pointer: RegistrationPointer) -> Self {
        Self {
            block_number: pointer.block_number,
            uid: pointer.uid.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDto {
    pub block_number: u64,
    pub log_index: u64,
    pub event: EventDto,
}

impl From<EventRecord> for LogDto {
    fn from(record: EventRecord) -> Self {
        Self {
            block_number: record.block_number,
            log_index: record.log_index,
            event: record.event.into(),
        }
    }
}

/// `RegistryEvent` with hex byte fields. Compact signatures are `r ‖ vs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum EventDto {
    SignatureStored {
        signer: HexAddress,
        safe: HexAddress,
        digest: HexHash,
        chain_id: U256,
        nonce: U256,
        list_index: u64,
    },
    TransactionStored {
        digest: HexHash,
        safe: HexAddress,
        chain_id: U256,
        nonce: U256,
        transaction: TransactionDto,
    },
    SafeTransactionSigned {
        signer: HexAddress,
        safe: HexAddress,
        chain_id: U256,
        nonce: U256,
        struct_hash: HexHash,
        signature: HexBytes,
    },
    SafeTransactionRegistered {
        uid: HexHash,
        notary: HexAddress,
        safe: HexAddress,
        chain_id: U256,
        nonce: U256,
        encrypted_payload: HexBytes,
    },
    EncryptionKeyRegistered {
        signer: HexAddress,
        context: HexHash,
        public_key: HexHash,
    },
}

impl From<RegistryEvent> for EventDto {
    fn from(event: RegistryEvent) -> Self {
        match event {
            RegistryEvent::SignatureStored {
                signer,
                safe,
                digest,
                chain_id,
                nonce,
                list_index,
            } => EventDto::SignatureStored {
                signer: signer.into(),
                safe: safe.into(),
                digest: digest.into(),
                chain_id,
                nonce,
                list_index,
            },
            RegistryEvent::TransactionStored {
                digest,
                safe,
                chain_id,
                nonce,
                transaction,
            } => EventDto::TransactionStored {
                digest: digest.into(),
                safe: safe.into(),
                chain_id,
                nonce,
                transaction: transaction.into(),
            },
            RegistryEvent::SafeTransactionSigned {
                signer,
                safe,
                chain_id,
                nonce,
                struct_hash,
                signature,
            } => EventDto::SafeTransactionSigned {
                signer: signer.into(),
                safe: safe.into(),
                chain_id,
                nonce,
                struct_hash: struct_hash.into(),
                signature: [signature.r, signature.vs].concat().into(),
            },
            RegistryEvent::SafeTransactionRegistered {
                uid,
                notary,
                safe,
                chain_id,
                nonce,
                encrypted_payload,
            } => EventDto::SafeTransactionRegistered {
                uid: uid.into(),
                notary: notary.into(),
                safe: safe.into(),
                chain_id,
                nonce,
                encrypted_payload: encrypted_payload.into(),
            },
            RegistryEvent::EncryptionKeyRegistered {
                signer,
                context,
                public_key,
            } => EventDto::EncryptionKeyRegistered {
                signer: signer.into(),
                context: context.into(),
                public_key: public_key.into(),
            },
        }
    }
}
