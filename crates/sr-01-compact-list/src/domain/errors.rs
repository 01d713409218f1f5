//! # Domain Errors
//!
//! Error types for list and key-value store operations.

use thiserror::Error;

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

impl From<std::io::Error> for KVStoreError {
    fn from(err: std::io::Error) -> Self {
        KVStoreError::IOError {
            message: err.to_string(),
        }
    }
}

/// Errors raised by `CompactIndexedList`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListError {
    /// The underlying store failed.
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    /// `value` was called on a cursor that `next` never advanced.
    #[error("cursor has not been advanced")]
    CursorNotAdvanced,

    /// The stored length word is not a valid big-endian u64.
    #[error("corrupt length word ({len} bytes)")]
    CorruptLength { len: usize },

    /// A slot holds a byte count that is not a whole number of elements.
    #[error("corrupt slot {slot}: {len} bytes")]
    CorruptSlot { slot: u64, len: usize },

    /// An index below the stored length has no backing element.
    #[error("missing element at index {index}")]
    MissingElement { index: u64 },

    /// A serialized block log entry failed to encode or decode.
    #[error("corrupt log record: {message}")]
    CorruptRecord { message: String },
}
