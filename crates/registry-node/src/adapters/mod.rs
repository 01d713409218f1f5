//! # Adapters
//!
//! Outbound port implementations used by the node.

pub mod storage;

pub use storage::NodeStore;
