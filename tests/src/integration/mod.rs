//! # Integration Tests
//!
//! Scenarios that cross crate boundaries: list storage under the
//! registries, signer recovery feeding ledgers, events on the shared bus,
//! and the node's wire surface.

pub mod node_ipc;
pub mod pagination;
pub mod persistence;
pub mod scenarios;
