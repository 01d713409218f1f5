//! # Registry Node Library
//!
//! Exposes the node's modules for testing. The entry point is the
//! `registry-node` binary.
//!
//! ## Modules
//!
//! - `container/` - configuration and service wiring
//! - `adapters/` - storage backends behind the `KeyValueStore` port
//! - `ipc/` - JSON-lines request handling

pub mod adapters;
pub mod container;
pub mod ipc;

pub use container::{ContainerError, NodeConfig, RegistryContainer};
pub use ipc::IpcHandler;
