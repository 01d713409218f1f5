//! # Shared Types Crate
//!
//! Primitive aliases and domain entities shared by the registry crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type that crosses a crate boundary
//!   (storage records, events, IPC payloads) is defined here.
//! - **Caller Identity**: The `caller` in [`CallContext`] is supplied by the
//!   host and is authoritative; payloads never carry a claimed signer.

pub mod context;
pub mod entities;

pub use context::CallContext;
pub use entities::*;
