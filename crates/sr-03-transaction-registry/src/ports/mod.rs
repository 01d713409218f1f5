//! # Ports Layer
//!
//! - `inbound.rs` - The API this registry exposes
//!
//! The driven port is `sr_01_compact_list::KeyValueStore`.

pub mod inbound;
