//! # Ports Layer
//!
//! - `outbound.rs` - Driven ports (the key-value store the lists persist to)

pub mod outbound;
