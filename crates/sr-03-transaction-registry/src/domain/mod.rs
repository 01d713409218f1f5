//! # Domain Layer
//!
//! - `entities`: records, ledger entries and keys
//! - `store`: the transaction store and signature ledger storage views
//! - `config`: registry configuration
//! - `errors`: error types

pub mod config;
pub mod entities;
pub mod errors;
pub mod store;
