//! # Safe Registry Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Keys, transactions and wired services
//! └── integration/      # Cross-crate scenarios
//!     ├── scenarios.rs  # The six reference scenarios
//!     ├── pagination.rs # Page laws and ledger isolation
//!     ├── persistence.rs# Registries over the file-backed store
//!     └── node_ipc.rs   # JSON lines through the node handler
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sr-tests
//! cargo test -p sr-tests integration::scenarios
//!
//! # Benchmarks
//! cargo bench -p sr-tests
//! ```

pub mod fixtures;
pub mod integration;
