//! # Compact Indexed List (sr-01)
//!
//! Storage primitives shared by both registry variants:
//!
//! - the [`KeyValueStore`] port every ledger and record store is written to,
//! - [`CompactIndexedList`], an append-only sequence of fixed-width values
//!   packed into 32-byte storage words,
//! - [`Cursor`], the value-semantics iterator used for pagination,
//! - [`Page`], the `(items, total)` shape every paginated read returns,
//! - [`BlockLog`], emitted records kept per block beside the ledgers.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Append-only | Elements are never rewritten or removed |
//! | 2 | Dense indices | `append` returns the previous length |
//! | 3 | Pure cursors | Cursor operations return new values, never mutate |
//! | 4 | Clipping reads | Out-of-range `slice`/`retrieve` clip, never fail |
//! | 5 | Atomic appends | Slot and length updates land in one batch |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - list, cursor, element encoding, pages, errors
//! - `ports/` - the `KeyValueStore` driven port
//! - `adapters/` - in-memory and file-backed stores
//!
//! ## Usage
//!
//! ```ignore
//! use sr_01_compact_list::{CompactIndexedList, InMemoryKVStore};
//!
//! let mut store = InMemoryKVStore::new();
//! let list: CompactIndexedList<u64> = CompactIndexedList::new(b"demo/".to_vec());
//! list.append(&mut store, &7)?;
//! let page = list.retrieve(&store, 0, 10)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

// Re-export key types for convenience
pub use adapters::storage::{FileBackedKVStore, InMemoryKVStore};
pub use domain::block_log::BlockLog;
pub use domain::cursor::Cursor;
pub use domain::errors::{KVStoreError, ListError};
pub use domain::fixed_width::FixedWidth;
pub use domain::list::{CompactIndexedList, Values, WORD_SIZE};
pub use domain::page::Page;
pub use ports::outbound::{BatchOperation, KeyValueStore};
