//! # Domain Layer
//!
//! Pure list logic. Storage access goes through the `KeyValueStore` port.
//!
//! ## Modules
//!
//! - `list` - `CompactIndexedList` and its slot layout
//! - `block_log` - per-block record batches
//! - `cursor` - immutable traversal cursor
//! - `fixed_width` - element encoding contract
//! - `page` - pagination result
//! - `errors` - domain error types

pub mod block_log;
pub mod cursor;
pub mod errors;
pub mod fixed_width;
pub mod list;
pub mod page;
