//! # Page
//!
//! The result shape of every paginated registry read.

use serde::{Deserialize, Serialize};

/// A window of a ledger together with the ledger's full length.
///
/// `total` is always the ledger length, whatever window was asked for, so a
/// caller can page through without a separate count query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Elements in the requested window, clipped to the ledger.
    pub items: Vec<T>,
    /// Total number of elements in the ledger.
    pub total: u64,
}

impl<T> Page<T> {
    /// A page with no items.
    pub fn empty(total: u64) -> Self {
        Self {
            items: Vec::new(),
            total,
        }
    }

    /// Number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Map every item, keeping `total`.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}
