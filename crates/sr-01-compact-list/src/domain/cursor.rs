//! # Cursor
//!
//! A position over a `CompactIndexedList` snapshot.
//!
//! A cursor is a plain `Copy` value: every operation returns a new cursor
//! and leaves its receiver untouched. It carries no storage handle, so
//! `skip`, `take` and `count` never touch the store. Reading the element a
//! cursor points at is done through `CompactIndexedList::value`.

use serde::{Deserialize, Serialize};

/// Immutable traversal state: `[position, end)` plus the element the last
/// `next` landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    position: u64,
    end: u64,
    current: Option<u64>,
}

impl Cursor {
    /// A cursor positioned before the first of `length` elements.
    pub fn over(length: u64) -> Self {
        Self {
            position: 0,
            end: length,
            current: None,
        }
    }

    /// Advance one element.
    ///
    /// Returns the successor and whether it points at an element. When the
    /// cursor is already exhausted the receiver is returned unchanged with
    /// `false`.
    #[must_use]
    pub fn next(self) -> (Cursor, bool) {
        if self.position >= self.end {
            return (self, false);
        }
        let advanced = Cursor {
            position: self.position + 1,
            end: self.end,
            current: Some(self.position),
        };
        (advanced, true)
    }

    /// Advance by `min(n, count())` elements without reading them.
    ///
    /// `skip(0)` returns a cursor equal to the receiver.
    #[must_use]
    pub fn skip(self, n: u64) -> Cursor {
        let step = n.min(self.count());
        if step == 0 {
            return self;
        }
        Cursor {
            position: self.position + step,
            end: self.end,
            current: None,
        }
    }

    /// Limit the cursor to at most `n` further elements.
    #[must_use]
    pub fn take(self, n: u64) -> Cursor {
        Cursor {
            position: self.position,
            end: self.position + n.min(self.count()),
            current: self.current,
        }
    }

    /// Number of elements still ahead of the cursor.
    pub fn count(&self) -> u64 {
        self.end.saturating_sub(self.position)
    }

    /// Index of the next element `next` would land on.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Index of the element the last `next` landed on, if any.
    pub fn current(&self) -> Option<u64> {
        self.current
    }

    /// True when `next` would return `false`.
    pub fn is_exhausted(&self) -> bool {
        self.count() == 0
    }
}
