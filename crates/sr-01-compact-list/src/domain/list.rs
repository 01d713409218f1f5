//! # Compact Indexed List
//!
//! An append-only sequence of `FixedWidth` values stored in 32-byte words.
//!
//! ## Layout
//!
//! ```text
//! namespace ‖ 0x00              -> length (u64, big-endian)
//! namespace ‖ 0x01 ‖ slot_be64  -> packed elements of one word
//! ```
//!
//! Elements narrower than a word share a slot (`WORD_SIZE / WIDTH` per
//! slot); wider elements occupy one slot record each.

use std::marker::PhantomData;

use crate::domain::cursor::Cursor;
use crate::domain::errors::ListError;
use crate::domain::fixed_width::FixedWidth;
use crate::domain::page::Page;
use crate::ports::outbound::{BatchOperation, KeyValueStore};

/// Size of one storage word in bytes.
pub const WORD_SIZE: usize = 32;

const LENGTH_TAG: u8 = 0x00;
const SLOT_TAG: u8 = 0x01;

/// Handle to one list inside a key-value store.
///
/// The handle owns only its namespace; the store is passed to every call so
/// many lists can share one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactIndexedList<T> {
    namespace: Vec<u8>,
    _element: PhantomData<fn() -> T>,
}

impl<T: FixedWidth> CompactIndexedList<T> {
    /// Open the list stored under `namespace`.
    pub fn new(namespace: impl Into<Vec<u8>>) -> Self {
        Self {
            namespace: namespace.into(),
            _element: PhantomData,
        }
    }

    pub fn namespace(&self) -> &[u8] {
        &self.namespace
    }

    /// Elements per storage slot.
    pub fn per_slot() -> u64 {
        if T::WIDTH >= WORD_SIZE {
            1
        } else {
            (WORD_SIZE / T::WIDTH.max(1)) as u64
        }
    }

    fn length_key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.namespace.len() + 1);
        key.extend_from_slice(&self.namespace);
        key.push(LENGTH_TAG);
        key
    }

    fn slot_key(&self, slot: u64) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.namespace.len() + 9);
        key.extend_from_slice(&self.namespace);
        key.push(SLOT_TAG);
        key.extend_from_slice(&slot.to_be_bytes());
        key
    }

    /// Number of elements appended so far.
    pub fn length<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<u64, ListError> {
        match store.get(&self.length_key())? {
            None => Ok(0),
            Some(bytes) => {
                let word: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| ListError::CorruptLength { len: bytes.len() })?;
                Ok(u64::from_be_bytes(word))
            }
        }
    }

    /// Read a slot, checking it holds whole elements.
    fn read_slot<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        slot: u64,
    ) -> Result<Option<Vec<u8>>, ListError> {
        let bytes = store.get(&self.slot_key(slot))?;
        if let Some(bytes) = &bytes {
            let max = Self::per_slot() as usize * T::WIDTH;
            if bytes.len() % T::WIDTH != 0 || bytes.len() > max {
                return Err(ListError::CorruptSlot {
                    slot,
                    len: bytes.len(),
                });
            }
        }
        Ok(bytes)
    }

    /// Build the writes that append `value` without committing them.
    ///
    /// Returns the index the value will occupy and the batch operations
    /// (slot rewrite followed by the length update). The index reflects the
    /// committed state of the store, so at most one append per list may be
    /// staged in a single batch.
    pub fn append_operations<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        value: &T,
    ) -> Result<(u64, Vec<BatchOperation>), ListError> {
        let index = self.length(store)?;
        let per_slot = Self::per_slot();
        let slot = index / per_slot;
        let offset = (index % per_slot) as usize;

        let mut bytes = if offset == 0 {
            Vec::with_capacity(T::WIDTH * per_slot as usize)
        } else {
            let existing = self
                .read_slot(store, slot)?
                .ok_or(ListError::MissingElement { index: index - 1 })?;
            if existing.len() != offset * T::WIDTH {
                return Err(ListError::CorruptSlot {
                    slot,
                    len: existing.len(),
                });
            }
            existing
        };

        let before = bytes.len();
        value.encode(&mut bytes);
        debug_assert_eq!(bytes.len() - before, T::WIDTH, "encode wrote wrong width");

        let operations = vec![
            BatchOperation::put(self.slot_key(slot), bytes),
            BatchOperation::put(self.length_key(), (index + 1).to_be_bytes().to_vec()),
        ];
        Ok((index, operations))
    }

    /// Append `value` and commit it. Returns the new element's index.
    pub fn append<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        value: &T,
    ) -> Result<u64, ListError> {
        let (index, operations) = self.append_operations(store, value)?;
        store.atomic_batch_write(operations)?;

        #[cfg(feature = "tracing-log")]
        tracing::trace!(index, namespace_len = self.namespace.len(), "list append");

        Ok(index)
    }

    /// A cursor before the first element of the current list.
    pub fn iter<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<Cursor, ListError> {
        Ok(Cursor::over(self.length(store)?))
    }

    /// Element at `index`, or `None` past the end.
    pub fn get<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        index: u64,
    ) -> Result<Option<T>, ListError> {
        if index >= self.length(store)? {
            return Ok(None);
        }
        let per_slot = Self::per_slot();
        let slot = index / per_slot;
        let offset = (index % per_slot) as usize * T::WIDTH;
        let bytes = self
            .read_slot(store, slot)?
            .ok_or(ListError::MissingElement { index })?;
        let element = bytes
            .get(offset..offset + T::WIDTH)
            .ok_or(ListError::MissingElement { index })?;
        Ok(Some(T::decode(element)))
    }

    /// Element the cursor's last `next` landed on.
    pub fn value<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        cursor: &Cursor,
    ) -> Result<T, ListError> {
        let index = cursor.current().ok_or(ListError::CursorNotAdvanced)?;
        self.get(store, index)?
            .ok_or(ListError::MissingElement { index })
    }

    /// Iterate the elements ahead of `cursor`.
    pub fn values<'a, S: KeyValueStore + ?Sized>(
        &'a self,
        store: &'a S,
        cursor: Cursor,
    ) -> Values<'a, T, S> {
        Values {
            list: self,
            store,
            cursor,
        }
    }

    /// Read every element ahead of `cursor`.
    pub fn collect<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        cursor: Cursor,
    ) -> Result<Vec<T>, ListError> {
        self.values(store, cursor).collect()
    }

    /// Up to `count` elements starting at `start`, clipped to the length.
    ///
    /// Reads only the slots covering the requested range.
    pub fn slice<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        start: u64,
        count: u64,
    ) -> Result<Vec<T>, ListError> {
        let length = self.length(store)?;
        let end = start.saturating_add(count).min(length);
        if start >= end {
            return Ok(Vec::new());
        }

        let per_slot = Self::per_slot();
        let mut items = Vec::with_capacity((end - start) as usize);
        for slot in start / per_slot..=(end - 1) / per_slot {
            let first = slot * per_slot;
            let bytes = self
                .read_slot(store, slot)?
                .ok_or(ListError::MissingElement { index: first })?;
            for index in first.max(start)..(first + per_slot).min(end) {
                let offset = (index - first) as usize * T::WIDTH;
                let element = bytes
                    .get(offset..offset + T::WIDTH)
                    .ok_or(ListError::MissingElement { index })?;
                items.push(T::decode(element));
            }
        }
        Ok(items)
    }

    /// A page of the list together with its total length.
    pub fn retrieve<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        start: u64,
        count: u64,
    ) -> Result<Page<T>, ListError> {
        let total = self.length(store)?;
        let items = self.slice(store, start, count)?;
        Ok(Page { items, total })
    }
}

/// Iterator over the elements ahead of a cursor.
///
/// Yields `Err` once and then stops if the store fails.
pub struct Values<'a, T, S: ?Sized> {
    list: &'a CompactIndexedList<T>,
    store: &'a S,
    cursor: Cursor,
}

impl<T, S: ?Sized> Values<'_, T, S> {
    /// The cursor after the last yielded element.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }
}

impl<T: FixedWidth, S: KeyValueStore + ?Sized> Iterator for Values<'_, T, S> {
    type Item = Result<T, ListError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (next, has_value) = self.cursor.next();
        if !has_value {
            return None;
        }
        let item = self.list.value(self.store, &next);
        // Stop after an error instead of retrying the same slot.
        self.cursor = if item.is_ok() { next } else { next.take(0) };
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.cursor.count()).unwrap_or(usize::MAX);
        (0, Some(remaining))
    }
}
