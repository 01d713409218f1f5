use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Frame header: payload length (u32 LE) followed by its CRC32 (u32 LE).
const FRAME_HEADER: usize = 8;

/// File-backed key-value store for deployments without RocksDB.
///
/// Every committed batch is appended to a journal as one frame:
///
/// ```text
/// [len: u32 LE][crc32: u32 LE][bincode(Vec<(key, value)>)]
/// ```
///
/// The frame holds the batch's effective writes, with `InsertIfAbsent`
/// already resolved, so replay is a plain sequence of puts. A frame that is
/// short or fails its checksum marks a torn tail: replay stops there and the
/// file is truncated back to the last whole frame.
///
/// A write or sync that fails mid-frame is rolled back to the last committed
/// frame before the error is returned, and any stray bytes found past that
/// frame are cut before the next append. If a rollback itself fails the store
/// refuses every later write, since a frame appended behind broken bytes
/// would be dropped on replay.
pub struct FileBackedKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
    journal: File,
    /// Journal length up to the end of the last committed frame.
    committed: u64,
    poisoned: bool,
}

impl FileBackedKVStore {
    /// Open (or create) the journal at `path` and replay it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut journal = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let mut bytes = Vec::new();
        journal.read_to_end(&mut bytes)?;

        let (data, valid) = Self::replay(&bytes);
        if valid < bytes.len() {
            #[cfg(feature = "tracing-log")]
            tracing::warn!(
                path = %path.display(),
                dropped = bytes.len() - valid,
                "[sr-01] discarding torn journal tail"
            );
            journal.set_len(valid as u64)?;
            journal.sync_all()?;
        }

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            path = %path.display(),
            keys = data.len(),
            "[sr-01] opened journal"
        );

        Ok(Self {
            data,
            path,
            journal,
            committed: valid as u64,
            poisoned: false,
        })
    }

    /// Path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rebuild the map from journal bytes.
    ///
    /// Returns the map and the byte offset just past the last valid frame.
    fn replay(bytes: &[u8]) -> (HashMap<Vec<u8>, Vec<u8>>, usize) {
        let mut data = HashMap::new();
        let mut offset = 0;

        while offset + FRAME_HEADER <= bytes.len() {
            let len = u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ]) as usize;
            let crc = u32::from_le_bytes([
                bytes[offset + 4],
                bytes[offset + 5],
                bytes[offset + 6],
                bytes[offset + 7],
            ]);

            let start = offset + FRAME_HEADER;
            let Some(payload) = bytes.get(start..start + len) else {
                break;
            };
            if crc32fast::hash(payload) != crc {
                break;
            }
            let Ok(writes) = bincode::deserialize::<Vec<(Vec<u8>, Vec<u8>)>>(payload) else {
                break;
            };

            data.extend(writes);
            offset = start + len;
        }

        (data, offset)
    }

    /// Resolve a batch into the puts it actually performs.
    fn effective_writes(&self, operations: Vec<BatchOperation>) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut staged: HashMap<Vec<u8>, usize> = HashMap::new();
        let mut writes: Vec<(Vec<u8>, Vec<u8>)> = Vec::with_capacity(operations.len());

        for op in operations {
            let (key, value, only_if_absent) = match op {
                BatchOperation::Put { key, value } => (key, value, false),
                BatchOperation::InsertIfAbsent { key, value } => (key, value, true),
            };
            if only_if_absent && (staged.contains_key(&key) || self.data.contains_key(&key)) {
                continue;
            }
            match staged.get(&key) {
                Some(&slot) => writes[slot].1 = value,
                None => {
                    staged.insert(key.clone(), writes.len());
                    writes.push((key, value));
                }
            }
        }

        writes
    }

    fn append_frame(&mut self, writes: &[(Vec<u8>, Vec<u8>)]) -> Result<(), KVStoreError> {
        if self.poisoned {
            return Err(KVStoreError::IOError {
                message: format!(
                    "journal {} is read-only after a failed rollback",
                    self.path.display()
                ),
            });
        }

        let payload = bincode::serialize(writes).map_err(|e| KVStoreError::IOError {
            message: e.to_string(),
        })?;
        let len = u32::try_from(payload.len()).map_err(|_| KVStoreError::IOError {
            message: format!("batch of {} bytes exceeds frame limit", payload.len()),
        })?;

        let mut frame = Vec::with_capacity(FRAME_HEADER + payload.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&payload);

        let on_disk = self.journal.metadata()?.len();
        if on_disk < self.committed {
            self.poisoned = true;
            return Err(KVStoreError::CorruptionError {
                message: format!(
                    "journal {} shrank to {on_disk} bytes below {} committed",
                    self.path.display(),
                    self.committed
                ),
            });
        }
        if on_disk > self.committed {
            #[cfg(feature = "tracing-log")]
            tracing::warn!(
                path = %self.path.display(),
                stray = on_disk - self.committed,
                "[sr-01] cutting bytes past the last committed frame"
            );
            self.rollback()?;
        }

        let written = self
            .journal
            .write_all(&frame)
            .and_then(|()| self.journal.sync_data());
        if let Err(err) = written {
            self.rollback()?;
            return Err(err.into());
        }

        self.committed += frame.len() as u64;
        Ok(())
    }

    /// Truncate the journal to the last committed frame.
    fn rollback(&mut self) -> Result<(), KVStoreError> {
        let truncated = self
            .journal
            .set_len(self.committed)
            .and_then(|()| self.journal.sync_all());
        if let Err(err) = truncated {
            self.poisoned = true;
            #[cfg(feature = "tracing-log")]
            tracing::error!(
                path = %self.path.display(),
                error = %err,
                "[sr-01] journal rollback failed; refusing further writes"
            );
            return Err(err.into());
        }
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let writes = self.effective_writes(operations);
        if writes.is_empty() {
            return Ok(());
        }

        // Durable first; the map only changes once the frame is on disk.
        self.append_frame(&writes)?;
        self.data.extend(writes);
        Ok(())
    }
}
