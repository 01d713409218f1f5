//! # Registry Container
//!
//! Holds both registry services, their stores and the shared event bus,
//! and hands out the block numbers writes are included in.
//!
//! Each service sits behind a `parking_lot::Mutex`; a write holds its
//! service's lock from block assignment to event publication, so blocks are
//! assigned in the order writes are applied.
//!
//! On startup the block logs both registries persisted are replayed into the
//! bus, and block numbering resumes after the highest logged block.

pub mod config;

pub use config::{ConfigError, NodeConfig, StorageBackend, StorageConfig};

use crate::adapters::NodeStore;
use parking_lot::{Mutex, MutexGuard};
use shared_bus::{InMemoryEventBus, RegistryEvent};
use shared_types::{Address, CallContext};
use sr_01_compact_list::KVStoreError;
use sr_03_transaction_registry::{RegistryError, TransactionRegistryService};
use sr_04_encrypted_registry::{EncryptedRegistryError, EncryptedRegistryService};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// The plaintext registry as wired by the node.
pub type PlaintextRegistry = TransactionRegistryService<NodeStore, InMemoryEventBus>;

/// The encrypted registry as wired by the node.
pub type EncryptedRegistry = EncryptedRegistryService<NodeStore, InMemoryEventBus>;

/// Errors raised while assembling the container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open storage: {0}")]
    Storage(#[from] KVStoreError),

    #[error("failed to replay plaintext event log: {0}")]
    PlaintextLog(#[from] RegistryError),

    #[error("failed to replay encrypted event log: {0}")]
    EncryptedLog(#[from] EncryptedRegistryError),
}

/// Central container for the node's services.
pub struct RegistryContainer {
    pub config: NodeConfig,
    pub event_bus: Arc<InMemoryEventBus>,
    transaction_registry: Mutex<PlaintextRegistry>,
    encrypted_registry: Mutex<EncryptedRegistry>,
    next_block: AtomicU64,
}

impl RegistryContainer {
    /// Validate `config`, open both stores and wire the services.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        config.validate()?;

        let event_bus = Arc::new(InMemoryEventBus::new());
        let transaction_registry = TransactionRegistryService::new(
            NodeStore::open(&config.storage, "plaintext")?,
            Arc::clone(&event_bus),
            config.registry,
        );
        let encrypted_registry = EncryptedRegistryService::new(
            NodeStore::open(&config.storage, "encrypted")?,
            Arc::clone(&event_bus),
        );

        let mut replayed: BTreeMap<u64, Vec<RegistryEvent>> = BTreeMap::new();
        for (block, events) in transaction_registry
            .event_log()?
            .into_iter()
            .chain(encrypted_registry.event_log()?)
        {
            replayed.entry(block).or_default().extend(events);
        }
        let replayed_events: usize = replayed.values().map(Vec::len).sum();
        for (block, events) in replayed {
            event_bus.restore(block, events);
        }

        let next_block = event_bus
            .last_block()
            .map_or(config.start_block, |last| config.start_block.max(last + 1));

        info!(
            backend = %config.storage.backend,
            duplicate_signatures = %config.registry.duplicate_signatures,
            start_block = config.start_block,
            next_block,
            replayed_events,
            "Registry container initialized"
        );

        Ok(Self {
            next_block: AtomicU64::new(next_block),
            config,
            event_bus,
            transaction_registry: Mutex::new(transaction_registry),
            encrypted_registry: Mutex::new(encrypted_registry),
        })
    }

    /// Lock the plaintext registry.
    pub fn transaction_registry(&self) -> MutexGuard<'_, PlaintextRegistry> {
        self.transaction_registry.lock()
    }

    /// Lock the encrypted registry.
    pub fn encrypted_registry(&self) -> MutexGuard<'_, EncryptedRegistry> {
        self.encrypted_registry.lock()
    }

    /// Include a new write from `caller` in the next block.
    pub fn next_call(&self, caller: Address) -> CallContext {
        let block_number = self.next_block.fetch_add(1, Ordering::SeqCst);
        CallContext::new(caller, block_number)
    }

    /// The most recently assigned block, or the block before the first one
    /// this process will assign.
    pub fn current_block(&self) -> u64 {
        self.next_block.load(Ordering::SeqCst).saturating_sub(1)
    }
}
