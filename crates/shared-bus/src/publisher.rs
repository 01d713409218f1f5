//! # Event Publisher
//!
//! Defines the publishing side of the event bus and the in-memory log.

use crate::events::{EventFilter, EventRecord, RegistryEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Trait for publishing events to the bus.
///
/// Registries call this once their storage batch has committed, so a
/// published event always describes persisted state.
pub trait EventPublisher: Send + Sync {
    /// Append `event` to the log of `block_number` and notify subscribers.
    ///
    /// Returns the record as it was logged.
    fn publish(&self, block_number: u64, event: RegistryEvent) -> EventRecord;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for live subscribers and keeps every
/// published record, indexed by block, for log queries.
pub struct InMemoryEventBus {
    /// Broadcast sender for records.
    sender: broadcast::Sender<EventRecord>,

    /// Retained log, by block number.
    history: RwLock<BTreeMap<u64, Vec<EventRecord>>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            history: RwLock::new(BTreeMap::new()),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to records matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        debug!(topics = ?filter.topics, "New subscription created");
        Subscription::new(receiver, filter)
    }

    /// Get a stream of records matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Records of one block that match `filter`, in log order.
    #[must_use]
    pub fn logs_in_block(&self, block_number: u64, filter: &EventFilter) -> Vec<EventRecord> {
        self.history
            .read()
            .get(&block_number)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| filter.matches(&record.event))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Records in `[from, to]` that match `filter`, in log order.
    #[must_use]
    pub fn logs(&self, from: u64, to: u64, filter: &EventFilter) -> Vec<EventRecord> {
        if from > to {
            return Vec::new();
        }
        self.history
            .read()
            .range(from..=to)
            .flat_map(|(_, records)| records.iter())
            .filter(|record| filter.matches(&record.event))
            .cloned()
            .collect()
    }

    /// Put previously persisted records of `block_number` back into the log.
    ///
    /// Records are appended in order after any the block already holds.
    /// Nothing is broadcast and `events_published` is unchanged: these
    /// events were published by an earlier run.
    pub fn restore(&self, block_number: u64, events: Vec<RegistryEvent>) {
        let mut history = self.history.write();
        let block = history.entry(block_number).or_default();
        for event in events {
            let log_index = block.len() as u64;
            block.push(EventRecord {
                block_number,
                log_index,
                event,
            });
        }
    }

    /// Highest block holding at least one record.
    #[must_use]
    pub fn last_block(&self) -> Option<u64> {
        self.history.read().keys().next_back().copied()
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, block_number: u64, event: RegistryEvent) -> EventRecord {
        let topic = event.topic();

        let record = {
            let mut history = self.history.write();
            let block = history.entry(block_number).or_default();
            let record = EventRecord {
                block_number,
                log_index: block.len() as u64,
                event,
            };
            block.push(record.clone());
            record
        };

        self.events_published.fetch_add(1, Ordering::Relaxed);

        // No receivers is normal; the record is still in the history.
        let receivers = self.sender.send(record.clone()).unwrap_or(0);
        debug!(
            topic = ?topic,
            block = block_number,
            log_index = record.log_index,
            receivers,
            "Event published"
        );

        record
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
