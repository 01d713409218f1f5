//! # Shared Bus - Registry Event Log
//!
//! The registries emit their results as events; the encrypted variant's
//! payloads exist nowhere else. This crate carries those events to live
//! subscribers and keeps the block-indexed log they are read back from.
//!
//! ```text
//! ┌──────────────┐   publish(block, event)   ┌──────────────┐
//! │   Registry   │ ────────────────────────▶ │  Event Bus   │
//! └──────────────┘                           │  + history   │
//!                                            └──────┬───────┘
//!                      subscribe() / logs_in_block() │
//!                                                    ▼
//!                                            ┌──────────────┐
//!                                            │   Readers    │
//!                                            └──────────────┘
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventRecord, EventTopic, RegistryEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
