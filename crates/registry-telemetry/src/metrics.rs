//! Prometheus metrics for the registry.
//!
//! All metrics follow the naming convention: `sr_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PLAINTEXT REGISTRY
    // =========================================================================

    /// Signatures appended to a signature ledger
    pub static ref SIGNATURES_STORED: Counter = Counter::new(
        "sr_signatures_stored_total",
        "Total number of signatures appended to signature ledgers"
    ).expect("metric creation failed");

    /// Transactions stored for the first time under their digest
    pub static ref TRANSACTIONS_STORED: Counter = Counter::new(
        "sr_transactions_stored_total",
        "Total number of transactions stored under a new digest"
    ).expect("metric creation failed");

    // =========================================================================
    // ENCRYPTED REGISTRY
    // =========================================================================

    /// Encrypted payload registrations
    pub static ref REGISTRATIONS: Counter = Counter::new(
        "sr_registrations_total",
        "Total number of encrypted payload registrations"
    ).expect("metric creation failed");

    /// Encryption key (re)registrations
    pub static ref ENCRYPTION_KEYS_REGISTERED: Counter = Counter::new(
        "sr_encryption_keys_registered_total",
        "Total number of encryption key registrations"
    ).expect("metric creation failed");

    // =========================================================================
    // REJECTIONS
    // =========================================================================

    /// Signatures that failed to decode or recover, by operation and reason
    pub static ref SIGNATURE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("sr_signature_failures_total", "Rejected signatures by operation and reason"),
        &["operation", "reason"]
    ).expect("metric creation failed");

    /// Last block number assigned to a write
    pub static ref CURRENT_BLOCK: Gauge = Gauge::new(
        "sr_node_current_block",
        "Block number assigned to the most recent write"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SIGNATURES_STORED.clone()),
        Box::new(TRANSACTIONS_STORED.clone()),
        Box::new(REGISTRATIONS.clone()),
        Box::new(ENCRYPTION_KEYS_REGISTERED.clone()),
        Box::new(SIGNATURE_FAILURES.clone()),
        Box::new(CURRENT_BLOCK.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
