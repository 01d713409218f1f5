//! # Registry Telemetry
//!
//! Structured logging and Prometheus metrics for the Safe registry node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registry_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SR_SERVICE_NAME` | `safe-registry` | Service name in logs |
//! | `SR_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `SR_CONSOLE_OUTPUT` | `true` | Write logs to stderr |
//! | `SR_JSON_LOGS` | `false` | JSON logs (defaults on inside containers) |

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    gather_metrics, register_metrics, CURRENT_BLOCK, ENCRYPTION_KEYS_REGISTERED, REGISTRATIONS,
    SIGNATURE_FAILURES, SIGNATURES_STORED, TRANSACTIONS_STORED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    tracing_setup::init_tracing(config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
