//! # Node Configuration
//!
//! Unified configuration for the storage backend, the registries and
//! telemetry.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SR_STORAGE_BACKEND` | `memory` | `memory`, `file` or `rocksdb` |
//! | `SR_DATA_DIR` | `./data` | Directory for persistent backends |
//! | `SR_DUPLICATE_SIGNATURES` | `append` | `append` or `reject` |
//! | `SR_START_BLOCK` | `1` | Block number of the first write |

use registry_telemetry::TelemetryConfig;
use sr_03_transaction_registry::{DuplicatePolicy, RegistryConfig};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Plaintext registry configuration.
    pub registry: RegistryConfig,
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
    /// Block number assigned to the first write of this process.
    pub start_block: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            registry: RegistryConfig::default(),
            telemetry: TelemetryConfig::default(),
            start_block: 1,
        }
    }
}

impl NodeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// unset variables. Set but unparsable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            telemetry: TelemetryConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(value) = lookup("SR_STORAGE_BACKEND") {
            config.storage.backend = parse_var("SR_STORAGE_BACKEND", &value)?;
        }
        if let Some(value) = lookup("SR_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("SR_DUPLICATE_SIGNATURES") {
            config.registry.duplicate_signatures =
                parse_var::<DuplicatePolicy>("SR_DUPLICATE_SIGNATURES", &value)?;
        }
        if let Some(value) = lookup("SR_START_BLOCK") {
            config.start_block = parse_var("SR_START_BLOCK", &value)?;
        }

        Ok(config)
    }

    /// Check that the configuration can be served by this build.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the RocksDB backend is selected without the `rocksdb` feature
    /// - a persistent backend points at an existing non-directory path
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::BackendUnavailable(StorageBackend::RocksDb));
        }
        if self.storage.backend.is_persistent()
            && self.storage.data_dir.exists()
            && !self.storage.data_dir.is_dir()
        {
            return Err(ConfigError::DataDirNotDirectory(self.storage.data_dir.clone()));
        }
        Ok(())
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is set to a value that does not parse.
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The selected backend was not compiled in.
    #[error("storage backend '{0}' is not available in this build")]
    BackendUnavailable(StorageBackend),

    /// The data directory path exists but is a file.
    #[error("data directory {0:?} is not a directory")]
    DataDirNotDirectory(PathBuf),
}

/// Where registry state lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process memory; nothing survives a restart.
    #[default]
    Memory,
    /// Checksummed append-only journals.
    File,
    /// RocksDB (feature `rocksdb`).
    RocksDb,
}

impl StorageBackend {
    pub fn is_persistent(self) -> bool {
        !matches!(self, StorageBackend::Memory)
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "rocksdb" => Ok(Self::RocksDb),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::File => f.write_str("file"),
            Self::RocksDb => f.write_str("rocksdb"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backend selection.
    pub backend: StorageBackend,
    /// Data directory for persistent backends.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}
