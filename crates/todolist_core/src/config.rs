//! Host-supplied configuration for store and logging bootstrap.
//!
//! # Responsibility
//! - Describe where the store lives and which schema version it is opened at.
//! - Provide defaults matching the persisted layout (`todolist_db`, version 1).
//!
//! # Invariants
//! - A config that fails `validate()` is never used to open a store.

use crate::db::{OpenError, MAX_SCHEMA_VERSION, SCHEMA_VERSION, STORE_NAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of rows pulled per cursor step.
pub const DEFAULT_SCAN_BATCH_SIZE: u32 = 64;

/// Storage location for the named store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreLocation {
    /// Store file lives at `<dir>/<name>.sqlite3`.
    Directory(PathBuf),
    /// Private in-memory store, discarded with the handle.
    Memory,
}

/// Store bootstrap options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Logical store name; also the file stem on disk.
    pub name: String,
    /// Requested schema version, `1..=i32::MAX`.
    pub version: u32,
    pub location: StoreLocation,
    /// Rows fetched per cursor step during a full scan.
    pub scan_batch_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: STORE_NAME.to_string(),
            version: SCHEMA_VERSION,
            location: StoreLocation::Memory,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

impl StoreConfig {
    /// Default on-disk store inside `dir`.
    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::Directory(dir.into()),
            ..Self::default()
        }
    }

    /// Checks name, version and batch size before any store access.
    pub fn validate(&self) -> Result<(), OpenError> {
        validate_store_name(&self.name)?;
        if self.version == 0 || self.version > MAX_SCHEMA_VERSION {
            return Err(OpenError::InvalidVersion(self.version));
        }
        if self.scan_batch_size == 0 {
            return Err(OpenError::InvalidConfig(
                "scan_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logging bootstrap options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// One of `trace|debug|info|warn|error`, case-insensitive.
    pub level: String,
    /// Absolute directory for rolling log files.
    pub dir: PathBuf,
}

/// Top-level configuration accepted from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoConfig {
    pub store: StoreConfig,
    pub log: Option<LogConfig>,
}

/// Store names become file stems, so path syntax is rejected.
pub(crate) fn validate_store_name(name: &str) -> Result<(), OpenError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(OpenError::InvalidStoreName(name.to_string()))
    }
}
