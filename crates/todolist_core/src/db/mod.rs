//! Store handle lifecycle: open, version check and one-time upgrade.
//!
//! # Responsibility
//! - Open or create the named SQLite store.
//! - Run the schema upgrade when the stored version is below the requested one.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No record access happens before open (and upgrade, if due) succeeds.
//! - A store at or above the requested version is reused unchanged.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_store, open_store_in_memory, open_with_config, StoreHandle};

/// Default store name.
pub const STORE_NAME: &str = "todolist_db";
/// Schema version this binary opens the store at.
pub const SCHEMA_VERSION: u32 = 1;
/// Highest version `PRAGMA user_version` can hold (signed 32-bit).
pub const MAX_SCHEMA_VERSION: u32 = i32::MAX as u32;
/// Record table.
pub const TODO_TABLE: &str = "todolist_os";
/// On-disk file extension for named stores.
pub const STORE_FILE_EXTENSION: &str = "sqlite3";

pub type OpenResult<T> = Result<T, OpenError>;

/// The store could not be opened; no usable handle exists.
#[derive(Debug)]
pub enum OpenError {
    /// Engine-level failure (permission, quota, corrupt file, upgrade SQL).
    Sqlite(rusqlite::Error),
    /// Store directory could not be created.
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Store name is empty or contains path syntax.
    InvalidStoreName(String),
    /// Requested schema version is not >= 1.
    InvalidVersion(u32),
    /// Bootstrap options are inconsistent.
    InvalidConfig(String),
    /// Upgrade was skipped but the store lacks the required table.
    MissingRequiredTable(&'static str),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create store directory `{}`: {source}",
                path.display()
            ),
            Self::InvalidStoreName(name) => write!(
                f,
                "invalid store name `{name}`; expected [A-Za-z0-9_.-] characters only"
            ),
            Self::InvalidVersion(version) => {
                write!(
                    f,
                    "invalid schema version {version}; expected 1..={MAX_SCHEMA_VERSION}"
                )
            }
            Self::InvalidConfig(message) => write!(f, "invalid store config: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "store is missing required table `{table}`")
            }
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDirectory { source, .. } => Some(source),
            Self::InvalidStoreName(_)
            | Self::InvalidVersion(_)
            | Self::InvalidConfig(_)
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for OpenError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
