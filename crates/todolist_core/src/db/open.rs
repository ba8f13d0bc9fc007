//! Store bootstrap utilities.
//!
//! # Responsibility
//! - Open file-backed or in-memory stores by name.
//! - Configure connection pragmas and run the version check/upgrade before
//!   handing out a `StoreHandle`.
//!
//! # Invariants
//! - A returned handle always has the record table available.
//! - Failed opens never return a partially initialized handle.

use super::migrations::{upgrade_if_needed, UpgradeOutcome};
use super::{OpenError, OpenResult, MAX_SCHEMA_VERSION, STORE_FILE_EXTENSION, TODO_TABLE};
use crate::config::{
    validate_store_name, StoreConfig, StoreLocation, DEFAULT_SCAN_BATCH_SIZE,
};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Open store plus the metadata of how it was opened.
///
/// This is the explicit context object every other component receives; there
/// is no ambient global handle.
#[derive(Debug)]
pub struct StoreHandle {
    conn: Connection,
    name: String,
    requested_version: u32,
    upgrade: UpgradeOutcome,
    path: Option<PathBuf>,
    scan_batch_size: u32,
}

impl StoreHandle {
    /// Borrowed connection for repositories.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version passed to `open`.
    pub fn requested_version(&self) -> u32 {
        self.requested_version
    }

    /// Version the store reports; may exceed the requested one.
    pub fn schema_version(&self) -> u32 {
        self.upgrade.version()
    }

    pub fn upgrade_outcome(&self) -> UpgradeOutcome {
        self.upgrade
    }

    /// File backing the store, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rows per cursor step for repositories built from this handle.
    pub fn scan_batch_size(&self) -> u32 {
        self.scan_batch_size
    }
}

/// Opens (or creates) store `name` inside `dir` at schema `version`.
///
/// Idempotent per `(name, version)`: reopening an existing store skips the
/// upgrade and reuses its table.
///
/// # Side effects
/// - Creates `dir` when missing.
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(dir: impl AsRef<Path>, name: &str, version: u32) -> OpenResult<StoreHandle> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=file version={version}");

    let result = validate_open_args(name, version)
        .and_then(|()| store_file_path(dir.as_ref(), name))
        .and_then(|path| {
            let conn = Connection::open(&path)?;
            bootstrap(conn, name, version, Some(path))
        });
    log_open_result("file", &result, started_at);
    result
}

/// Opens a private in-memory store. Every call yields a fresh, empty store.
pub fn open_store_in_memory(name: &str, version: u32) -> OpenResult<StoreHandle> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=memory version={version}");

    let result = validate_open_args(name, version).and_then(|()| {
        let conn = Connection::open_in_memory()?;
        bootstrap(conn, name, version, None)
    });
    log_open_result("memory", &result, started_at);
    result
}

/// Opens the store described by `config`.
///
/// The configured scan batch size is carried on the handle and picked up by
/// `SqliteTodoRepository::from_handle`.
pub fn open_with_config(config: &StoreConfig) -> OpenResult<StoreHandle> {
    config.validate()?;
    let mut handle = match &config.location {
        StoreLocation::Directory(dir) => open_store(dir, &config.name, config.version),
        StoreLocation::Memory => open_store_in_memory(&config.name, config.version),
    }?;
    handle.scan_batch_size = config.scan_batch_size;
    Ok(handle)
}

fn validate_open_args(name: &str, version: u32) -> OpenResult<()> {
    validate_store_name(name)?;
    if version == 0 || version > MAX_SCHEMA_VERSION {
        return Err(OpenError::InvalidVersion(version));
    }
    Ok(())
}

fn store_file_path(dir: &Path, name: &str) -> OpenResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| OpenError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(dir.join(format!("{name}.{STORE_FILE_EXTENSION}")))
}

fn bootstrap(
    mut conn: Connection,
    name: &str,
    version: u32,
    path: Option<PathBuf>,
) -> OpenResult<StoreHandle> {
    conn.busy_timeout(Duration::from_secs(5))?;
    if path.is_some() {
        // Readers keep their snapshot while other handles commit.
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    }
    let upgrade = upgrade_if_needed(&mut conn, version)?;
    if !table_exists(&conn, TODO_TABLE)? {
        return Err(OpenError::MissingRequiredTable(TODO_TABLE));
    }

    Ok(StoreHandle {
        conn,
        name: name.to_string(),
        requested_version: version,
        upgrade,
        path,
        scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
    })
}

fn table_exists(conn: &Connection, table: &str) -> OpenResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn log_open_result(mode: &str, result: &OpenResult<StoreHandle>, started_at: Instant) {
    match result {
        Ok(handle) => info!(
            "event=store_open module=db status=ok mode={} duration_ms={} schema_version={} upgraded={}",
            mode,
            started_at.elapsed().as_millis(),
            handle.schema_version(),
            handle.upgrade_outcome().ran_upgrade()
        ),
        Err(err) => error!(
            "event=store_open module=db status=error mode={} duration_ms={} error_code={} error={}",
            mode,
            started_at.elapsed().as_millis(),
            open_error_code(err),
            err
        ),
    }
}

fn open_error_code(err: &OpenError) -> &'static str {
    match err {
        OpenError::Sqlite(_) => "store_open_failed",
        OpenError::CreateDirectory { .. } => "store_dir_failed",
        OpenError::InvalidStoreName(_) | OpenError::InvalidVersion(_) => "invalid_argument",
        OpenError::InvalidConfig(_) => "invalid_config",
        OpenError::MissingRequiredTable(_) => "missing_table",
    }
}
