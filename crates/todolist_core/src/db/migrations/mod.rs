//! Schema upgrade registry and executor.
//!
//! # Responsibility
//! - Register upgrade scripts in strictly increasing version order.
//! - Run pending scripts atomically when a store is opened at a higher
//!   version than it was stored at.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - The requested version is mirrored to `PRAGMA user_version` on upgrade.
//! - A store at or above the requested version is never touched.

use crate::db::OpenResult;
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// What opening the store did to its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// Stored version already satisfied the request.
    Skipped { stored_version: u32 },
    /// Upgrade ran and the store now reports `to`.
    Upgraded { from: u32, to: u32 },
}

impl UpgradeOutcome {
    /// Schema version the store reports after open.
    pub fn version(self) -> u32 {
        match self {
            Self::Skipped { stored_version } => stored_version,
            Self::Upgraded { to, .. } => to,
        }
    }

    pub fn ran_upgrade(self) -> bool {
        matches!(self, Self::Upgraded { .. })
    }
}

/// Returns the newest script version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Runs the upgrade step when `stored < requested`.
///
/// Scripts up to `requested` are applied in one transaction; a requested
/// version above every script is a bare version bump.
pub fn upgrade_if_needed(conn: &mut Connection, requested: u32) -> OpenResult<UpgradeOutcome> {
    let stored = stored_version(conn)?;
    if stored >= requested {
        return Ok(UpgradeOutcome::Skipped {
            stored_version: stored,
        });
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= stored || migration.version > requested {
            continue;
        }
        tx.execute_batch(migration.sql)?;
    }
    tx.execute_batch(&format!("PRAGMA user_version = {requested};"))?;
    tx.commit()?;

    info!(
        "event=store_upgrade module=db status=ok from_version={} to_version={}",
        stored, requested
    );
    Ok(UpgradeOutcome::Upgraded {
        from: stored,
        to: requested,
    })
}

/// Reads the schema version recorded in the store.
pub fn stored_version(conn: &Connection) -> OpenResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
