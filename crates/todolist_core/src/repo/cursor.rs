//! Full-scan cursor over the record table.
//!
//! # Responsibility
//! - Yield every record lazily in ascending `id` order.
//! - Hold one read-only transaction for the lifetime of the walk.
//!
//! # Invariants
//! - Each cursor opens its own read transaction and keeps its own position;
//!   nothing is shared between calls.
//! - The snapshot is taken when the cursor opens, so commits that happen
//!   later are never observed mid-walk.
//! - After the first error the cursor is fused.

use crate::db::TODO_TABLE;
use crate::model::todo::{TodoId, TodoRecord};
use log::{error, info, warn};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::iter::FusedIterator;
use std::time::Instant;

const SCAN_FIRST_BATCH_SQL: &str = "SELECT id, title, description
FROM todolist_os
ORDER BY id ASC
LIMIT ?1;";

const SCAN_NEXT_BATCH_SQL: &str = "SELECT id, title, description
FROM todolist_os
WHERE id > ?1
ORDER BY id ASC
LIMIT ?2;";

pub type ReadResult<T> = Result<T, ReadError>;

/// A full scan could not complete. The caller keeps its previous view.
#[derive(Debug)]
pub enum ReadError {
    /// Read transaction or first cursor step could not be opened.
    Open(rusqlite::Error),
    /// Advancing the cursor failed part way through the table.
    Step(rusqlite::Error),
    /// Persisted row does not form a valid record.
    InvalidData(String),
    /// The connection is already inside a transaction (another live cursor
    /// or a caller-held `BEGIN`), so no private snapshot can be taken.
    ConnectionBusy,
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "failed to open scan cursor: {err}"),
            Self::Step(err) => write!(f, "failed to advance scan cursor: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::ConnectionBusy => {
                write!(f, "connection already holds an open transaction")
            }
        }
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) | Self::Step(err) => Some(err),
            Self::InvalidData(_) | Self::ConnectionBusy => None,
        }
    }
}

/// Lazy, finite, non-restartable sequence of records.
///
/// Rows are pulled in keyset batches inside a single deferred transaction.
/// The transaction is released as soon as the last batch is buffered or the
/// cursor is dropped. While it is held, the connection accepts no other
/// cursor or write transaction; open a separate handle for concurrent work.
pub struct TodoCursor<'conn> {
    conn: &'conn Connection,
    tx: Option<Transaction<'conn>>,
    buffer: VecDeque<TodoRecord>,
    last_id: Option<i64>,
    batch_size: u32,
    drained: bool,
    yielded: usize,
    finished: bool,
    started_at: Instant,
}

impl<'conn> TodoCursor<'conn> {
    pub(crate) fn open(conn: &'conn Connection, batch_size: u32) -> ReadResult<Self> {
        let started_at = Instant::now();
        if !conn.is_autocommit() {
            error!(
                "event=todo_scan module=repo status=error stage=open error=connection_in_transaction"
            );
            return Err(ReadError::ConnectionBusy);
        }
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Deferred).map_err(|err| {
            error!(
                "event=todo_scan module=repo status=error stage=open error={}",
                err
            );
            ReadError::Open(err)
        })?;

        let mut cursor = Self {
            conn,
            tx: Some(tx),
            buffer: VecDeque::new(),
            last_id: None,
            batch_size: batch_size.max(1),
            drained: false,
            yielded: 0,
            finished: false,
            started_at,
        };

        // The first step pins the read snapshot; failing here means the
        // cursor never opened.
        cursor.fetch_batch().map_err(|err| {
            error!(
                "event=todo_scan module=repo status=error stage=open error={}",
                err
            );
            match err {
                ReadError::Step(inner) => ReadError::Open(inner),
                other => other,
            }
        })?;
        Ok(cursor)
    }

    /// Rows pulled per batch.
    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Number of records handed out so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    fn fetch_batch(&mut self) -> ReadResult<()> {
        let limit = i64::from(self.batch_size);
        let sql = if self.last_id.is_some() {
            SCAN_NEXT_BATCH_SQL
        } else {
            SCAN_FIRST_BATCH_SQL
        };
        let mut stmt = self.conn.prepare_cached(sql).map_err(ReadError::Step)?;
        let mut rows = match self.last_id {
            Some(last_id) => stmt.query(params![last_id, limit]),
            None => stmt.query(params![limit]),
        }
        .map_err(ReadError::Step)?;

        let mut fetched: u32 = 0;
        while let Some(row) = rows.next().map_err(ReadError::Step)? {
            let record = parse_todo_row(row)?;
            self.last_id = Some(record.id.get());
            self.buffer.push_back(record);
            fetched += 1;
        }
        drop(rows);
        drop(stmt);

        if fetched < self.batch_size {
            // Everything left is buffered; release the read transaction.
            self.drained = true;
            self.release();
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Some(tx) = self.tx.take() {
            if let Err(err) = tx.commit() {
                warn!(
                    "event=todo_scan module=repo status=warn stage=release error={}",
                    err
                );
            }
        }
    }

    fn log_end(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        info!(
            "event=todo_scan module=repo status=ok records={} duration_ms={}",
            self.yielded,
            self.started_at.elapsed().as_millis()
        );
    }
}

impl Iterator for TodoCursor<'_> {
    type Item = ReadResult<TodoRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                self.yielded += 1;
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }
            if self.drained {
                self.log_end();
                return None;
            }
            if let Err(err) = self.fetch_batch() {
                self.drained = true;
                self.release();
                self.finished = true;
                error!(
                    "event=todo_scan module=repo status=error stage=step records={} error={}",
                    self.yielded, err
                );
                return Some(Err(err));
            }
        }
    }
}

impl FusedIterator for TodoCursor<'_> {}

fn parse_todo_row(row: &Row<'_>) -> ReadResult<TodoRecord> {
    let raw_id: i64 = row.get("id").map_err(ReadError::Step)?;
    let id = TodoId::new(raw_id).ok_or_else(|| {
        ReadError::InvalidData(format!("invalid id value `{raw_id}` in {TODO_TABLE}.id"))
    })?;

    Ok(TodoRecord {
        id,
        title: row.get("title").map_err(ReadError::Step)?,
        description: row.get("description").map_err(ReadError::Step)?,
    })
}
