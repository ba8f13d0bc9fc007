//! To-do repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Run insert/delete as atomic read-write transactions.
//! - Hand out full-scan cursors for view rebuilds.
//!
//! # Invariants
//! - Mutations take `&mut self`, so they are serialized and can never run
//!   while a cursor borrowed from the same repository is alive.
//! - Other repositories sharing the connection get a `TransactionError` in
//!   phase `Idle` while such a cursor holds its read transaction.
//! - A mutation returns `Ok` only after its transaction reached `Complete`.
//! - Deleting an absent id commits successfully and changes nothing.

use crate::config::DEFAULT_SCAN_BATCH_SIZE;
use crate::db::{OpenError, OpenResult, StoreHandle, TODO_TABLE};
use crate::model::todo::{NewTodo, TodoId, TodoRecord};
use crate::repo::cursor::{ReadResult, TodoCursor};
use crate::repo::tx::{MutationKind, TxLifecycle, TxResult};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Repository interface for the record table.
///
/// Implementations besides SQLite exist for tests that need a store which
/// fails on demand.
pub trait TodoRepository {
    /// Lazy full-scan sequence produced by `scan_all`.
    type Cursor<'a>: Iterator<Item = ReadResult<TodoRecord>>
    where
        Self: 'a;

    /// Adds one record and returns its store-assigned id.
    fn insert_todo(&mut self, todo: &NewTodo) -> TxResult<TodoId>;
    /// Removes the record with `id`, if any.
    fn delete_todo(&mut self, id: TodoId) -> TxResult<()>;
    /// Opens a fresh read-only cursor over every record in id order.
    fn scan_all(&self) -> ReadResult<Self::Cursor<'_>>;
}

/// SQLite-backed to-do repository borrowing an open store connection.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
    scan_batch_size: u32,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Constructs a repository from an opened store connection.
    ///
    /// Fails when the record table is missing, i.e. the connection did not
    /// come through store open/upgrade.
    pub fn try_new(conn: &'conn Connection) -> OpenResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [TODO_TABLE],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(OpenError::MissingRequiredTable(TODO_TABLE));
        }

        Ok(Self {
            conn,
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        })
    }

    /// Constructs a repository using the handle's configured scan batch size.
    pub fn from_handle(handle: &'conn StoreHandle) -> OpenResult<Self> {
        Ok(Self::try_new(handle.connection())?.with_scan_batch_size(handle.scan_batch_size()))
    }

    /// Overrides how many rows each cursor step pulls. Zero is treated as one.
    pub fn with_scan_batch_size(mut self, scan_batch_size: u32) -> Self {
        self.scan_batch_size = scan_batch_size.max(1);
        self
    }

    fn begin_write(
        &self,
        lifecycle: &mut TxLifecycle,
    ) -> Result<Transaction<'conn>, rusqlite::Error> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        lifecycle.opened();
        Ok(tx)
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    type Cursor<'a>
        = TodoCursor<'a>
    where
        Self: 'a;

    fn insert_todo(&mut self, todo: &NewTodo) -> TxResult<TodoId> {
        let mut lifecycle = TxLifecycle::begin(MutationKind::Insert);
        let tx = match self.begin_write(&mut lifecycle) {
            Ok(tx) => tx,
            Err(err) => return Err(lifecycle.fail(err)),
        };

        let inserted = tx.execute(
            "INSERT INTO todolist_os (title, description) VALUES (?1, ?2);",
            params![todo.title.as_str(), todo.description.as_str()],
        );
        if let Err(err) = inserted {
            return Err(lifecycle.fail(err));
        }
        let raw_id = tx.last_insert_rowid();
        let Some(id) = TodoId::new(raw_id) else {
            return Err(lifecycle.fail(rusqlite::Error::IntegralValueOutOfRange(0, raw_id)));
        };
        lifecycle.request_succeeded();

        if let Err(err) = tx.commit() {
            return Err(lifecycle.fail(err));
        }
        lifecycle.complete(format_args!("id={id}"));
        Ok(id)
    }

    fn delete_todo(&mut self, id: TodoId) -> TxResult<()> {
        let mut lifecycle = TxLifecycle::begin(MutationKind::Delete);
        let tx = match self.begin_write(&mut lifecycle) {
            Ok(tx) => tx,
            Err(err) => return Err(lifecycle.fail(err)),
        };

        let removed = match tx.execute("DELETE FROM todolist_os WHERE id = ?1;", [id.get()]) {
            Ok(changed) => changed > 0,
            Err(err) => return Err(lifecycle.fail(err)),
        };
        lifecycle.request_succeeded();

        if let Err(err) = tx.commit() {
            return Err(lifecycle.fail(err));
        }
        lifecycle.complete(format_args!("id={id} removed={removed}"));
        Ok(())
    }

    fn scan_all(&self) -> ReadResult<TodoCursor<'_>> {
        TodoCursor::open(self.conn, self.scan_batch_size)
    }
}
