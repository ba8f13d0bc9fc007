//! View synchronizer and use-case facade.
//!
//! # Responsibility
//! - Run the initial population after the store opened.
//! - Route inserts/deletes through the repository and refresh the view after
//!   every committed transaction.
//! - Rebuild the displayed list from one full scan per refresh.
//!
//! # Invariants
//! - The view only ever shows committed store contents.
//! - A refresh swaps in a new list only after the whole scan succeeded; a
//!   failed scan keeps the previous list and marks it stale.
//! - A failed mutation never triggers a refresh.

use crate::db::OpenError;
use crate::logging::LoggingError;
use crate::model::todo::{coerce_todo_id, InvalidTodoId, NewTodo, TodoId, TodoRecord};
use crate::repo::cursor::{ReadError, ReadResult};
use crate::repo::todo_repo::TodoRepository;
use crate::repo::tx::TransactionError;
use crate::view::list_view::ListView;
use crate::view::render::ItemRenderer;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Any failure the to-do facade can report.
#[derive(Debug)]
pub enum TodoError {
    /// Store could not be opened; nothing downstream is usable.
    Open(OpenError),
    /// An insert/delete did not commit.
    Transaction(TransactionError),
    /// A full scan did not complete.
    Read(ReadError),
    /// Caller supplied a key that is not a record id.
    InvalidId(InvalidTodoId),
    /// Logger could not be started during bootstrap.
    Logging(LoggingError),
}

impl Display for TodoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "{err}"),
            Self::Transaction(err) => write!(f, "{err}"),
            Self::Read(err) => write!(f, "{err}"),
            Self::InvalidId(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) => Some(err),
            Self::Transaction(err) => Some(err),
            Self::Read(err) => Some(err),
            Self::InvalidId(err) => Some(err),
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<OpenError> for TodoError {
    fn from(value: OpenError) -> Self {
        Self::Open(value)
    }
}

impl From<TransactionError> for TodoError {
    fn from(value: TransactionError) -> Self {
        Self::Transaction(value)
    }
}

impl From<ReadError> for TodoError {
    fn from(value: ReadError) -> Self {
        Self::Read(value)
    }
}

impl From<LoggingError> for TodoError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<InvalidTodoId> for TodoError {
    fn from(value: InvalidTodoId) -> Self {
        Self::InvalidId(value)
    }
}

/// To-do list bound to one store and one render layer.
pub struct TodoList<R, V: ItemRenderer> {
    repo: R,
    renderer: V,
    view: ListView<V::Handle>,
    refresh_error: Option<ReadError>,
}

impl<R: TodoRepository, V: ItemRenderer> TodoList<R, V> {
    /// Creates a list with an empty, never-refreshed view.
    pub fn new(repo: R, renderer: V) -> Self {
        Self {
            repo,
            renderer,
            view: ListView::default(),
            refresh_error: None,
        }
    }

    /// Creates a list and runs the initial population.
    pub fn load(repo: R, renderer: V) -> ReadResult<Self> {
        let mut list = Self::new(repo, renderer);
        list.refresh()?;
        Ok(list)
    }

    pub fn view(&self) -> &ListView<V::Handle> {
        &self.view
    }

    pub fn renderer(&self) -> &V {
        &self.renderer
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Collects one full scan without touching the view.
    pub fn scan_all(&self) -> ReadResult<Vec<TodoRecord>> {
        self.repo.scan_all()?.collect()
    }

    /// Rebuilds the displayed list from a fresh full scan.
    ///
    /// # Errors
    /// Returns the scan failure; the previous list stays on screen and
    /// `ListView::is_stale` reports `true` until the next successful refresh.
    pub fn refresh(&mut self) -> ReadResult<()> {
        let started_at = Instant::now();
        let records = match self.scan_all() {
            Ok(records) => records,
            Err(err) => {
                self.view.mark_stale();
                warn!(
                    "event=view_refresh module=service status=error duration_ms={} kept_items={} error={}",
                    started_at.elapsed().as_millis(),
                    self.view.item_count(),
                    err
                );
                return Err(err);
            }
        };

        let count = records.len();
        self.view.rebuild(records, &mut self.renderer);
        info!(
            "event=view_refresh module=service status=ok duration_ms={} items={} placeholder={}",
            started_at.elapsed().as_millis(),
            count,
            count == 0
        );
        Ok(())
    }

    /// Inserts one record and refreshes the view once it committed.
    ///
    /// A refresh failure after the commit does not undo the insert: the id
    /// is still returned, the view is left stale and the scan error is kept
    /// for `take_refresh_error`.
    pub fn insert(&mut self, todo: &NewTodo) -> Result<TodoId, TransactionError> {
        let id = self.repo.insert_todo(todo)?;
        self.refresh_after_commit();
        Ok(id)
    }

    /// Deletes record `id` (absent ids are a no-op) and refreshes the view.
    ///
    /// Post-commit refresh failures are reported like for `insert`.
    pub fn delete(&mut self, id: TodoId) -> Result<(), TransactionError> {
        self.repo.delete_todo(id)?;
        self.refresh_after_commit();
        Ok(())
    }

    /// Deletes the record named by a rendered entry key.
    ///
    /// The key is coerced to a number first; keys that do not denote a
    /// positive integer are rejected before any transaction opens.
    pub fn delete_by_key(&mut self, key: &str) -> Result<TodoId, TodoError> {
        let id = coerce_todo_id(key)?;
        self.delete(id)?;
        Ok(id)
    }

    /// Opens or closes the description panel of a displayed record.
    pub fn toggle_description(&mut self, id: TodoId) -> Option<bool> {
        let expanded = self.view.toggle_expanded(id);
        debug!(
            "event=description_toggle module=service id={} expanded={:?}",
            id, expanded
        );
        expanded
    }

    /// Scan error from the refresh that followed the last committed mutation.
    ///
    /// Cleared by this call; replaced after every committed mutation.
    pub fn take_refresh_error(&mut self) -> Option<ReadError> {
        self.refresh_error.take()
    }

    /// Gives back the repository and renderer.
    pub fn into_parts(self) -> (R, V) {
        (self.repo, self.renderer)
    }

    fn refresh_after_commit(&mut self) {
        self.refresh_error = self.refresh().err();
    }
}
