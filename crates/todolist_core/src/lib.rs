//! Storage and view synchronization core for a client-local to-do list.
//! The displayed list is always rebuilt from committed store state.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use config::{LogConfig, StoreConfig, StoreLocation, TodoConfig};
pub use db::migrations::UpgradeOutcome;
pub use db::{open_store, open_store_in_memory, open_with_config, OpenError, StoreHandle};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::todo::{coerce_todo_id, InvalidTodoId, NewTodo, TodoId, TodoRecord};
pub use repo::cursor::{ReadError, TodoCursor};
pub use repo::todo_repo::{SqliteTodoRepository, TodoRepository};
pub use repo::tx::{MutationKind, TransactionError, TxPhase};
pub use service::form::TodoForm;
pub use service::startup::start;
pub use service::todo_list::{TodoError, TodoList};
pub use view::list_view::{ItemEntry, ListView, ViewEntry};
pub use view::render::{DeleteAction, ItemRenderer, PlainTextRenderer, EMPTY_PLACEHOLDER_TEXT};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
