//! One-call host bootstrap from a parsed `TodoConfig`.
//!
//! # Invariants
//! - Logging (when configured) is initialized before the store opens, so the
//!   `store_open` events reach the log file.

use crate::config::TodoConfig;
use crate::db::{open_with_config, StoreHandle};
use crate::logging::init_logging;
use crate::service::todo_list::TodoError;

/// Initializes logging from `config.log` and opens `config.store`.
///
/// # Errors
/// - `TodoError::Logging` when the logger cannot start or is already running
///   with a different level/directory.
/// - `TodoError::Open` when the store cannot be opened.
pub fn start(config: &TodoConfig) -> Result<StoreHandle, TodoError> {
    if let Some(log) = &config.log {
        init_logging(log)?;
    }
    Ok(open_with_config(&config.store)?)
}
