//! Add-form input buffer.
//!
//! # Invariants
//! - Fields are cleared only after the insert committed.
//! - A failed insert leaves both fields exactly as typed.

use crate::model::todo::{NewTodo, TodoId};
use crate::repo::todo_repo::TodoRepository;
use crate::repo::tx::TransactionError;
use crate::service::todo_list::TodoList;
use crate::view::render::ItemRenderer;

/// Title/description input as captured by the host form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
}

impl TodoForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }

    /// Inserts the current input and clears it on commit.
    pub fn submit<R, V>(&mut self, list: &mut TodoList<R, V>) -> Result<TodoId, TransactionError>
    where
        R: TodoRepository,
        V: ItemRenderer,
    {
        let id = list.insert(&NewTodo::new(self.title.as_str(), self.description.as_str()))?;
        self.title.clear();
        self.description.clear();
        Ok(id)
    }
}
