//! Render-layer contract.
//!
//! The host owns the actual widgets; core only asks for an opaque handle per
//! entry and hands back a `DeleteAction` the host fires on click.

use crate::model::todo::{TodoId, TodoRecord};

/// Text shown when the table holds no records.
pub const EMPTY_PLACEHOLDER_TEXT: &str = "Create a new To Do note";

/// Delete affordance bound to one record.
///
/// The host routes a fired action back into `TodoList::delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeleteAction {
    id: TodoId,
}

impl DeleteAction {
    pub(crate) fn new(id: TodoId) -> Self {
        Self { id }
    }

    pub fn id(self) -> TodoId {
        self.id
    }

    /// Key as the host stores it on the rendered entry, e.g. in a data
    /// attribute. `coerce_todo_id` turns it back into an id.
    pub fn entry_key(self) -> String {
        self.id.to_string()
    }
}

/// Builds displayable handles for list entries.
pub trait ItemRenderer {
    type Handle;

    /// Renders one record together with its delete affordance.
    fn render_item(&mut self, record: &TodoRecord, on_delete: DeleteAction) -> Self::Handle;

    /// Renders the single empty-state entry.
    fn render_placeholder(&mut self, message: &str) -> Self::Handle;
}

/// Renders entries as single text lines, for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl ItemRenderer for PlainTextRenderer {
    type Handle = String;

    fn render_item(&mut self, record: &TodoRecord, on_delete: DeleteAction) -> String {
        if record.description.is_empty() {
            format!("[{}] {}", on_delete.entry_key(), record.title)
        } else {
            format!(
                "[{}] {}: {}",
                on_delete.entry_key(),
                record.title,
                record.description
            )
        }
    }

    fn render_placeholder(&mut self, message: &str) -> String {
        message.to_string()
    }
}
