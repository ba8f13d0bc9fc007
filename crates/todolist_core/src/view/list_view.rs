//! Displayed list state.
//!
//! # Responsibility
//! - Hold the rendered entries together with the record each one shows.
//! - Answer id lookups for delete-by-click and description toggles.
//!
//! # Invariants
//! - Entries are replaced as a whole; a rebuild never leaves a partially
//!   rendered list behind.
//! - A rebuilt list holds either one entry per record or exactly one
//!   placeholder, never both.

use crate::model::todo::{TodoId, TodoRecord};
use crate::view::render::{DeleteAction, ItemRenderer, EMPTY_PLACEHOLDER_TEXT};
use std::collections::HashSet;

/// Rendered entry for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEntry<H> {
    pub record: TodoRecord,
    pub on_delete: DeleteAction,
    /// Whether the description panel is open.
    pub expanded: bool,
    pub handle: H,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEntry<H> {
    Item(ItemEntry<H>),
    Placeholder(H),
}

/// The list currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<H> {
    entries: Vec<ViewEntry<H>>,
    stale: bool,
    generation: u64,
}

impl<H> Default for ListView<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            stale: false,
            generation: 0,
        }
    }
}

impl<H> ListView<H> {
    pub fn entries(&self) -> &[ViewEntry<H>] {
        &self.entries
    }

    /// Record entries in display order.
    pub fn items(&self) -> impl Iterator<Item = &ItemEntry<H>> {
        self.entries.iter().filter_map(|entry| match entry {
            ViewEntry::Item(item) => Some(item),
            ViewEntry::Placeholder(_) => None,
        })
    }

    /// Records shown, in display order.
    pub fn records(&self) -> Vec<TodoRecord> {
        self.items().map(|item| item.record.clone()).collect()
    }

    pub fn ids(&self) -> Vec<TodoId> {
        self.items().map(|item| item.record.id).collect()
    }

    /// Entry showing record `id`.
    pub fn entry(&self, id: TodoId) -> Option<&ItemEntry<H>> {
        self.items().find(|item| item.record.id == id)
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    /// Whether the empty-state placeholder is shown.
    pub fn shows_placeholder(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, ViewEntry::Placeholder(_)))
    }

    /// Set when the last refresh failed; the entries are from an earlier one.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of successful rebuilds so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Flips the description panel of `id`. Returns the new state.
    pub fn toggle_expanded(&mut self, id: TodoId) -> Option<bool> {
        self.entries.iter_mut().find_map(|entry| match entry {
            ViewEntry::Item(item) if item.record.id == id => {
                item.expanded = !item.expanded;
                Some(item.expanded)
            }
            _ => None,
        })
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Renders `records` into a new entry list and swaps it in.
    ///
    /// Open description panels stay open for ids that are still present.
    pub(crate) fn rebuild<V>(&mut self, records: Vec<TodoRecord>, renderer: &mut V)
    where
        V: ItemRenderer<Handle = H>,
    {
        let expanded: HashSet<TodoId> = self
            .items()
            .filter(|item| item.expanded)
            .map(|item| item.record.id)
            .collect();

        let entries = if records.is_empty() {
            vec![ViewEntry::Placeholder(
                renderer.render_placeholder(EMPTY_PLACEHOLDER_TEXT),
            )]
        } else {
            records
                .into_iter()
                .map(|record| {
                    let on_delete = DeleteAction::new(record.id);
                    let handle = renderer.render_item(&record, on_delete);
                    ViewEntry::Item(ItemEntry {
                        expanded: expanded.contains(&record.id),
                        record,
                        on_delete,
                        handle,
                    })
                })
                .collect()
        };

        self.entries = entries;
        self.stale = false;
        self.generation += 1;
    }
}
