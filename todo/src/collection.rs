//! The collection engine.
//!
//! An ordered sequence of todo items. Insertion order is display order: new
//! items are appended, deletes remove in place, nothing reorders.
//!
//! Every operation is deterministic given its inputs (id generation is an
//! injected capability) and reports whether it changed anything, so callers
//! only persist real mutations. Operations that would violate an invariant
//! (blank text, unknown id) leave the collection untouched.

use crate::types::{Filter, TodoId, TodoItem};
use checklist_core::environment::IdGenerator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How many fresh ids `add` tries before giving up on a colliding generator
const MAX_ID_ATTEMPTS: usize = 8;

/// Reasons a collection read from storage is unusable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// Two items share an id
    #[error("duplicate todo id {0}")]
    DuplicateId(TodoId),

    /// An item's text is empty after trimming
    #[error("todo {0} has blank text")]
    BlankText(TodoId),
}

/// Ordered sequence of todo items
///
/// Serialized as a bare JSON array of items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    items: Vec<TodoItem>,
}

impl Collection {
    /// Creates an empty collection
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Wraps existing items, keeping their order
    #[must_use]
    pub const fn from_items(items: Vec<TodoItem>) -> Self {
        Self { items }
    }

    /// All items in display order
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up an item by id
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Returns `true` if an item with `id` exists
    #[must_use]
    pub fn contains(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    fn get_mut(&mut self, id: &TodoId) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Appends a new item with the trimmed `raw_text`
    ///
    /// Returns the new item's id, or `None` if the text was blank.
    pub fn add(&mut self, raw_text: &str, ids: &dyn IdGenerator) -> Option<TodoId> {
        let text = raw_text.trim();
        if text.is_empty() {
            return None;
        }

        let Some(id) = (0..MAX_ID_ATTEMPTS)
            .map(|_| TodoId::new(ids.next_id()))
            .find(|candidate| !self.contains(candidate))
        else {
            tracing::warn!("Id generator kept returning ids already in use; item not added");
            return None;
        };

        self.items.push(TodoItem::new(id.clone(), text));
        Some(id)
    }

    /// Flips `completed` on the item `id`
    ///
    /// Returns `false` if no item matches.
    pub fn toggle(&mut self, id: &TodoId) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.completed = !item.completed;
                true
            },
            None => false,
        }
    }

    /// Replaces the text of item `id` with the trimmed `raw_text`
    ///
    /// Blank text discards the edit. Returns `true` only if the stored text
    /// actually changed.
    pub fn edit_text(&mut self, id: &TodoId, raw_text: &str) -> bool {
        let text = raw_text.trim();
        if text.is_empty() {
            return false;
        }

        match self.get_mut(id) {
            Some(item) if item.text != text => {
                item.text = text.to_string();
                true
            },
            _ => false,
        }
    }

    /// Removes item `id`, keeping the order of the rest
    ///
    /// Returns `false` if no item matches.
    pub fn remove(&mut self, id: &TodoId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Items matching `filter`, in collection order
    #[must_use]
    pub fn filter_view(&self, filter: Filter) -> Vec<&TodoItem> {
        self.items.iter().filter(|item| filter.matches(item)).collect()
    }

    /// Number of items not yet completed
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|item| !item.completed).count()
    }

    /// Number of completed items
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.len() - self.active_count()
    }

    /// Brings a freshly deserialized collection back to the item invariants
    ///
    /// Surrounding whitespace is trimmed from every text in place; what
    /// cannot be repaired is reported.
    ///
    /// # Errors
    ///
    /// Returns the first duplicate id or blank text found.
    pub fn normalize(&mut self) -> Result<(), CollectionError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &mut self.items {
            if !seen.insert(item.id.clone()) {
                return Err(CollectionError::DuplicateId(item.id.clone()));
            }
            let trimmed = item.text.trim();
            if trimmed.is_empty() {
                return Err(CollectionError::BlankText(item.id.clone()));
            }
            if trimmed.len() != item.text.len() {
                item.text = trimmed.to_string();
            }
        }
        Ok(())
    }
}

impl FromIterator<TodoItem> for Collection {
    fn from_iter<I: IntoIterator<Item = TodoItem>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().collect())
    }
}
