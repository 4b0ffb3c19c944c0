//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of items plus the session-only view
//! state the presentation layer renders: the active filter, the new-item
//! input box and the (single) edit session.

use crate::collection::Collection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a todo item
///
/// Opaque to everything but equality; serialized as a bare string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Creates a `TodoId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single todo item
///
/// This is also the persisted record shape: `{ "id", "text", "completed" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier, fixed at creation
    pub id: TodoId,
    /// Trimmed, non-empty text
    pub text: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new, not yet completed, todo item
    #[must_use]
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// Which slice of the collection is shown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every item
    #[default]
    All,
    /// Items not yet completed
    Active,
    /// Completed items
    Completed,
}

impl Filter {
    /// Returns `true` if `item` is part of this view
    #[must_use]
    pub const fn matches(self, item: &TodoItem) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.completed,
            Self::Completed => item.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        })
    }
}

/// Error returned when a filter name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}' (expected all, active or completed)")]
pub struct ParseFilterError(String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

/// The edit session sub-machine
///
/// At most one item is edited at a time. The scratch buffer is kept apart
/// from the item's committed text until the edit is committed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditSession {
    /// No item is being edited
    #[default]
    Idle,
    /// The item `id` is being edited
    Editing {
        /// Item under edit
        id: TodoId,
        /// Uncommitted text
        scratch: String,
    },
}

impl EditSession {
    /// Returns the id of the item being edited, if any
    #[must_use]
    pub const fn editing_id(&self) -> Option<&TodoId> {
        match self {
            Self::Idle => None,
            Self::Editing { id, .. } => Some(id),
        }
    }

    /// Returns `true` if `id` is the item being edited
    #[must_use]
    pub fn is_editing(&self, id: &TodoId) -> bool {
        self.editing_id() == Some(id)
    }
}

/// Progress of the one-time startup load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// `Load` has not been sent yet
    #[default]
    NotStarted,
    /// The load effect is in flight
    Loading,
    /// The persisted collection has been applied; saving is allowed
    Loaded,
}

/// Coordinator-owned state
///
/// Mutated only through [`TodoAction`]s by the reducer.
#[derive(Clone, Debug, Default)]
pub struct TodoState {
    /// The item collection
    pub todos: Collection,
    /// Active view filter
    pub filter: Filter,
    /// Contents of the new-item input box
    pub input: String,
    /// Current edit session
    pub edit: EditSession,
    /// Startup load progress
    pub load_status: LoadStatus,
    /// Collection mutations received before the load completed
    pub deferred: Vec<TodoAction>,
}

impl TodoState {
    /// Creates an empty state that still has to be loaded
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state whose load already completed with `todos`
    #[must_use]
    pub fn loaded(todos: Collection) -> Self {
        Self {
            todos,
            load_status: LoadStatus::Loaded,
            ..Self::default()
        }
    }

    /// Returns `true` once the startup load has completed
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.load_status == LoadStatus::Loaded
    }

    /// Items visible under the active filter, in collection order
    #[must_use]
    pub fn visible_todos(&self) -> Vec<&TodoItem> {
        self.todos.filter_view(self.filter)
    }

    /// Number of items not yet completed
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.todos.active_count()
    }

    /// Snapshot of everything the presentation surface renders
    #[must_use]
    pub fn view(&self) -> TodoView<'_> {
        TodoView {
            items: self.visible_todos(),
            active_count: self.active_count(),
            completed_count: self.todos.completed_count(),
            filter: self.filter,
            input: &self.input,
            edit: &self.edit,
        }
    }
}

/// Read-only projection handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoView<'a> {
    /// Items under the active filter
    pub items: Vec<&'a TodoItem>,
    /// Items not yet completed (across the whole collection)
    pub active_count: usize,
    /// Completed items (across the whole collection)
    pub completed_count: usize,
    /// Active filter
    pub filter: Filter,
    /// New-item input text
    pub input: &'a str,
    /// Edit session
    pub edit: &'a EditSession,
}

/// Actions: user intents plus results fed back by effects
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Lifecycle ==========
    /// Start the one-time load from storage
    Load,
    /// Result of the load effect
    Loaded {
        /// Collection read from storage (empty on any failure)
        todos: Collection,
    },

    // ========== Collection intents ==========
    /// Add an item with the given text
    AddTodo {
        /// Raw text, trimmed before use
        text: String,
    },
    /// Flip the completion flag of an item
    Toggle {
        /// Item to toggle
        id: TodoId,
    },
    /// Delete an item
    Delete {
        /// Item to delete
        id: TodoId,
    },

    // ========== Input box ==========
    /// The new-item input text changed
    ChangeInput {
        /// Current input text
        text: String,
    },
    /// Add the input text as a new item and clear the input box
    SubmitInput,

    // ========== Edit session ==========
    /// Begin editing an item
    StartEdit {
        /// Item to edit
        id: TodoId,
    },
    /// The edit scratch text changed
    ChangeEditText {
        /// Current scratch text
        text: String,
    },
    /// Commit the scratch text
    CommitEdit,
    /// Abandon the edit (explicitly or on loss of focus)
    CancelEdit,

    // ========== View ==========
    /// Switch the active filter
    ChangeFilter {
        /// New filter
        filter: Filter,
    },
}
