//! Reducer logic for the todo list.
//!
//! The reducer is the view-state coordinator: it applies user intents to the
//! collection and the session-only view state, and describes persistence as
//! effects. Persistence follows two rules:
//!
//! 1. Nothing is saved before the one startup load has completed. Collection
//!    mutations that arrive earlier are deferred and replayed, in order, on
//!    top of the loaded collection.
//! 2. After that, every mutation that actually changed the collection is
//!    followed by a save of the whole collection.

use crate::collection::Collection;
use crate::storage::TodoStorage;
use crate::types::{EditSession, LoadStatus, TodoAction, TodoId, TodoState};
use checklist_core::{
    SmallVec, effect::Effect, environment::IdGenerator, reducer::Reducer, smallvec,
};
use std::sync::Arc;

/// Random id generator backed by UUID v4
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Store adapter the collection is loaded from and saved to
    pub storage: Arc<dyn TodoStorage>,
    /// Source of fresh item ids
    pub ids: Arc<dyn IdGenerator>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(storage: Arc<dyn TodoStorage>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { storage, ids }
    }

    /// Environment with random UUID ids
    #[must_use]
    pub fn with_storage(storage: Arc<dyn TodoStorage>) -> Self {
        Self::new(storage, Arc::new(UuidGenerator))
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load_effect(env: &TodoEnvironment) -> Effect<TodoAction> {
        let storage = Arc::clone(&env.storage);
        Effect::future(async move {
            Some(TodoAction::Loaded {
                todos: storage.load(),
            })
        })
    }

    fn save_effect(todos: &Collection, env: &TodoEnvironment) -> Effect<TodoAction> {
        let storage = Arc::clone(&env.storage);
        let snapshot = todos.clone();
        Effect::future(async move {
            storage.save(&snapshot);
            None
        })
    }

    /// Applies a collection mutation; returns `true` if the collection changed
    ///
    /// Only called once the state is loaded.
    fn apply_mutation(state: &mut TodoState, action: &TodoAction, env: &TodoEnvironment) -> bool {
        match action {
            TodoAction::AddTodo { text } => match state.todos.add(text, env.ids.as_ref()) {
                Some(id) => {
                    tracing::debug!(%id, "Added todo");
                    true
                },
                None => {
                    tracing::debug!("Ignored blank todo");
                    false
                },
            },
            TodoAction::Toggle { id } => {
                let changed = state.todos.toggle(id);
                if changed && Self::is_completed(state, id) && state.edit.is_editing(id) {
                    // Completed items cannot be edited.
                    state.edit = EditSession::Idle;
                }
                changed
            },
            TodoAction::Delete { id } => {
                if state.edit.is_editing(id) {
                    state.edit = EditSession::Idle;
                }
                state.todos.remove(id)
            },
            _ => false,
        }
    }

    fn is_completed(state: &TodoState, id: &TodoId) -> bool {
        state.todos.get(id).is_some_and(|item| item.completed)
    }

    /// Runs a mutation now, or defers it until the load completes
    fn mutate(
        state: &mut TodoState,
        action: TodoAction,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        if !state.is_loaded() {
            tracing::debug!(?action, "Deferring mutation until todos are loaded");
            state.deferred.push(action);
            return SmallVec::new();
        }

        if Self::apply_mutation(state, &action, env) {
            smallvec![Self::save_effect(&state.todos, env)]
        } else {
            SmallVec::new()
        }
    }

    fn loaded(
        state: &mut TodoState,
        todos: Collection,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        if state.is_loaded() {
            tracing::warn!("Ignoring repeated load result");
            return SmallVec::new();
        }

        tracing::info!(count = todos.len(), "Todos loaded");
        state.todos = todos;
        state.load_status = LoadStatus::Loaded;

        let deferred = std::mem::take(&mut state.deferred);
        let mut changed = false;
        for action in &deferred {
            changed |= Self::apply_mutation(state, action, env);
        }

        if changed {
            smallvec![Self::save_effect(&state.todos, env)]
        } else {
            SmallVec::new()
        }
    }

    fn start_edit(state: &mut TodoState, id: TodoId) {
        match state.todos.get(&id) {
            Some(item) if item.completed => {
                tracing::debug!(%id, "Rejected edit of completed todo");
            },
            Some(item) => {
                if let Some(previous) = state.edit.editing_id() {
                    tracing::debug!(%previous, "Cancelling previous edit");
                }
                state.edit = EditSession::Editing {
                    scratch: item.text.clone(),
                    id,
                };
            },
            None => {
                tracing::debug!(%id, "Rejected edit of unknown todo");
            },
        }
    }

    fn commit_edit(
        state: &mut TodoState,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        let EditSession::Editing { id, scratch } = std::mem::take(&mut state.edit) else {
            return SmallVec::new();
        };

        if state.todos.edit_text(&id, &scratch) {
            tracing::debug!(%id, "Edited todo");
            smallvec![Self::save_effect(&state.todos, env)]
        } else {
            SmallVec::new()
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Lifecycle ==========
            TodoAction::Load => {
                if state.load_status != LoadStatus::NotStarted {
                    tracing::debug!("Load already requested");
                    return SmallVec::new();
                }
                state.load_status = LoadStatus::Loading;
                smallvec![Self::load_effect(env)]
            },
            TodoAction::Loaded { todos } => Self::loaded(state, todos, env),

            // ========== Collection ==========
            TodoAction::AddTodo { .. } | TodoAction::Toggle { .. } | TodoAction::Delete { .. } => {
                Self::mutate(state, action, env)
            },

            // ========== Input box ==========
            TodoAction::ChangeInput { text } => {
                state.input = text;
                SmallVec::new()
            },
            TodoAction::SubmitInput => {
                if state.input.trim().is_empty() {
                    return SmallVec::new();
                }
                let text = std::mem::take(&mut state.input);
                Self::mutate(state, TodoAction::AddTodo { text }, env)
            },

            // ========== Edit session ==========
            TodoAction::StartEdit { id } => {
                Self::start_edit(state, id);
                SmallVec::new()
            },
            TodoAction::ChangeEditText { text } => {
                if let EditSession::Editing { scratch, .. } = &mut state.edit {
                    *scratch = text;
                }
                SmallVec::new()
            },
            TodoAction::CommitEdit => Self::commit_edit(state, env),
            TodoAction::CancelEdit => {
                state.edit = EditSession::Idle;
                SmallVec::new()
            },

            // ========== View ==========
            TodoAction::ChangeFilter { filter } => {
                state.filter = filter;
                SmallVec::new()
            },
        }
    }
}
