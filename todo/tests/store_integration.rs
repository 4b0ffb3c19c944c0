//! Integration tests for the todo reducer running inside a Store.
//!
//! These drive the full action → reducer → effect → storage loop against
//! in-memory storage.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use checklist_runtime::Store;
use checklist_testing::{SequentialIdGenerator, init_tracing};
use std::sync::{Arc, Mutex};
use todo::storage::{BlobStorage, KeyValueStore, MemoryStore, TodoStorage, UnavailableStore};
use todo::{Collection, Filter, TodoAction, TodoEnvironment, TodoId, TodoReducer, TodoState};

type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Storage fake that records every save on top of a memory store
struct RecordingStorage {
    inner: BlobStorage<MemoryStore>,
    saves: Mutex<Vec<Collection>>,
}

impl RecordingStorage {
    fn new(store: MemoryStore) -> Self {
        Self {
            inner: BlobStorage::with_default_key(store),
            saves: Mutex::new(Vec::new()),
        }
    }

    fn saves(&self) -> Vec<Collection> {
        self.saves.lock().unwrap().clone()
    }
}

impl TodoStorage for RecordingStorage {
    fn load(&self) -> Collection {
        self.inner.load()
    }

    fn save(&self, todos: &Collection) {
        self.saves.lock().unwrap().push(todos.clone());
        self.inner.save(todos);
    }
}

fn store_over(storage: Arc<dyn TodoStorage>) -> TodoStore {
    let env = TodoEnvironment::new(storage, Arc::new(SequentialIdGenerator::new("todo")));
    Store::new(TodoState::new(), TodoReducer::new(), env)
}

async fn texts(store: &TodoStore, filter: Filter) -> Vec<String> {
    store
        .state(|s| {
            s.todos
                .filter_view(filter)
                .iter()
                .map(|t| t.text.clone())
                .collect()
        })
        .await
}

async fn add(store: &TodoStore, text: &str) {
    store
        .send(TodoAction::AddTodo {
            text: text.to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_todos_survive_reload() {
    init_tracing();
    let memory = MemoryStore::new();

    let first = store_over(Arc::new(BlobStorage::with_default_key(memory.clone())));
    first.send(TodoAction::Load).await.unwrap();
    add(&first, "Buy milk").await;
    add(&first, "Walk dog").await;
    add(&first, "Call mom").await;
    first
        .send(TodoAction::Toggle {
            id: TodoId::new("todo-1"),
        })
        .await
        .unwrap();
    first
        .send(TodoAction::Delete {
            id: TodoId::new("todo-2"),
        })
        .await
        .unwrap();
    let before = first.state(|s| s.todos.clone()).await;

    let second = store_over(Arc::new(BlobStorage::with_default_key(memory)));
    second.send(TodoAction::Load).await.unwrap();

    let after = second.state(|s| s.todos.clone()).await;
    assert_eq!(after, before);
    assert_eq!(texts(&second, Filter::All).await, ["Buy milk", "Call mom"]);
    assert_eq!(texts(&second, Filter::Completed).await, ["Buy milk"]);
}

#[tokio::test]
async fn test_scenario_buy_milk_walk_dog() {
    init_tracing();
    let store = store_over(Arc::new(BlobStorage::with_default_key(MemoryStore::new())));
    store.send(TodoAction::Load).await.unwrap();

    add(&store, "Buy milk").await;
    add(&store, "Walk dog").await;
    store
        .send(TodoAction::Toggle {
            id: TodoId::new("todo-1"),
        })
        .await
        .unwrap();

    assert_eq!(texts(&store, Filter::Active).await, ["Walk dog"]);
    assert_eq!(texts(&store, Filter::Completed).await, ["Buy milk"]);
    assert_eq!(store.state(TodoState::active_count).await, 1);
}

#[tokio::test]
async fn test_no_save_before_load_completes() {
    init_tracing();
    let memory = MemoryStore::new();
    BlobStorage::with_default_key(memory.clone()).save(
        &[todo::TodoItem::new(TodoId::new("old"), "Persisted")]
            .into_iter()
            .collect(),
    );
    let storage = Arc::new(RecordingStorage::new(memory));
    let store = store_over(storage.clone());

    add(&store, "Early bird").await;
    assert!(storage.saves().is_empty(), "nothing may be saved before load");
    assert!(store.state(|s| s.todos.is_empty()).await);

    store.send(TodoAction::Load).await.unwrap();

    let saves = storage.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(
        saves[0].items().iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
        ["Persisted", "Early bird"]
    );
    assert_eq!(texts(&store, Filter::All).await, ["Persisted", "Early bird"]);
}

#[tokio::test]
async fn test_every_change_is_saved_and_noops_are_not() {
    init_tracing();
    let storage = Arc::new(RecordingStorage::new(MemoryStore::new()));
    let store = store_over(storage.clone());
    store.send(TodoAction::Load).await.unwrap();

    add(&store, "One").await;
    add(&store, "   ").await;
    store
        .send(TodoAction::Toggle {
            id: TodoId::new("missing"),
        })
        .await
        .unwrap();
    store
        .send(TodoAction::ChangeFilter {
            filter: Filter::Completed,
        })
        .await
        .unwrap();
    store
        .send(TodoAction::Toggle {
            id: TodoId::new("todo-1"),
        })
        .await
        .unwrap();

    let saves = storage.saves();
    assert_eq!(saves.len(), 2);
    assert_eq!(saves.last(), Some(&store.state(|s| s.todos.clone()).await));
}

#[tokio::test]
async fn test_corrupt_blob_starts_empty_and_is_overwritten() {
    init_tracing();
    let memory = MemoryStore::with_entry("todos", "{{{ not json");
    let store = store_over(Arc::new(BlobStorage::with_default_key(memory.clone())));

    store.send(TodoAction::Load).await.unwrap();
    assert!(store.state(|s| s.is_loaded() && s.todos.is_empty()).await);

    add(&store, "Fresh start").await;

    let blob = memory.get("todos").unwrap().unwrap();
    let stored: Collection = serde_json::from_str(&blob).unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_unavailable_storage_keeps_session_working() {
    init_tracing();
    let store = store_over(Arc::new(BlobStorage::with_default_key(UnavailableStore)));

    store.send(TodoAction::Load).await.unwrap();
    add(&store, "Still works").await;
    store
        .send(TodoAction::StartEdit {
            id: TodoId::new("todo-1"),
        })
        .await
        .unwrap();
    store
        .send(TodoAction::ChangeEditText {
            text: "Still works offline".to_string(),
        })
        .await
        .unwrap();
    store.send(TodoAction::CommitEdit).await.unwrap();

    assert_eq!(texts(&store, Filter::All).await, ["Still works offline"]);
}

#[tokio::test]
async fn test_load_result_is_broadcast() {
    init_tracing();
    let memory = MemoryStore::new();
    BlobStorage::with_default_key(memory.clone()).save(
        &[todo::TodoItem::new(TodoId::new("a"), "Seen")]
            .into_iter()
            .collect(),
    );
    let store = store_over(Arc::new(BlobStorage::with_default_key(memory)));
    let mut actions = store.subscribe_actions();

    store.send(TodoAction::Load).await.unwrap();

    match actions.recv().await.unwrap() {
        TodoAction::Loaded { todos } => assert_eq!(todos.len(), 1),
        other => panic!("expected Loaded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_view_reflects_edit_session_and_input() {
    init_tracing();
    let store = store_over(Arc::new(BlobStorage::with_default_key(MemoryStore::new())));
    store.send(TodoAction::Load).await.unwrap();
    add(&store, "Edit me").await;
    store
        .send(TodoAction::ChangeInput {
            text: "draft".to_string(),
        })
        .await
        .unwrap();
    store
        .send(TodoAction::StartEdit {
            id: TodoId::new("todo-1"),
        })
        .await
        .unwrap();

    store
        .state(|s| {
            let view = s.view();
            assert_eq!(view.items.len(), 1);
            assert_eq!(view.active_count, 1);
            assert_eq!(view.input, "draft");
            assert!(view.edit.is_editing(&TodoId::new("todo-1")));
        })
        .await;
}
