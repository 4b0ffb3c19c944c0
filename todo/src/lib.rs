//! A persistent todo list built on the Checklist reducer architecture.
//!
//! The crate holds the three layers of the list:
//!
//! - [`collection`]: the collection engine (add, toggle, edit, remove, filter)
//! - [`storage`]: the store adapter that round-trips the collection through a
//!   local key-value store as one JSON blob
//! - [`reducer`]: the view-state coordinator, run by a
//!   [`checklist_runtime::Store`]
//!
//! # Quick Start
//!
//! ```no_run
//! use todo::storage::{BlobStorage, MemoryStore};
//! use todo::{TodoAction, TodoEnvironment, TodoReducer, TodoState};
//! use checklist_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = BlobStorage::with_default_key(MemoryStore::new());
//! let env = TodoEnvironment::with_storage(Arc::new(storage));
//! let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//! // Load once, then mutate; every change is saved
//! store.send(TodoAction::Load).await?;
//! store.send(TodoAction::AddTodo { text: "Buy milk".to_string() }).await?;
//!
//! let active = store.state(TodoState::active_count).await;
//! println!("{active} item(s) left");
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod reducer;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use collection::Collection;
pub use reducer::{TodoEnvironment, TodoReducer, UuidGenerator};
pub use types::{EditSession, Filter, TodoAction, TodoId, TodoItem, TodoState, TodoView};
