//! # Checklist Testing
//!
//! Testing utilities and helpers for the Checklist architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then builder for reducers ([`ReducerTest`])
//! - Property-based testing strategies
//! - Tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use checklist_testing::{ReducerTest, SequentialIdGenerator};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(test_environment())
//!     .given_state(TodoState::loaded(vec![]))
//!     .when_action(TodoAction::AddTodo { text: "Buy milk".into() })
//!     .then_state(|state| assert_eq!(state.todos.len(), 1))
//!     .run();
//! ```

use checklist_core::environment::IdGenerator;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::IdGenerator;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Predictable id generator for deterministic tests
    ///
    /// Hands out `"<prefix>-1"`, `"<prefix>-2"`, ... in order.
    ///
    /// # Example
    ///
    /// ```
    /// use checklist_testing::mocks::SequentialIdGenerator;
    /// use checklist_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIdGenerator::new("todo");
    /// assert_eq!(ids.next_id(), "todo-1");
    /// assert_eq!(ids.next_id(), "todo-2");
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose ids start at `<prefix>-1`
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new("id")
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::Relaxed);
            format!("{}-{n}", self.prefix)
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Text that is non-empty after trimming, with optional surrounding whitespace
    pub fn non_blank_text() -> impl Strategy<Value = String> {
        ("[ \t]{0,3}", "[a-zA-Z0-9][a-zA-Z0-9 .,!?-]{0,30}", "[ \t\n]{0,3}")
            .prop_map(|(lead, body, trail)| format!("{lead}{body}{trail}"))
    }

    /// Whitespace-only text, including the empty string
    pub fn blank_text() -> impl Strategy<Value = String> {
        "[ \t\n\r]{0,8}"
    }
}

/// Install a test-friendly tracing subscriber
///
/// Output goes through the libtest capture, so logs only show for failing
/// tests. Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::SequentialIdGenerator;
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sequential_ids_are_unique_and_ordered() {
        let ids = SequentialIdGenerator::new("t");
        let first = ids.next_id();
        let second = ids.next_id();
        assert_eq!(first, "t-1");
        assert_eq!(second, "t-2");
    }

    proptest! {
        #[test]
        fn non_blank_text_never_trims_to_empty(text in properties::non_blank_text()) {
            prop_assert!(!text.trim().is_empty());
        }

        #[test]
        fn blank_text_always_trims_to_empty(text in properties::blank_text()) {
            prop_assert!(text.trim().is_empty());
        }
    }
}
