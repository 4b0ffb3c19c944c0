//! # Checklist Runtime
//!
//! Runtime implementation for the Checklist architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that owns state and executes effects
//! - **Event Loop**: The action → reducer → effects → action feedback loop,
//!   drained to completion inside every `send`
//!
//! ## Example
//!
//! ```ignore
//! use checklist_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use checklist_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock, broadcast};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after `shutdown()`.
        #[error("Store is shutting down")]
        ShutdownInProgress,
    }
}

pub use error::StoreError;

/// Store module - the runtime coordinator
pub mod store {
    use super::{
        Arc, AtomicBool, Effect, Mutex, Ordering, Reducer, RwLock, StoreError, VecDeque,
        broadcast,
    };

    /// Default capacity of the action broadcast channel
    const BROADCAST_CAPACITY: usize = 16;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` so readers never observe a half-applied action)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Actions are processed strictly one at a time. A `send` holds the
    /// dispatch lock until the action and every action its effects feed back
    /// have been reduced, so effects observe the same order the user produced
    /// the intents in.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        dispatch: Arc<Mutex<()>>,
        shutdown: Arc<AtomicBool>,
        /// Actions produced by effects are broadcast to observers.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + std::fmt::Debug + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (action_broadcast, _) = broadcast::channel(BROADCAST_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                dispatch: Arc::new(Mutex::new(())),
                shutdown: Arc::new(AtomicBool::new(false)),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer, then executes the returned effects in order.
        /// Any action an effect produces is fed back into the reducer before
        /// this call returns.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                return Err(StoreError::ShutdownInProgress);
            }

            let _dispatch = self.dispatch.lock().await;

            // Shutdown may have begun while this call waited for the lock.
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected queued action: store is shutting down");
                return Err(StoreError::ShutdownInProgress);
            }

            let mut pending = VecDeque::from([action]);
            while let Some(action) = pending.pop_front() {
                tracing::debug!(?action, "Processing action");

                let effects = {
                    let mut state = self.state.write().await;
                    let span = tracing::debug_span!("reducer_execution");
                    let _enter = span.enter();
                    self.reducer.reduce(&mut *state, action, &self.environment)
                };

                tracing::trace!("Reducer completed, returned {} effects", effects.len());

                let mut queue: VecDeque<Effect<A>> = effects.into_iter().collect();
                while let Some(effect) = queue.pop_front() {
                    match effect {
                        Effect::None => {
                            tracing::trace!("Executing Effect::None (no-op)");
                        },
                        Effect::Sequential(effects) => {
                            tracing::trace!(
                                "Executing Effect::Sequential with {} effects",
                                effects.len()
                            );
                            for effect in effects.into_iter().rev() {
                                queue.push_front(effect);
                            }
                        },
                        Effect::Future(fut) => {
                            tracing::trace!("Executing Effect::Future");
                            if let Some(action) = fut.await {
                                tracing::trace!("Effect::Future produced an action");
                                // No receivers is the common case; ignore the send error.
                                let _ = self.action_broadcast.send(action.clone());
                                pending.push_back(action);
                            }
                        },
                    }
                }
            }

            Ok(())
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to actions produced by effects
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Stop accepting new actions
        ///
        /// Waits for the action currently being processed (if any) to finish.
        /// Sends still waiting for their turn are rejected.
        pub async fn shutdown(&self) {
            tracing::info!("Initiating shutdown");
            self.shutdown.store(true, Ordering::Release);
            let _dispatch = self.dispatch.lock().await;
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                dispatch: Arc::clone(&self.dispatch),
                shutdown: Arc::clone(&self.shutdown),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

pub use store::Store;
