//! Store runtime - shared state with synchronous dispatch and subscriptions.

use crate::reducer::Reducer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;
type ListenerSlot<S> = (u64, Listener<S>);

/// The Store - shared state container for a reducer.
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (state-transition logic)
/// 3. Subscribers (notified synchronously after every dispatch)
///
/// Cloning a `Store` is cheap and yields a handle to the same state;
/// consumers receive it by reference rather than reaching for a global.
/// The store is created at session start and torn down when the owning
/// session ends.
///
/// # Dispatch semantics
///
/// `dispatch` is synchronous: the reducer runs under the state lock, the
/// lock is released, and subscribers are then notified in subscription
/// order with the new state. Subscribers registered during notification
/// see only later dispatches. A subscriber that has been dropped is
/// silently skipped - a late network response dispatching into the store
/// after a view has unsubscribed must never fail.
pub struct Store<R: Reducer> {
    inner: Arc<StoreInner<R>>,
}

struct StoreInner<R: Reducer> {
    reducer: R,
    state: RwLock<R::State>,
    subscribers: Mutex<Vec<ListenerSlot<R::State>>>,
    next_subscriber: AtomicU64,
}

impl<R> Store<R>
where
    R: Reducer,
    R::State: Clone,
{
    /// Create a new store with initial state and reducer.
    pub fn new(initial_state: R::State, reducer: R) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                reducer,
                state: RwLock::new(initial_state),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
            }),
        }
    }

    /// Get a clone of the current state.
    #[must_use]
    pub fn state(&self) -> R::State {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read the current state through a closure without cloning it.
    pub fn with_state<T>(&self, f: impl FnOnce(&R::State) -> T) -> T {
        f(&self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner))
    }

    /// Dispatch an action through the reducer and return the new state.
    ///
    /// The action is applied atomically: no reader observes a state with
    /// the action half-applied. After the state is replaced, all current
    /// subscribers are notified synchronously, in subscription order.
    pub fn dispatch(&self, action: R::Action) -> R::State {
        let next = {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            self.inner.reducer.reduce(&mut state, action);
            state.clone()
        };

        // Listeners run outside both locks so a listener may freely read
        // the store or drop its own subscription.
        let listeners: Vec<Listener<R::State>> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::trace!(subscribers = listeners.len(), "store dispatch");

        for listener in listeners {
            listener(&next);
        }

        next
    }

    /// Register a listener called after every dispatch with the new state.
    ///
    /// Returns a [`Subscription`] guard; dropping it unsubscribes the
    /// listener. Listeners should read whatever state they need from the
    /// value they are handed (or call [`Store::state`] at use time) rather
    /// than caching a copy at subscribe time.
    #[must_use]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&R::State) + Send + Sync + 'static,
        R::State: Send + Sync + 'static,
        R: Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));

        let slot: Weak<StoreInner<R>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = slot.upgrade() {
                inner
                    .subscribers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|(slot_id, _)| *slot_id != id);
            }
        })
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Subscription guard returned by [`Store::subscribe`].
///
/// Dropping the guard removes the listener. If the store itself is gone by
/// then, the drop is a no-op.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Detach the subscription, leaving the listener registered for the
    /// lifetime of the store.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Default, PartialEq, Debug)]
    struct TestState {
        value: i64,
    }

    enum TestAction {
        Add(i64),
        Set(i64),
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;

        fn reduce(&self, state: &mut TestState, action: TestAction) {
            match action {
                TestAction::Add(n) => state.value += n,
                TestAction::Set(n) => state.value = n,
            }
        }
    }

    #[test]
    fn dispatch_returns_new_state() {
        let store = Store::new(TestState::default(), TestReducer);
        let next = store.dispatch(TestAction::Add(3));
        assert_eq!(next.value, 3);
        assert_eq!(store.state().value, 3);
    }

    #[test]
    fn subscribers_notified_in_subscription_order() {
        let store = Store::new(TestState::default(), TestReducer);
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let order = Arc::clone(&order);
            store.subscribe(move |_| order.lock().expect("order lock").push("first"))
        };
        let second = {
            let order = Arc::clone(&order);
            store.subscribe(move |_| order.lock().expect("order lock").push("second"))
        };

        store.dispatch(TestAction::Add(1));
        assert_eq!(*order.lock().expect("order lock"), vec!["first", "second"]);
        drop(first);
        drop(second);
    }

    #[test]
    fn dropped_subscription_is_not_notified() {
        let store = Store::new(TestState::default(), TestReducer);
        let calls = Arc::new(AtomicUsize::new(0));

        let sub = {
            let calls = Arc::clone(&calls);
            store.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        store.dispatch(TestAction::Add(1));
        drop(sub);
        store.dispatch(TestAction::Add(1));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn late_dispatch_after_unsubscribe_does_not_fail() {
        let store = Store::new(TestState::default(), TestReducer);
        let sub = store.subscribe(|_| {});
        drop(sub);

        // Simulates a network response arriving after the view has left.
        let next = store.dispatch(TestAction::Set(42));
        assert_eq!(next.value, 42);
    }

    #[test]
    fn clones_share_state() {
        let store = Store::new(TestState::default(), TestReducer);
        let other = store.clone();
        other.dispatch(TestAction::Add(5));
        assert_eq!(store.state().value, 5);
    }
}
