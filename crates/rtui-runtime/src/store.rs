#![forbid(unsafe_code)]

//! Unidirectional state store.
//!
//! A [`Store`] owns one state value. Reducers registered with
//! [`Store::add_reducer`] are the only code that mutates it; every
//! [`Store::dispatch`] runs all active reducers in registration order and
//! then broadcasts a snapshot of the result to every subscriber.
//!
//! # Dispatch protocol
//!
//! - Reducers run synchronously on the caller's thread.
//! - A dispatch issued while another is running (from a reducer, or from a
//!   handler a reducer triggered) is queued and processed after the current
//!   one, with its own reducer pass and its own broadcast. Each `dispatch`
//!   call therefore produces exactly one broadcast.
//! - A reducer removed mid-dispatch does not run in any later slot of that
//!   dispatch.
//! - Reducers receive `&mut S` and must not call [`Store::current`]; the
//!   state is mutably borrowed while they run.
//!
//! # Subscribers
//!
//! Each subscriber gets a bounded channel of [`SUBSCRIBER_CAPACITY`]
//! snapshots. When a channel is full the oldest pending snapshot is dropped
//! to make room for the newest: subscribers only ever need the latest state,
//! and the usual subscriber is the dispatching thread itself, so blocking
//! would deadlock. The registry is mutex-guarded, so an [`Unsubscribe`] may
//! race a dispatch running on another thread. A subscriber whose [`Updates`]
//! was dropped is pruned on the next broadcast.
//!
//! # Example
//!
//! ```
//! use rtui_runtime::store::{Store, StoreOptions};
//!
//! #[derive(Debug)]
//! enum Action {
//!     Add(i32),
//! }
//!
//! let store = Store::new(0_i32, StoreOptions::default());
//! let _reducer = store.add_reducer(|state: &mut i32, action: &Action| match action {
//!     Action::Add(n) => *state += n,
//! });
//! let (updates, _unsubscribe) = store.subscribe();
//! store.dispatch(Action::Add(2));
//! assert_eq!(updates.try_recv(), Ok(2));
//! assert_eq!(store.current(), 2);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};
use std::sync::{Arc, Mutex, MutexGuard, Weak as ArcWeak};

use crossbeam_channel::{Receiver, Sender, TrySendError};

/// Pending snapshots a subscriber channel holds before dropping the oldest.
pub const SUBSCRIBER_CAPACITY: usize = 10;

/// Store construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Log the full post-reduction state after every dispatch.
    pub debug: bool,
}

type ReducerFn<S, A> = dyn FnMut(&mut S, &A);

struct ReducerEntry<S, A> {
    id: u64,
    active: Rc<Cell<bool>>,
    reducer: Rc<RefCell<ReducerFn<S, A>>>,
}

impl<S, A> Clone for ReducerEntry<S, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Rc::clone(&self.active),
            reducer: Rc::clone(&self.reducer),
        }
    }
}

struct Subscriber<S> {
    id: u64,
    tx: Sender<S>,
    /// Second handle on the subscriber's queue, used to evict the oldest
    /// snapshot when the channel is full. It keeps the channel connected,
    /// so a dropped [`Updates`] is noticed through `alive` instead.
    evict: Receiver<S>,
    alive: ArcWeak<()>,
}

impl<S> Subscriber<S> {
    fn is_abandoned(&self) -> bool {
        self.alive.strong_count() == 0
    }
}

/// Receiving end of a subscription, returned by [`Store::subscribe`].
///
/// Derefs to the underlying channel receiver. Dropping it lets the next
/// broadcast prune the subscriber.
pub struct Updates<S> {
    rx: Receiver<S>,
    _alive: Arc<()>,
}

impl<S> Deref for Updates<S> {
    type Target = Receiver<S>;

    fn deref(&self) -> &Receiver<S> {
        &self.rx
    }
}

impl<S> fmt::Debug for Updates<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updates").field("pending", &self.rx.len()).finish()
    }
}

type Registry<S> = Mutex<Vec<Subscriber<S>>>;

fn lock<S>(registry: &Registry<S>) -> MutexGuard<'_, Vec<Subscriber<S>>> {
    registry
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

struct StoreInner<S, A> {
    state: RefCell<S>,
    reducers: RefCell<Vec<ReducerEntry<S, A>>>,
    subscribers: Arc<Registry<S>>,
    pending: RefCell<VecDeque<A>>,
    dispatching: Cell<bool>,
    next_id: Cell<u64>,
    options: StoreOptions,
}

impl<S, A> StoreInner<S, A> {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        id
    }
}

/// Clears the dispatching flag even if a reducer panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Handle to a shared state store.
///
/// Cloning is cheap and every clone refers to the same store.
pub struct Store<S, A> {
    inner: Rc<StoreInner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("reducers", &self.inner.reducers.borrow().len())
            .field("subscribers", &lock(&self.inner.subscribers).len())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl<S, A> Store<S, A>
where
    S: Clone + fmt::Debug + Send + 'static,
    A: fmt::Debug + 'static,
{
    /// Create a store holding `initial`.
    pub fn new(initial: S, options: StoreOptions) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(initial),
                reducers: RefCell::new(Vec::new()),
                subscribers: Arc::new(Mutex::new(Vec::new())),
                pending: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
                next_id: Cell::new(0),
                options,
            }),
        }
    }

    /// Register a reducer; it runs after every reducer registered before it.
    ///
    /// The reducer stays installed until [`ReducerHandle::remove`] is called
    /// or the store is dropped. Dropping the handle does not remove it.
    pub fn add_reducer(&self, reducer: impl FnMut(&mut S, &A) + 'static) -> ReducerHandle<S, A> {
        let id = self.inner.next_id();
        let active = Rc::new(Cell::new(true));
        self.inner.reducers.borrow_mut().push(ReducerEntry {
            id,
            active: Rc::clone(&active),
            reducer: Rc::new(RefCell::new(reducer)),
        });
        tracing::debug!(reducer_id = id, "reducer added");
        ReducerHandle {
            id,
            active,
            store: Rc::downgrade(&self.inner),
        }
    }

    /// Number of installed reducers.
    pub fn reducer_count(&self) -> usize {
        self.inner.reducers.borrow().len()
    }

    /// Apply `action` to the state and broadcast the result.
    ///
    /// Never fails. When called from inside a running dispatch the action is
    /// queued and handled once the current one completes.
    pub fn dispatch(&self, action: A) {
        self.inner.pending.borrow_mut().push_back(action);
        if self.inner.dispatching.get() {
            tracing::trace!("dispatch queued behind running dispatch");
            return;
        }

        let _guard = DispatchGuard::enter(&self.inner.dispatching);
        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            let Some(action) = next else {
                break;
            };
            tracing::debug!(action = ?action, "dispatch");
            self.reduce(&action);
            if self.inner.options.debug {
                tracing::debug!(state = ?*self.inner.state.borrow(), "state after dispatch");
            }
            self.broadcast();
        }
    }

    fn reduce(&self, action: &A) {
        // Snapshot so reducers may add or remove reducers while we iterate.
        let entries: Vec<ReducerEntry<S, A>> = self.inner.reducers.borrow().clone();
        for entry in entries {
            if !entry.active.get() {
                continue;
            }
            tracing::trace!(reducer_id = entry.id, "running reducer");
            let mut state = self.inner.state.borrow_mut();
            let mut reducer = entry.reducer.borrow_mut();
            (&mut *reducer)(&mut *state, action);
        }
    }

    /// Re-broadcast the current state without running reducers.
    ///
    /// Views use this to request a redraw after changing view-local state
    /// such as a scroll offset.
    pub fn refresh(&self) {
        tracing::trace!("refresh");
        self.broadcast();
    }

    fn broadcast(&self) {
        let snapshot = self.inner.state.borrow().clone();
        let mut subscribers = lock(&self.inner.subscribers);
        subscribers.retain(|sub| {
            if sub.is_abandoned() {
                tracing::debug!(subscriber_id = sub.id, "subscriber receiver dropped");
                return false;
            }
            Self::deliver(sub, snapshot.clone())
        });
    }

    fn deliver(sub: &Subscriber<S>, snapshot: S) -> bool {
        match sub.tx.try_send(snapshot) {
            Ok(()) => true,
            Err(TrySendError::Full(snapshot)) => {
                let _ = sub.evict.try_recv();
                tracing::warn!(
                    subscriber_id = sub.id,
                    capacity = SUBSCRIBER_CAPACITY,
                    "subscriber channel full, dropped oldest snapshot"
                );
                match sub.tx.try_send(snapshot) {
                    Ok(()) | Err(TrySendError::Full(_)) => true,
                    Err(TrySendError::Disconnected(_)) => false,
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!(subscriber_id = sub.id, "subscriber disconnected");
                false
            }
        }
    }

    /// Subscribe to post-dispatch snapshots.
    ///
    /// The returned [`Unsubscribe`] must be kept alive for as long as
    /// updates are wanted; dropping it unsubscribes.
    pub fn subscribe(&self) -> (Updates<S>, Unsubscribe<S>) {
        let (tx, rx) = crossbeam_channel::bounded(SUBSCRIBER_CAPACITY);
        let alive = Arc::new(());
        let id = self.inner.next_id();
        lock(&self.inner.subscribers).push(Subscriber {
            id,
            tx,
            evict: rx.clone(),
            alive: Arc::downgrade(&alive),
        });
        tracing::debug!(subscriber_id = id, "subscriber added");
        (
            Updates { rx, _alive: alive },
            Unsubscribe {
                id,
                registry: Arc::downgrade(&self.inner.subscribers),
            },
        )
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    /// A copy of the current state.
    ///
    /// Mutating the copy does not affect the store.
    pub fn current(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// A non-owning handle, for reducers that need to dispatch follow-ups.
    pub fn downgrade(&self) -> WeakStore<S, A> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning [`Store`] handle that does not keep the store alive.
pub struct WeakStore<S, A> {
    inner: Weak<StoreInner<S, A>>,
}

impl<S, A> Clone for WeakStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S, A> WeakStore<S, A> {
    /// The store, if it is still alive.
    pub fn upgrade(&self) -> Option<Store<S, A>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

/// Removal handle returned by [`Store::add_reducer`].
pub struct ReducerHandle<S, A> {
    id: u64,
    active: Rc<Cell<bool>>,
    store: Weak<StoreInner<S, A>>,
}

impl<S, A> ReducerHandle<S, A> {
    /// Uninstall the reducer. Idempotent.
    pub fn remove(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(store) = self.store.upgrade() {
            store.reducers.borrow_mut().retain(|entry| entry.id != self.id);
        }
        tracing::debug!(reducer_id = self.id, "reducer removed");
    }

    /// Whether the reducer is still installed.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// Unsubscribe handle returned by [`Store::subscribe`].
///
/// Safe to use from any thread, including while a dispatch is broadcasting.
#[must_use = "dropping the handle unsubscribes immediately"]
pub struct Unsubscribe<S> {
    id: u64,
    registry: ArcWeak<Registry<S>>,
}

impl<S> Unsubscribe<S> {
    /// Stop receiving snapshots. Idempotent.
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut subscribers = lock(&registry);
        let before = subscribers.len();
        subscribers.retain(|sub| sub.id != self.id);
        if subscribers.len() != before {
            tracing::debug!(subscriber_id = self.id, "subscriber removed");
        }
    }
}

impl<S> Drop for Unsubscribe<S> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Action {
        Add(i32),
        Double,
    }

    fn counter() -> Store<i32, Action> {
        let store = Store::new(0, StoreOptions::default());
        let _ = store.add_reducer(|state: &mut i32, action: &Action| match action {
            Action::Add(n) => *state += n,
            Action::Double => {}
        });
        store
    }

    #[test]
    fn reducers_run_in_registration_order() {
        let store = counter();
        let _ = store.add_reducer(|state: &mut i32, action: &Action| {
            if matches!(action, Action::Double) {
                *state *= 2;
            }
        });
        let _ = store.add_reducer(|state: &mut i32, _: &Action| *state += 1);
        store.dispatch(Action::Add(3));
        assert_eq!(store.current(), 4);
        store.dispatch(Action::Double);
        assert_eq!(store.current(), 9);
    }

    #[test]
    fn current_is_a_copy() {
        let store = counter();
        let mut copy = store.current();
        copy += 100;
        assert_eq!(store.current(), 0);
    }

    #[test]
    fn removed_reducer_stops_running() {
        let store = counter();
        let handle = store.add_reducer(|state: &mut i32, _: &Action| *state += 10);
        store.dispatch(Action::Add(1));
        assert_eq!(store.current(), 11);
        handle.remove();
        handle.remove();
        assert!(!handle.is_active());
        store.dispatch(Action::Add(1));
        assert_eq!(store.current(), 12);
        assert_eq!(store.reducer_count(), 1);
    }

    #[test]
    fn nested_dispatch_is_queued_and_broadcast_separately() {
        let store = counter();
        let weak = store.downgrade();
        let _ = store.add_reducer(move |_: &mut i32, action: &Action| {
            if let Action::Add(1) = action
                && let Some(store) = weak.upgrade()
            {
                store.dispatch(Action::Add(10));
            }
        });
        let (rx, _unsub) = store.subscribe();
        store.dispatch(Action::Add(1));
        assert_eq!(rx.try_recv(), Ok(1));
        assert_eq!(rx.try_recv(), Ok(11));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn reducer_removed_mid_dispatch_is_skipped() {
        let store = counter();
        let victim: Rc<RefCell<Option<ReducerHandle<i32, Action>>>> = Rc::new(RefCell::new(None));
        let victim_ref = Rc::clone(&victim);
        let _ = store.add_reducer(move |_: &mut i32, _: &Action| {
            if let Some(handle) = victim_ref.borrow().as_ref() {
                handle.remove();
            }
        });
        let handle = store.add_reducer(|state: &mut i32, _: &Action| *state += 100);
        *victim.borrow_mut() = Some(handle);
        store.dispatch(Action::Add(1));
        assert_eq!(store.current(), 1);
    }

    #[test]
    fn refresh_broadcasts_without_reducing() {
        let store = counter();
        store.dispatch(Action::Add(5));
        let (rx, _unsub) = store.subscribe();
        store.refresh();
        assert_eq!(rx.try_recv(), Ok(5));
        assert_eq!(store.current(), 5);
    }

    #[test]
    fn overflow_drops_oldest() {
        let store = counter();
        let (rx, _unsub) = store.subscribe();
        for _ in 0..SUBSCRIBER_CAPACITY + 3 {
            store.dispatch(Action::Add(1));
        }
        let received: Vec<i32> = rx.try_iter().collect();
        assert_eq!(received.len(), SUBSCRIBER_CAPACITY);
        assert_eq!(received.first(), Some(&4));
        assert_eq!(received.last(), Some(&13));
    }

    #[test]
    fn unsubscribe_on_drop() {
        let store = counter();
        let (rx, unsub) = store.subscribe();
        drop(unsub);
        store.dispatch(Action::Add(1));
        assert!(rx.try_recv().is_err());
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn dropped_receiver_is_pruned_on_next_broadcast() {
        let store = counter();
        let (kept, _kept_unsub) = store.subscribe();
        let (gone, _gone_unsub) = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);
        drop(gone);
        store.dispatch(Action::Add(1));
        assert_eq!(store.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Ok(1));
    }
}
