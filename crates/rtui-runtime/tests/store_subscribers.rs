//! Subscriber delivery guarantees of the store.
//!
//! Every dispatch reaches each live subscriber exactly once, never reaches a
//! subscriber after it unsubscribed, and unsubscribing from another thread
//! while dispatches run is safe.

use std::sync::{Arc, Barrier};
use std::thread;

use proptest::prelude::*;
use rtui_runtime::store::{SUBSCRIBER_CAPACITY, Store, StoreOptions};

#[derive(Debug)]
enum Action {
    Bump,
}

fn store() -> Store<u64, Action> {
    let store = Store::new(0, StoreOptions::default());
    let _ = store.add_reducer(|state: &mut u64, action: &Action| match action {
        Action::Bump => *state += 1,
    });
    store
}

#[test]
fn each_subscriber_gets_one_snapshot_per_dispatch() {
    let store = store();
    let (a, _ua) = store.subscribe();
    let (b, _ub) = store.subscribe();
    store.dispatch(Action::Bump);
    assert_eq!(a.try_iter().collect::<Vec<_>>(), vec![1]);
    assert_eq!(b.try_iter().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn unsubscribed_stream_receives_nothing() {
    let store = store();
    let (rx, unsub) = store.subscribe();
    let (other, _keep) = store.subscribe();
    unsub.unsubscribe();
    unsub.unsubscribe();
    store.dispatch(Action::Bump);
    assert!(rx.try_recv().is_err());
    assert_eq!(other.try_recv(), Ok(1));
}

#[test]
fn unsubscribe_from_another_thread_during_dispatches() {
    let store = store();
    let (rx, unsub) = store.subscribe();
    let barrier = Arc::new(Barrier::new(2));
    let remote = Arc::clone(&barrier);

    let handle = thread::spawn(move || {
        remote.wait();
        unsub.unsubscribe();
        unsub
    });

    barrier.wait();
    for _ in 0..5 {
        store.dispatch(Action::Bump);
    }
    let unsub = handle.join().expect("unsubscribe thread panicked");
    drop(unsub);

    let after = store.current();
    store.dispatch(Action::Bump);

    // Whatever arrived before the unsubscribe is a prefix of the dispatch
    // sequence, and nothing arrives afterwards.
    let received: Vec<u64> = rx.try_iter().collect();
    let expected: Vec<u64> = (1..=received.len() as u64).collect();
    assert_eq!(received, expected);
    assert!(received.last().is_none_or(|last| *last <= after));
    assert_eq!(store.subscriber_count(), 0);
}

proptest! {
    #[test]
    fn subscriber_always_sees_latest_state(dispatches in 1usize..40) {
        let store = store();
        let (rx, _unsub) = store.subscribe();
        for _ in 0..dispatches {
            store.dispatch(Action::Bump);
        }
        let received: Vec<u64> = rx.try_iter().collect();
        prop_assert_eq!(received.len(), dispatches.min(SUBSCRIBER_CAPACITY));
        prop_assert_eq!(received.last().copied(), Some(dispatches as u64));
        prop_assert!(received.windows(2).all(|w| w[1] == w[0] + 1));
    }
}
