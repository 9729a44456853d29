#![forbid(unsafe_code)]

//! The blocking two-source event loop.
//!
//! The UI thread waits on both the raw event queue and the store's update
//! stream with a single `select!`, so it sleeps until either source has
//! something and never spins. Key handling dispatches actions, the store
//! broadcasts the new snapshot, and the snapshot wakes the loop again to
//! redraw.

use crossbeam_channel::{Receiver, select};
use rtui_core::event::Event;

/// An application driven by [`run_event_loop`].
pub trait Application {
    /// The store state delivered on the update stream.
    type State;

    /// Handle one terminal event (key press or resize).
    fn handle_event(&mut self, event: Event);

    /// Handle a post-dispatch state snapshot, typically by redrawing.
    fn handle_update(&mut self, state: Self::State);

    /// Checked before every wait; returning `true` ends the loop.
    fn should_quit(&self) -> bool;
}

/// Why [`run_event_loop`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The application asked to quit.
    Quit,
    /// Both sources disconnected.
    Disconnected,
}

/// Run `app` until it quits or both sources are gone.
///
/// A source that disconnects is replaced by [`crossbeam_channel::never`], so
/// the loop keeps serving the other one without spinning on the closed
/// channel.
pub fn run_event_loop<A: Application>(
    app: &mut A,
    events: &Receiver<Event>,
    updates: &Receiver<A::State>,
) -> LoopExit {
    let mut events = events.clone();
    let mut updates = updates.clone();
    let mut events_open = true;
    let mut updates_open = true;

    tracing::info!("event loop started");
    while !app.should_quit() {
        if !events_open && !updates_open {
            tracing::info!("event loop sources disconnected");
            return LoopExit::Disconnected;
        }
        select! {
            recv(events) -> msg => match msg {
                Ok(event) => app.handle_event(event),
                Err(_) => {
                    tracing::debug!("event source disconnected");
                    events = crossbeam_channel::never();
                    events_open = false;
                }
            },
            recv(updates) -> msg => match msg {
                Ok(state) => app.handle_update(state),
                Err(_) => {
                    tracing::debug!("update stream disconnected");
                    updates = crossbeam_channel::never();
                    updates_open = false;
                }
            },
        }
    }
    tracing::info!("event loop finished");
    LoopExit::Quit
}
