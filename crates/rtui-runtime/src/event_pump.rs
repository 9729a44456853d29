#![forbid(unsafe_code)]

//! Terminal event pump thread.
//!
//! The pump is the only code that reads raw terminal input. It forwards
//! mapped [`Event`]s into a bounded channel and never touches application
//! state. It polls with a timeout rather than blocking in `read`, so dropping
//! the pump can stop and join the thread promptly.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, Sender};
use rtui_core::event::Event;

/// Capacity of the raw event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 10;

/// How long one poll waits before re-checking the stop flag.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Background thread feeding terminal events into a channel.
pub struct EventPump {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    events: Receiver<Event>,
}

impl EventPump {
    /// Start pumping events from the controlling terminal.
    pub fn spawn() -> Self {
        Self::spawn_with(rtui_core::terminal_session::poll_event)
    }

    /// Start pumping events from a custom source.
    ///
    /// `source` is called with [`POLL_INTERVAL`] and returns `Ok(None)` when
    /// nothing arrived in time. An `Err` ends the pump, which disconnects the
    /// channel.
    pub fn spawn_with<F>(source: F) -> Self
    where
        F: FnMut(Duration) -> io::Result<Option<Event>> + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(EVENT_QUEUE_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let thread = std::thread::Builder::new()
            .name("rtui-event-pump".into())
            .spawn(move || pump(source, &tx, &thread_stop))
            .map_err(|err| tracing::error!(%err, "failed to spawn event pump"))
            .ok();
        Self {
            stop,
            thread,
            events: rx,
        }
    }

    /// The channel events arrive on.
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }
}

fn pump<F>(mut source: F, tx: &Sender<Event>, stop: &AtomicBool)
where
    F: FnMut(Duration) -> io::Result<Option<Event>>,
{
    tracing::debug!("event pump started");
    while !stop.load(Ordering::Relaxed) {
        let event = match source(POLL_INTERVAL) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(err) => {
                tracing::error!(%err, "terminal read failed, stopping event pump");
                break;
            }
        };
        let mut pending = event;
        loop {
            match tx.send_timeout(pending, POLL_INTERVAL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(event)) => {
                    if stop.load(Ordering::Relaxed) {
                        return;
                    }
                    pending = event;
                }
                Err(SendTimeoutError::Disconnected(_)) => return,
            }
        }
    }
    tracing::debug!("event pump stopped");
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
