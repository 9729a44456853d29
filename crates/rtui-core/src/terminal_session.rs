#![forbid(unsafe_code)]

//! Terminal session lifecycle guard.
//!
//! [`TerminalSession::enter`] switches to raw mode and the alternate screen
//! and hides the cursor; [`Drop`] undoes all three. A process-wide panic
//! hook runs the same restore before the default hook prints, so a crashing
//! dashboard never leaves the operator's shell in raw mode.
//!
//! Ctrl-C does not raise `SIGINT` while raw mode is on; it arrives as a key
//! event and is handled like any other binding. `SIGINT`/`SIGTERM` sent from
//! outside still restore the terminal before the process exits.
//!
//! ```no_run
//! use rtui_core::terminal_session::TerminalSession;
//!
//! let session = TerminalSession::enter()?;
//! let (width, height) = session.size()?;
//! # let _ = (width, height);
//! // Dropping `session` restores the terminal.
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crate::event::Event;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Raw mode, alternate screen and hidden cursor, held until drop.
///
/// Only one session should exist at a time.
#[derive(Debug)]
pub struct TerminalSession {
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// # Errors
    ///
    /// Fails when raw mode, the signal watcher or the alternate screen
    /// cannot be set up. Anything already entered is restored first.
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        // From here on, dropping `session` undoes whatever was entered.
        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut session = Self {
            #[cfg(unix)]
            signal_guard: None,
        };
        #[cfg(unix)]
        {
            session.signal_guard = Some(SignalGuard::new()?);
        }
        crossterm::execute!(
            io::stdout(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide
        )?;
        #[cfg(feature = "tracing")]
        tracing::info!("terminal session started");
        Ok(session)
    }

    /// Current terminal size as (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();
        restore_terminal();
        #[cfg(feature = "tracing")]
        tracing::info!("terminal session restored");
    }
}

/// Wait up to `timeout` for the next terminal event.
///
/// Returns `Ok(None)` on timeout and for input [`Event::from_crossterm`]
/// drops. Safe to call from a thread other than the one holding the
/// [`TerminalSession`].
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if !crossterm::event::poll(timeout)? {
        return Ok(None);
    }
    let event = crossterm::event::read()?;
    Ok(Event::from_crossterm(event))
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

// Every step is attempted even if an earlier one fails.
fn restore_terminal() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Restores the terminal and exits on `SIGINT`/`SIGTERM`.
#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                #[cfg(feature = "tracing")]
                tracing::warn!(signal, "termination signal received, restoring terminal");
                restore_terminal();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
