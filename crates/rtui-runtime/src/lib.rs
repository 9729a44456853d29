#![forbid(unsafe_code)]

//! rtui Runtime
//!
//! Ties the core and render crates into a running application.
//!
//! # Key Components
//!
//! - [`Store`] - unidirectional state container with ordered reducers and
//!   bounded subscriber channels
//! - [`EventPump`] - background thread turning terminal input into events
//! - [`run_event_loop`] - blocking wait over events and state updates
//! - [`Backend`] - terminal or headless frame output

pub mod backend;
pub mod event_loop;
pub mod event_pump;
pub mod store;

pub use backend::{Backend, HeadlessBackend, TerminalBackend};
pub use event_loop::{Application, LoopExit, run_event_loop};
pub use event_pump::EventPump;
pub use store::{ReducerHandle, Store, StoreOptions, Unsubscribe, Updates, WeakStore};
