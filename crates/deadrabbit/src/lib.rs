#![forbid(unsafe_code)]

//! deadrabbit: a terminal dashboard for RabbitMQ dead-letter queues.
//!
//! The operator loads the messages parked in a DLQ, reads their headers and
//! bodies, drops the ones that should not come back, and requeues the rest.
//! A second panel runs preconfigured SQL queries so related rows can be
//! checked without leaving the terminal.
//!
//! # Structure
//!
//! - [`state`] and [`action`]: the single state value and everything that
//!   can change it
//! - [`reducer`]: the domain, input and layout reducers
//! - [`views`]: the message list, message details, SQL results and status
//!   line, plus the query popups
//! - [`app`]: the [`Dashboard`](app::Dashboard) wiring store, layout and
//!   backend together
//! - [`broker`] and [`database`]: the external systems, behind traits
//! - [`config`], [`cli`] and [`logging`]: startup

pub mod action;
pub mod app;
pub mod broker;
pub mod cli;
pub mod config;
pub mod database;
pub mod logging;
pub mod reducer;
pub mod state;
pub mod views;

pub use action::Action;
pub use app::{Dashboard, Services};
pub use state::State;
