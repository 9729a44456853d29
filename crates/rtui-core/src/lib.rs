#![forbid(unsafe_code)]

//! Core: terminal lifecycle, events, geometry, and container utilities.

pub mod collections;
pub mod event;
pub mod geometry;
pub mod terminal_session;
