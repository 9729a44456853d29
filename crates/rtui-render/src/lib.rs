#![forbid(unsafe_code)]

//! Render: cells, styled buffers, frames, diffs, and the ANSI presenter.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod drawing;
pub mod frame;
pub mod presenter;
pub mod style;
