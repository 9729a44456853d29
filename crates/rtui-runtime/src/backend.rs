#![forbid(unsafe_code)]

//! Output backends.
//!
//! A [`Backend`] knows the screen size and shows finished frames. The
//! terminal backend diffs each frame against the previous one and presents
//! only the changes; the headless backend keeps frames in memory so tests
//! can assert on rendered text.

use std::io::{self, Stdout};

use rtui_core::geometry::Size;
use rtui_core::terminal_session::TerminalSession;
use rtui_render::buffer::Buffer;
use rtui_render::diff::BufferDiff;
use rtui_render::frame::Frame;
use rtui_render::presenter::Presenter;

/// Where frames go.
pub trait Backend {
    /// Current screen size.
    fn size(&self) -> io::Result<Size>;

    /// Show a finished frame.
    fn present(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Backend for a real terminal: raw mode, alternate screen, diffed output.
pub struct TerminalBackend {
    session: TerminalSession,
    presenter: Presenter<Stdout>,
    previous: Option<Buffer>,
}

impl TerminalBackend {
    /// Enter raw mode and the alternate screen.
    ///
    /// The terminal is restored when the backend is dropped.
    pub fn new() -> io::Result<Self> {
        let session = TerminalSession::enter()?;
        Ok(Self {
            session,
            presenter: Presenter::new(io::stdout()),
            previous: None,
        })
    }
}

impl Backend for TerminalBackend {
    fn size(&self) -> io::Result<Size> {
        self.session.size().map(Size::from)
    }

    fn present(&mut self, frame: &Frame) -> io::Result<()> {
        let diff = match &self.previous {
            Some(previous)
                if previous.width() == frame.buffer.width()
                    && previous.height() == frame.buffer.height() =>
            {
                BufferDiff::compute(previous, &frame.buffer)
            }
            _ => {
                tracing::debug!(
                    width = frame.buffer.width(),
                    height = frame.buffer.height(),
                    "full repaint"
                );
                self.presenter.invalidate();
                BufferDiff::full(&frame.buffer)
            }
        };
        self.presenter.present(frame, &diff)?;
        self.previous = Some(frame.buffer.clone());
        Ok(())
    }
}

/// In-memory backend for tests.
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    size: Size,
    last: Option<Frame>,
    presented: usize,
}

impl HeadlessBackend {
    /// A backend reporting a fixed size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: Size::new(width, height),
            last: None,
            presented: 0,
        }
    }

    /// Simulate a terminal resize.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = Size::new(width, height);
    }

    /// Rows of the last frame as text.
    pub fn screen_lines(&self) -> Vec<String> {
        self.last
            .as_ref()
            .map(|frame| {
                (0..frame.buffer.height())
                    .map(|y| frame.buffer.row_text(y))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// How many frames were presented.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Backend for HeadlessBackend {
    fn size(&self) -> io::Result<Size> {
        Ok(self.size)
    }

    fn present(&mut self, frame: &Frame) -> io::Result<()> {
        self.last = Some(frame.clone());
        self.presented += 1;
        Ok(())
    }
}
