#![forbid(unsafe_code)]

//! The drawing surface handed to a view.

use rtui_core::geometry::{Rect, Size};
use rtui_render::buffer::Buffer;
use rtui_render::drawing::{BoxChars, Draw};
use rtui_render::frame::Frame;
use rtui_render::style::Style;

/// A frame window clipped to one view's rectangle.
///
/// Coordinates passed to the drawing methods are relative to the view's
/// top-left corner. Writes outside the view are dropped, so views may draw
/// without bounds checks of their own.
pub struct DrawContext<'a, S> {
    frame: &'a mut Frame,
    area: Rect,
    state: &'a S,
}

impl<'a, S> DrawContext<'a, S> {
    /// A context drawing into `area` of `frame`.
    ///
    /// `area` is clipped to the frame.
    pub fn new(frame: &'a mut Frame, area: Rect, state: &'a S) -> Self {
        let area = area.intersection(&frame.area());
        Self { frame, area, state }
    }

    /// The state snapshot being drawn.
    pub fn state(&self) -> &'a S {
        self.state
    }

    /// The view's size.
    pub fn size(&self) -> Size {
        self.area.size()
    }

    /// The view's rectangle in frame coordinates.
    pub fn area(&self) -> Rect {
        self.area
    }

    fn absolute(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        if x >= self.area.width || y >= self.area.height {
            return None;
        }
        Some((self.area.x + x, self.area.y + y))
    }

    /// Write one character.
    pub fn set_cell(&mut self, x: i32, y: i32, style: Style, ch: char) {
        if let Some((ax, ay)) = self.absolute(x, y) {
            self.with_clip(|buffer| buffer.put_char(ax, ay, ch, style));
        }
    }

    /// Print `text` starting at `(x, y)`, clipped at the view's right edge.
    ///
    /// Returns the number of columns written.
    pub fn print(&mut self, x: i32, y: i32, text: &str, style: Style) -> u16 {
        let Some((ax, ay)) = self.absolute(x, y) else {
            return 0;
        };
        let max_x = self.area.right();
        let end = self.with_clip(|buffer| buffer.print_text_clipped(ax, ay, text, style, max_x));
        end.saturating_sub(ax)
    }

    /// Outline the whole view with `chars` and clear its interior, all in
    /// `style`.
    pub fn draw_box(&mut self, chars: BoxChars, style: Style) {
        let area = self.area;
        self.with_clip(|buffer| buffer.draw_box(area, chars, style));
    }

    /// Show the terminal cursor at `(x, y)`.
    pub fn set_cursor(&mut self, x: i32, y: i32) {
        if let Some((ax, ay)) = self.absolute(x, y) {
            self.frame.set_cursor(ax, ay);
        }
    }

    /// Hide the terminal cursor.
    pub fn hide_cursor(&mut self) {
        self.frame.hide_cursor();
    }

    /// Run `draw` against a nested context covering `rect`, given relative
    /// to this view and clipped to it.
    pub fn nested<R>(&mut self, rect: Rect, draw: impl FnOnce(&mut DrawContext<'_, S>) -> R) -> R {
        let absolute = Rect::new(
            self.area.x.saturating_add(rect.x),
            self.area.y.saturating_add(rect.y),
            rect.width,
            rect.height,
        )
        .intersection(&self.area);
        let mut inner = DrawContext {
            frame: &mut *self.frame,
            area: absolute,
            state: self.state,
        };
        draw(&mut inner)
    }

    fn with_clip<R>(&mut self, draw: impl FnOnce(&mut Buffer) -> R) -> R {
        let buffer = &mut self.frame.buffer;
        buffer.push_scissor(self.area);
        let result = draw(buffer);
        buffer.pop_scissor();
        result
    }
}
