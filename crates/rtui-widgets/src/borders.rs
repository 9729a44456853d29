#![forbid(unsafe_code)]

//! Border synthesis from view geometry.
//!
//! Every screen cell not covered by a view is border space. To pick the
//! glyph for a border cell we look at its 3x3 neighborhood in a marker grid
//! one cell larger than the screen on every side, and take the first
//! [`Template`] whose mask accepts it. The outer ring of the grid counts as
//! view space, so the screen edge closes borders the way a view would.
//!
//! Each template pins all four orthogonal neighbors, and no two templates
//! pin them the same way, so at most one template matches any
//! neighborhood. Cells no template accepts get [`FALLBACK`].

use rtui_core::geometry::{Rect, Size};
use rtui_render::buffer::Buffer;
use rtui_render::cell::PackedRgba;
use rtui_render::drawing::Draw;
use rtui_render::style::Style;

/// Glyph for border cells no template accepts.
pub const FALLBACK: char = '*';

/// Style of border glyphs and title brackets.
pub const BORDER_STYLE: Style = Style::new().fg(PackedRgba::WHITE);

/// Style of the focused view's title.
pub const FOCUSED_TITLE_STYLE: Style = Style::new()
    .fg(PackedRgba::BLACK)
    .bg(PackedRgba::WHITE)
    .bold();

/// Classification of one marker grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Inside a view, or outside the screen.
    View,
    /// Border space between views.
    Border,
}

/// One entry of a template mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mask {
    View,
    Border,
    Any,
}

impl Mask {
    fn accepts(self, marker: Marker) -> bool {
        match self {
            Mask::Any => true,
            Mask::View => marker == Marker::View,
            Mask::Border => marker == Marker::Border,
        }
    }
}

/// A 3x3 neighborhood indexed `[row][column]`, the center at `[1][1]`.
pub type Neighborhood = [[Marker; 3]; 3];

/// A glyph and the neighborhoods it is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub glyph: char,
    /// Indexed `[row][column]` like [`Neighborhood`].
    pub mask: [[Mask; 3]; 3],
}

impl Template {
    pub fn matches(&self, area: &Neighborhood) -> bool {
        self.mask
            .iter()
            .zip(area)
            .all(|(mask_row, area_row)| {
                mask_row
                    .iter()
                    .zip(area_row)
                    .all(|(mask, marker)| mask.accepts(*marker))
            })
    }
}

const A: Mask = Mask::Any;
const V: Mask = Mask::View;
const B: Mask = Mask::Border;

/// Border templates in priority order.
pub const TEMPLATES: [Template; 11] = [
    Template { glyph: '║', mask: [[A, B, A], [V, B, V], [A, B, A]] },
    Template { glyph: '═', mask: [[A, V, A], [B, B, B], [A, V, A]] },
    Template { glyph: '╔', mask: [[V, V, V], [V, B, B], [V, B, V]] },
    Template { glyph: '╗', mask: [[V, V, V], [B, B, V], [V, B, V]] },
    Template { glyph: '╝', mask: [[V, B, V], [B, B, V], [V, V, V]] },
    Template { glyph: '╚', mask: [[V, B, V], [V, B, B], [V, V, V]] },
    Template { glyph: '╦', mask: [[V, V, V], [B, B, B], [V, B, V]] },
    Template { glyph: '╩', mask: [[V, B, V], [B, B, B], [V, V, V]] },
    Template { glyph: '╣', mask: [[V, B, V], [B, B, V], [V, B, V]] },
    Template { glyph: '╠', mask: [[V, B, V], [V, B, B], [V, B, V]] },
    Template { glyph: '╬', mask: [[V, B, V], [B, B, B], [V, B, V]] },
];

/// The glyph for a border cell with neighborhood `area`.
pub fn glyph_for(area: &Neighborhood) -> char {
    TEMPLATES
        .iter()
        .find(|template| template.matches(area))
        .map_or(FALLBACK, |template| template.glyph)
}

/// Screen-sized marker grid padded by one cell on every side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerGrid {
    screen: Size,
    // (width + 2) * (height + 2), row-major.
    cells: Vec<Marker>,
}

impl MarkerGrid {
    /// A grid where every screen cell is border space.
    pub fn new(screen: Size) -> Self {
        let padded_w = usize::from(screen.width) + 2;
        let padded_h = usize::from(screen.height) + 2;
        let mut cells = vec![Marker::Border; padded_w * padded_h];
        for py in 0..padded_h {
            for px in 0..padded_w {
                if px == 0 || py == 0 || px == padded_w - 1 || py == padded_h - 1 {
                    cells[py * padded_w + px] = Marker::View;
                }
            }
        }
        Self { screen, cells }
    }

    fn padded_width(&self) -> usize {
        usize::from(self.screen.width) + 2
    }

    /// Mark the part of `rect` that lies on screen as view space.
    pub fn mark_view(&mut self, rect: Rect) {
        let rect = rect.intersection(&self.screen.to_rect());
        let padded_w = self.padded_width();
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.cells[(usize::from(y) + 1) * padded_w + usize::from(x) + 1] = Marker::View;
            }
        }
    }

    /// Marker of screen cell `(x, y)`; off-screen cells are view space.
    pub fn marker(&self, x: i32, y: i32) -> Marker {
        let (Ok(px), Ok(py)) = (usize::try_from(x + 1), usize::try_from(y + 1)) else {
            return Marker::View;
        };
        if px >= self.padded_width() || py >= usize::from(self.screen.height) + 2 {
            return Marker::View;
        }
        self.cells[py * self.padded_width() + px]
    }

    /// Neighborhood of screen cell `(x, y)`.
    pub fn neighborhood(&self, x: u16, y: u16) -> Neighborhood {
        let (x, y) = (i32::from(x), i32::from(y));
        let mut area = [[Marker::View; 3]; 3];
        for (dy, row) in area.iter_mut().enumerate() {
            for (dx, marker) in row.iter_mut().enumerate() {
                // dx, dy are 0..3.
                *marker = self.marker(x + dx as i32 - 1, y + dy as i32 - 1);
            }
        }
        area
    }

    /// Screen cells that are border space, with their glyphs.
    pub fn glyphs(&self) -> impl Iterator<Item = (u16, u16, char)> + '_ {
        (0..self.screen.height).flat_map(move |y| {
            (0..self.screen.width).filter_map(move |x| {
                (self.marker(i32::from(x), i32::from(y)) == Marker::Border)
                    .then(|| (x, y, glyph_for(&self.neighborhood(x, y))))
            })
        })
    }
}

/// Draw the borders around `views` on the whole buffer.
pub fn draw_borders(buffer: &mut Buffer, views: impl IntoIterator<Item = Rect>) {
    let mut grid = MarkerGrid::new(Size::new(buffer.width(), buffer.height()));
    for rect in views {
        grid.mark_view(rect);
    }
    for (x, y, glyph) in grid.glyphs() {
        buffer.put_char(x, y, glyph, BORDER_STYLE);
    }
}

/// Write `name` into the border row above `rect` as `╡name╞`.
///
/// The name is cut to fit between the view's left and right edges. Views on
/// the top screen row have no border above them and get no title.
pub fn draw_title(buffer: &mut Buffer, rect: Rect, name: &str, focused: bool) {
    let Some(y) = rect.y.checked_sub(1) else {
        return;
    };
    let max = usize::from(rect.width.saturating_sub(2));
    let name: String = name.chars().take(max).collect();
    let name_style = if focused {
        FOCUSED_TITLE_STYLE
    } else {
        BORDER_STYLE
    };

    buffer.put_char(rect.x, y, '╡', BORDER_STYLE);
    let end = buffer.print_text(rect.x.saturating_add(1), y, &name, name_style);
    buffer.put_char(end, y, '╞', BORDER_STYLE);
}
