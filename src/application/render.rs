//! Render surface boundary
//!
//! The tree view never draws pixels itself; it emits cells through `RenderSurface`.
//! `TextSurface` records cells and lays them out as plain text lines.

use std::collections::BTreeMap;

use crate::domain::TextAlignment;

/// Approximate width of one character cell, used to map pixel widths to text columns.
pub const CHAR_WIDTH: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Split off a strip of `height` from the top, returning `(top, rest)`.
    pub fn split_top(&self, height: f32) -> (Rect, Rect) {
        let height = height.min(self.height).max(0.0);
        let top = Rect::new(self.x, self.y, self.width, height);
        let rest = Rect::new(self.x, self.y + height, self.width, self.height - height);
        (top, rest)
    }
}

/// Host drawing primitives used by tree views and panels.
pub trait RenderSurface {
    fn header(&mut self, rect: Rect, text: &str, alignment: TextAlignment);

    fn label(&mut self, rect: Rect, text: &str);

    /// Label cell of a row: indented by depth, with the rename affordance when editing.
    fn row_label(&mut self, rect: Rect, text: &str, depth: usize, renaming: bool);

    fn search_field(&mut self, rect: Rect, text: &str);

    fn row_background(&mut self, _rect: Rect, _row: usize, _selected: bool) {}
}

#[derive(Debug, Clone)]
struct Cell {
    x: f32,
    width: f32,
    text: String,
}

#[derive(Debug, Default)]
struct Line {
    marker: Option<char>,
    cells: Vec<Cell>,
}

/// Plain-text surface: every cell lands on the line of its `y` coordinate.
#[derive(Debug, Default)]
pub struct TextSurface {
    lines: BTreeMap<i64, Line>,
    alternating_rows: bool,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alternating_rows(mut self, alternating: bool) -> Self {
        self.alternating_rows = alternating;
        self
    }

    fn line(&mut self, rect: Rect) -> &mut Line {
        self.lines.entry(rect.y.round() as i64).or_default()
    }

    fn push(&mut self, rect: Rect, text: String) {
        self.line(rect).cells.push(Cell {
            x: rect.x,
            width: rect.width,
            text,
        });
    }

    /// Text lines in top-to-bottom order, trailing whitespace trimmed.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .values()
            .map(|line| {
                let mut cells = line.cells.clone();
                cells.sort_by(|a, b| a.x.total_cmp(&b.x));
                let body = cells
                    .iter()
                    .map(|c| fit(&c.text, chars_for(c.width)))
                    .collect::<Vec<_>>()
                    .join(" ");
                let marker = line.marker.unwrap_or(' ');
                format!("{} {}", marker, body).trim_end().to_string()
            })
            .collect()
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

impl RenderSurface for TextSurface {
    fn header(&mut self, rect: Rect, text: &str, alignment: TextAlignment) {
        let width = chars_for(rect.width);
        let len = text.chars().count().min(width);
        let pad = width - len;
        let aligned = match alignment {
            TextAlignment::Left => text.to_string(),
            TextAlignment::Center => format!("{}{}", " ".repeat(pad / 2), text),
            TextAlignment::Right => format!("{}{}", " ".repeat(pad), text),
        };
        self.push(rect, aligned);
    }

    fn label(&mut self, rect: Rect, text: &str) {
        self.push(rect, text.to_string());
    }

    fn row_label(&mut self, rect: Rect, text: &str, depth: usize, renaming: bool) {
        let indent = "  ".repeat(depth);
        let text = if renaming {
            format!("{}[{}]", indent, text)
        } else {
            format!("{}{}", indent, text)
        };
        self.push(rect, text);
    }

    fn search_field(&mut self, rect: Rect, text: &str) {
        self.push(rect, format!("Search: {}", text));
    }

    fn row_background(&mut self, rect: Rect, row: usize, selected: bool) {
        let alternating = self.alternating_rows;
        let line = self.line(rect);
        line.marker = if selected {
            Some('>')
        } else if alternating && row % 2 == 1 {
            Some('.')
        } else {
            None
        };
    }
}

fn chars_for(width: f32) -> usize {
    (width / CHAR_WIDTH).floor().max(1.0) as usize
}

/// Truncate with an ellipsis or pad with spaces to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len > width {
        let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_top() {
        let (top, rest) = Rect::new(0.0, 0.0, 100.0, 50.0).split_top(20.0);
        assert_eq!(top, Rect::new(0.0, 0.0, 100.0, 20.0));
        assert_eq!(rest, Rect::new(0.0, 20.0, 100.0, 30.0));
    }

    #[test]
    fn test_text_surface_orders_cells_by_position() {
        let mut surface = TextSurface::new();
        surface.label(Rect::new(80.0, 16.0, 80.0, 16.0), "right");
        surface.row_label(Rect::new(0.0, 16.0, 80.0, 16.0), "left", 1, false);
        surface.search_field(Rect::new(0.0, 0.0, 160.0, 16.0), "abc");
        surface.row_background(Rect::new(0.0, 16.0, 160.0, 16.0), 0, true);

        let lines = surface.lines();
        assert_eq!(lines[0], "  Search: abc");
        assert_eq!(lines[1], ">   left     right");
    }

    #[test]
    fn test_fit_truncates_long_text() {
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("ab", 4), "ab  ");
    }
}
