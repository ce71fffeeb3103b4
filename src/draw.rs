//! Drawing primitives on the framebuffer.
//!
//! Everything here is built on [`Framebuffer::set_pixel`], so shapes that
//! run off the panel are clipped pixel by pixel.

use embedded_graphics_core::pixelcolor::Gray4;

use crate::font::Font;
use crate::framebuffer::Framebuffer;
use crate::segment::segments_for;

impl Framebuffer {
    /// Draws a line between two points with integer Bresenham stepping.
    ///
    /// A `thickness` above one stamps a filled `thickness`-sided square at
    /// every step, anchored at its top-left corner, rather than offsetting
    /// the line perpendicularly.
    pub fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        thickness: i32,
        colour: Gray4,
    ) {
        let (mut x1, mut y1, mut x2, mut y2) =
            (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));

        // Horizontal and vertical runs are trimmed to where they can land.
        let margin = i64::from(thickness.max(1));
        let (width, height) = (i64::from(self.width()), i64::from(self.height()));
        if y1 == y2 {
            x1 = x1.clamp(-margin, width);
            x2 = x2.clamp(-margin, width);
        }
        if x1 == x2 {
            y1 = y1.clamp(-margin, height + 1);
            y2 = y2.clamp(-margin, height + 1);
        }

        let dx = (x2 - x1).abs();
        let dy = -(y2 - y1).abs();
        let xadd = if x1 < x2 { 1 } else { -1 };
        let yadd = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x1, y1);

        loop {
            // x and y never leave the endpoints' range, so they fit in i32.
            let (px, py) = (x as i32, y as i32);
            if thickness == 1 {
                self.set_pixel(px, py, colour);
            } else {
                self.draw_square(px, py, thickness, colour, true);
            }
            // Both coordinates only move one way, so once past an edge the
            // rest of the line is off the panel too.
            let gone = (xadd > 0 && x >= width)
                || (xadd < 0 && x < -margin)
                || (yadd > 0 && y > height)
                || (yadd < 0 && y < -margin);
            if gone {
                break;
            }
            if 2 * err >= dy {
                if x == x2 {
                    break;
                }
                err += dy;
                x += xadd;
            }
            if 2 * err <= dx {
                if y == y2 {
                    break;
                }
                err += dx;
                y += yadd;
            }
        }
    }

    /// Draws the rectangle spanning `[x1, x2) × [y1, y2)`.
    ///
    /// `(x1, y1)` is inside the figure, `(x2, y2)` is not. Without `fill`
    /// only the first and last row and column of that range are drawn.
    pub fn draw_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, colour: Gray4, fill: bool) {
        // Only the part that can reach the buffer is walked; edges are still
        // judged against the full extent.
        let columns = x1.max(0)..x2.min(i32::from(self.width()));
        let rows = y1.max(0)..y2.min(i32::from(self.height()) + 1);
        for y in rows {
            for x in columns.clone() {
                let edge = x == x1 || x == x2 - 1 || y == y1 || y == y2 - 1;
                if fill || edge {
                    self.set_pixel(x, y, colour);
                }
            }
        }
    }

    /// Draws a square with `length` pixels per side, top-left at `(x, y)`.
    pub fn draw_square(&mut self, x: i32, y: i32, length: i32, colour: Gray4, fill: bool) {
        self.draw_rect(
            x,
            y,
            x.saturating_add(length),
            y.saturating_add(length),
            colour,
            fill,
        );
    }

    /// Draws one character with its top-left corner at `(x, y)`.
    ///
    /// Only set bits are drawn, so the glyph composites over whatever is
    /// already in the buffer. Characters outside `' '..=127` are skipped.
    pub fn draw_char(&mut self, x: i32, y: i32, font: &Font, c: char, colour: Gray4) {
        let Some(glyph) = font.glyph(c) else {
            return;
        };
        let width = usize::from(font.width);
        for (row, bits) in glyph.chunks_exact(font.row_bytes()).enumerate() {
            for column in 0..width {
                if bits[column / 8] & (0x80 >> (column % 8)) != 0 {
                    self.set_pixel(
                        x.saturating_add(column as i32),
                        y.saturating_add(row as i32),
                        colour,
                    );
                }
            }
        }
    }

    /// Draws `s` left to right, one cell of `font.width` per character.
    ///
    /// There is no wrapping; whatever runs past the right edge is clipped.
    pub fn draw_string(&mut self, x: i32, y: i32, font: &Font, s: &str, colour: Gray4) {
        let mut x = x;
        for c in s.chars() {
            self.draw_char(x, y, font, c, colour);
            x = x.saturating_add(i32::from(font.width));
        }
    }

    /// Draws digit `val` in seven-segment style, `height / 2` wide.
    ///
    /// Values outside `0..=9` draw nothing.
    pub fn draw_7seg_digit(
        &mut self,
        x: i32,
        y: i32,
        height: i32,
        thickness: i32,
        val: i32,
        colour: Gray4,
    ) {
        for segment in segments_for(val) {
            let (x1, y1, x2, y2) = segment.endpoints(x, y, height, thickness);
            self.draw_line(x1, y1, x2, y2, thickness, colour);
        }
    }
}
