/// Fixed-cell bitmap font.
///
/// `table` holds the glyphs for `' '..=127` back to back, in ASCII order.
/// Each glyph is `height` rows, and each row is `width` bits packed MSB
/// first and padded to a whole byte. This is the layout of the common
/// Waveshare/ST font tables, which can be dropped in unchanged.
#[derive(Clone, Copy, Debug)]
pub struct Font {
    pub width: u16,
    pub height: u16,
    pub table: &'static [u8],
}

impl Font {
    pub const fn new(width: u16, height: u16, table: &'static [u8]) -> Self {
        Self {
            width,
            height,
            table,
        }
    }

    /// Bytes per glyph row.
    pub const fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Bitmap of `c`, or `None` if it is not printable ASCII, the font has
    /// an empty cell or the table is too short to contain it.
    pub fn glyph(&self, c: char) -> Option<&'static [u8]> {
        if self.row_bytes() == 0 || self.height == 0 {
            return None;
        }
        let start = glyph_offset(self.width, self.height, c)?;
        let len = usize::from(self.height) * self.row_bytes();
        self.table.get(start..start + len)
    }
}

/// Offset of `c` into a font table: `(c - ' ') * height * ceil(width / 8)`.
pub fn glyph_offset(width: u16, height: u16, c: char) -> Option<usize> {
    if !(' '..='\u{7f}').contains(&c) {
        return None;
    }
    let index = c as usize - ' ' as usize;
    Some(index * usize::from(height) * usize::from(width).div_ceil(8))
}
