//! Seven-segment digit layout.
//!
//! ```text
//!      1
//!    2   3
//!      4
//!    5   7
//!      6
//! ```

/// One bar of a seven-segment digit, numbered as in the diagram above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Segment {
    Top = 1,
    UpperLeft = 2,
    UpperRight = 3,
    Middle = 4,
    LowerLeft = 5,
    Bottom = 6,
    LowerRight = 7,
}

use Segment::*;

const DIGITS: [&[Segment]; 10] = [
    &[Top, UpperLeft, UpperRight, LowerLeft, Bottom, LowerRight],
    &[UpperRight, LowerRight],
    &[Top, UpperRight, Middle, LowerLeft, Bottom],
    &[Top, UpperRight, Middle, Bottom, LowerRight],
    &[UpperLeft, UpperRight, Middle, LowerRight],
    &[Top, UpperLeft, Middle, Bottom, LowerRight],
    &[Top, UpperLeft, Middle, LowerLeft, Bottom, LowerRight],
    &[Top, UpperRight, LowerRight],
    &[Top, UpperLeft, UpperRight, Middle, LowerLeft, Bottom, LowerRight],
    &[Top, UpperLeft, UpperRight, Middle, Bottom, LowerRight],
];

/// Segments lit for `val`; empty outside `0..=9`.
pub fn segments_for(val: i32) -> &'static [Segment] {
    usize::try_from(val)
        .ok()
        .and_then(|i| DIGITS.get(i))
        .copied()
        .unwrap_or(&[])
}

impl Segment {
    /// Line endpoints `(x1, y1, x2, y2)` of this segment for a digit whose
    /// top-left corner is `(x, y)`.
    ///
    /// The digit is `height / 2` wide. Bars are shortened by `thickness` at
    /// both ends so that neighbouring bars don't overlap.
    pub fn endpoints(self, x: i32, y: i32, height: i32, thickness: i32) -> (i32, i32, i32, i32) {
        let w = height / 2;
        let h2 = height / 2;
        let t = thickness;
        match self {
            Top => (x + t, y, x + w - t, y),
            UpperLeft => (x, y + t, x, y + h2 - t),
            UpperRight => (x + w, y + t, x + w, y + h2 - t),
            Middle => (x + t, y + h2, x + w - t, y + h2),
            LowerLeft => (x, y + h2 + t, x, y + height - t),
            Bottom => (x + t, y + height, x + w - t, y + height),
            LowerRight => (x + w, y + h2 + t, x + w, y + height - t),
        }
    }
}
