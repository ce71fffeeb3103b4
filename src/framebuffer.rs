use alloc::vec;
use alloc::vec::Vec;

use embedded_graphics_core::{
    pixelcolor::Gray4,
    prelude::{DrawTarget, GrayColor, OriginDimensions, Size},
    Pixel,
};

use crate::geometry::{ScanDirection, ScanGeometry};

/// Packed 4-bit grayscale image of the whole panel.
///
/// Two horizontally adjacent pixels share a byte: the even column lives in
/// the high nibble, the odd column in the low nibble. This is exactly the
/// layout the controller expects in its RAM, so [`Framebuffer::data`] can be
/// streamed to the panel as is.
///
/// Drawing only touches memory. Nothing reaches the panel until the owning
/// driver flushes.
pub struct Framebuffer {
    width: u16,
    height: u16,
    geometry: ScanGeometry,
    data: Vec<u8>,
}

impl Framebuffer {
    /// Allocates a zeroed (black) framebuffer.
    ///
    /// Returns `None` if either dimension is zero or odd; every sweep must
    /// pack into whole bytes in both scan families.
    pub fn new(width: u16, height: u16, direction: ScanDirection) -> Option<Self> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return None;
        }
        let len = usize::from(width) * usize::from(height) / 2;
        Some(Self {
            width,
            height,
            geometry: ScanGeometry::new(direction, width, height),
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn geometry(&self) -> &ScanGeometry {
        &self.geometry
    }

    /// Packed pixel bytes, `width * height / 2` of them.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Fills every byte with `colour` in both nibbles.
    pub fn clear(&mut self, colour: Gray4) {
        let luma = colour.luma();
        self.data.fill(luma | (luma << 4));
    }

    /// Sets one pixel, leaving the other nibble of its byte untouched.
    ///
    /// Coordinates outside the panel are ignored. The row bound is checked
    /// with `y > height`, so the row just past the bottom edge is accepted;
    /// its writes are dropped once they index past the end of storage.
    pub fn set_pixel(&mut self, x: i32, y: i32, colour: Gray4) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        let Some(byte) = self.data.get_mut(index) else {
            return;
        };
        let luma = colour.luma();
        *byte = if x % 2 == 0 {
            (luma << 4) | (*byte & 0x0F)
        } else {
            luma | (*byte & 0xF0)
        };
    }

    /// Reads a pixel back with the same mapping as [`Self::set_pixel`].
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Gray4> {
        let byte = *self.data.get(self.index(x, y)?)?;
        let luma = if x % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        Some(Gray4::new(luma))
    }

    // Byte offset of (x, y): x/2 + y * page/2.
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= usize::from(self.width) || y > usize::from(self.height) {
            return None;
        }
        Some(x / 2 + y * usize::from(self.geometry.page() / 2))
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

impl DrawTarget for Framebuffer {
    type Color = Gray4;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, colour) in pixels {
            self.set_pixel(point.x, point.y, colour);
        }
        Ok(())
    }

    fn clear(&mut self, colour: Self::Color) -> Result<(), Self::Error> {
        Framebuffer::clear(self, colour);
        Ok(())
    }
}
