/// Canonical color representation: 0xAARRGGBB.
///
/// Palette entries are stored as `Color32`; drawing code never writes a
/// `Color32` to a surface directly. It resolves the color to an
/// [`EncodedPixel`] (a palette index) first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Color32(pub u32);

impl Color32 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0x00000000);
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF000000);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFFFFFF);

    /// Construct from individual RGBA components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Construct an opaque color from RGB.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    /// Extract the alpha component.
    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
    /// Extract the red component.
    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }
    /// Extract the green component.
    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }
    /// Extract the blue component.
    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Get the raw u32 value (0xAARRGGBB).
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// `[r, g, b]` byte triple, the layout GIF color tables expect.
    #[inline]
    pub const fn to_rgb_bytes(self) -> [u8; 3] {
        [self.red(), self.green(), self.blue()]
    }

    /// Squared euclidean distance in RGB space (alpha ignored).
    #[inline]
    pub const fn distance_sq(self, other: Self) -> u32 {
        let dr = self.red() as i32 - other.red() as i32;
        let dg = self.green() as i32 - other.green() as i32;
        let db = self.blue() as i32 - other.blue() as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Perceived brightness (ITU-R BT.601 weights), 0..=255.
    #[inline]
    pub const fn luma(self) -> u8 {
        ((self.red() as u32 * 299 + self.green() as u32 * 587 + self.blue() as u32 * 114) / 1000)
            as u8
    }
}

/// A color value already encoded for the target surface.
///
/// Surfaces in this workspace are 8-bit indexed, so the encoded value is a
/// palette index. Write it directly to pixel memory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EncodedPixel(pub u32);

impl EncodedPixel {
    /// Encode a palette index.
    #[inline]
    pub const fn from_index(index: u8) -> Self {
        Self(index as u32)
    }

    /// The palette index this pixel refers to.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0 as u8
    }

    /// Get the raw u32 value for writing to a pixel buffer.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

#[inline]
fn clip_row_span_bounds(
    width: u32,
    height: u32,
    row: i32,
    x0: i32,
    x1: i32,
) -> Option<(usize, usize, usize)> {
    if row < 0 || row >= height as i32 {
        return None;
    }
    let w = width as i32;
    let x0 = x0.max(0);
    let x1 = x1.min(w - 1);
    if x0 > x1 {
        return None;
    }
    Some((row as usize, x0 as usize, x1 as usize))
}

/// Drawing surface trait.
///
/// Implementors provide the low-level byte primitives; higher-level drawing
/// operations are default methods built on top of them. The `gfx` crate's
/// rasterizers are generic over `Canvas` so they can draw into any surface
/// (the owned `DrawBuffer`, or a recording surface in tests).
///
/// Colors are passed as `EncodedPixel` values that were resolved against the
/// surface's palette beforehand.
pub trait Canvas {
    /// Buffer width in pixels.
    fn width(&self) -> u32;

    /// Buffer height in pixels.
    fn height(&self) -> u32;

    /// Row stride in bytes.
    fn pitch_bytes(&self) -> usize;

    /// Bytes per pixel (1 for indexed surfaces).
    fn bytes_per_pixel(&self) -> u8;

    /// Write a single pre-encoded pixel at the given byte offset.
    ///
    /// Callers must ensure `byte_offset` is within buffer bounds.
    fn write_encoded_at(&mut self, byte_offset: usize, pixel: EncodedPixel);

    /// Read back the pre-encoded pixel at the given byte offset.
    fn read_encoded_at(&self, byte_offset: usize) -> EncodedPixel;

    #[inline]
    fn clip_row_span(&self, row: i32, x0: i32, x1: i32) -> Option<(usize, usize, usize)> {
        clip_row_span_bounds(self.width(), self.height(), row, x0, x1)
    }

    /// Fill a horizontal span with a pre-encoded pixel.
    ///
    /// Fills pixels from column `x0` to `x1` (inclusive) on `row`.
    /// Out-of-bounds coordinates are clipped.
    #[inline]
    fn fill_row_span(&mut self, row: i32, x0: i32, x1: i32, pixel: EncodedPixel) {
        let Some((row, x0, x1)) = self.clip_row_span(row, x0, x1) else {
            return;
        };
        let bpp = self.bytes_per_pixel() as usize;
        let pitch = self.pitch_bytes();
        let row_start = row * pitch;
        for x in x0..=x1 {
            self.write_encoded_at(row_start + x * bpp, pixel);
        }
    }

    /// Clear the entire buffer to a single encoded pixel value.
    #[inline]
    fn clear_canvas(&mut self, pixel: EncodedPixel) {
        let h = self.height() as i32;
        let w = self.width() as i32;
        for row in 0..h {
            self.fill_row_span(row, 0, w - 1, pixel);
        }
    }

    // -- convenience defaults built on the above primitives --

    /// Draw a single pixel (pre-encoded). Out-of-bounds silently ignored.
    #[inline]
    fn put_pixel(&mut self, x: i32, y: i32, pixel: EncodedPixel) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let off =
            (y as usize) * self.pitch_bytes() + (x as usize) * self.bytes_per_pixel() as usize;
        self.write_encoded_at(off, pixel);
    }

    /// Read a single pixel. `None` outside the surface.
    #[inline]
    fn get_pixel(&self, x: i32, y: i32) -> Option<EncodedPixel> {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return None;
        }
        let off =
            (y as usize) * self.pitch_bytes() + (x as usize) * self.bytes_per_pixel() as usize;
        Some(self.read_encoded_at(off))
    }

    /// Draw a horizontal line from `x0` to `x1` (inclusive).
    #[inline]
    fn hline(&mut self, x0: i32, x1: i32, y: i32, pixel: EncodedPixel) {
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        self.fill_row_span(y, x0, x1, pixel);
    }

    /// Draw a vertical line from `y0` to `y1` (inclusive).
    #[inline]
    fn vline(&mut self, x: i32, y0: i32, y1: i32, pixel: EncodedPixel) {
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        for y in y0..=y1 {
            self.put_pixel(x, y, pixel);
        }
    }

    /// Fill a rectangle with a solid encoded pixel value.
    #[inline]
    fn fill_rect_encoded(&mut self, x: i32, y: i32, w: i32, h: i32, pixel: EncodedPixel) {
        if w <= 0 || h <= 0 {
            return;
        }
        let buf_w = self.width() as i32;
        let buf_h = self.height() as i32;
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w - 1).min(buf_w - 1);
        let y1 = (y + h - 1).min(buf_h - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }
        for row in y0..=y1 {
            self.fill_row_span(row, x0, x1, pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_components_round_trip() {
        let c = Color32::rgb(0x12, 0x34, 0x56);
        assert_eq!(c.alpha(), 0xFF);
        assert_eq!(c.red(), 0x12);
        assert_eq!(c.green(), 0x34);
        assert_eq!(c.blue(), 0x56);
        assert_eq!(c.to_rgb_bytes(), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn distance_ignores_alpha() {
        let a = Color32::new(10, 20, 30, 0);
        let b = Color32::new(10, 20, 30, 0xFF);
        assert_eq!(a.distance_sq(b), 0);
        assert_eq!(Color32::BLACK.distance_sq(Color32::WHITE), 3 * 255 * 255);
    }

    #[test]
    fn luma_orders_black_below_white() {
        assert_eq!(Color32::BLACK.luma(), 0);
        assert_eq!(Color32::WHITE.luma(), 255);
    }

    #[test]
    fn clip_rejects_out_of_bounds_rows() {
        assert_eq!(clip_row_span_bounds(10, 10, -1, 0, 5), None);
        assert_eq!(clip_row_span_bounds(10, 10, 10, 0, 5), None);
        assert_eq!(clip_row_span_bounds(10, 10, 3, -4, 20), Some((3, 0, 9)));
        assert_eq!(clip_row_span_bounds(10, 10, 3, 12, 20), None);
    }
}
