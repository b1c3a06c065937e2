use wheelspin_abi::damage::DamageRect;
use wheelspin_abi::draw::{Canvas, Color32, EncodedPixel};

/// An owned, 8-bit indexed pixel buffer that implements [`Canvas`].
///
/// Every byte is a palette index. The buffer never stores RGB, so whatever
/// is drawn into it can only use colors from the palette it is later
/// expanded or encoded with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    pitch: usize,
}

impl DrawBuffer {
    /// Allocate a zero-filled (palette index 0) buffer.
    ///
    /// Returns `None` for empty dimensions or ones that do not fit a GIF
    /// logical screen.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 || width > u16::MAX as u32 || height > u16::MAX as u32 {
            return None;
        }
        let pitch = width as usize;
        Some(Self {
            data: vec![0; pitch * height as usize],
            width,
            height,
            pitch,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bounding box of every pixel that differs from `previous`.
    ///
    /// `None` when the buffers are identical. Buffers of different
    /// dimensions differ everywhere.
    pub fn diff_bounds(&self, previous: &DrawBuffer) -> Option<DamageRect> {
        if self.width != previous.width || self.height != previous.height {
            return Some(DamageRect::full(self.width, self.height));
        }

        let mut damage = DamageRect::invalid();
        for (y, (row, prev_row)) in self
            .data
            .chunks_exact(self.pitch)
            .zip(previous.data.chunks_exact(previous.pitch))
            .enumerate()
        {
            let Some(first) = row.iter().zip(prev_row).position(|(a, b)| a != b) else {
                continue;
            };
            let last = row
                .iter()
                .zip(prev_row)
                .rposition(|(a, b)| a != b)
                .unwrap_or(first);
            damage.include_point(first as i32, y as i32);
            damage.include_point(last as i32, y as i32);
        }

        if damage.is_valid() { Some(damage) } else { None }
    }

    /// Copy out the indices inside `rect` (row-major, tightly packed).
    pub fn crop(&self, rect: &DamageRect) -> Vec<u8> {
        let rect = rect.clip(self.width as i32, self.height as i32);
        if !rect.is_valid() {
            return Vec::new();
        }
        let (x0, x1) = (rect.x0 as usize, rect.x1 as usize);
        let mut out = Vec::with_capacity(rect.area() as usize);
        for y in rect.y0 as usize..=rect.y1 as usize {
            let row = y * self.pitch;
            out.extend_from_slice(&self.data[row + x0..=row + x1]);
        }
        out
    }

    /// Expand to tightly packed RGBA8 using `palette`.
    ///
    /// Indices past the end of the palette expand to opaque black.
    pub fn to_rgba(&self, palette: &[Color32]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * 4);
        for &idx in &self.data {
            let color = palette.get(idx as usize).copied().unwrap_or(Color32::BLACK);
            out.extend_from_slice(&[color.red(), color.green(), color.blue(), 0xFF]);
        }
        out
    }

    /// Histogram of palette indices in use.
    pub fn index_histogram(&self) -> [usize; 256] {
        let mut hist = [0usize; 256];
        for &idx in &self.data {
            hist[idx as usize] += 1;
        }
        hist
    }
}

impl Canvas for DrawBuffer {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pitch_bytes(&self) -> usize {
        self.pitch
    }

    #[inline]
    fn bytes_per_pixel(&self) -> u8 {
        1
    }

    #[inline]
    fn write_encoded_at(&mut self, byte_offset: usize, pixel: EncodedPixel) {
        if let Some(slot) = self.data.get_mut(byte_offset) {
            *slot = pixel.index();
        }
    }

    #[inline]
    fn read_encoded_at(&self, byte_offset: usize) -> EncodedPixel {
        EncodedPixel::from_index(self.data.get(byte_offset).copied().unwrap_or(0))
    }

    #[inline]
    fn fill_row_span(&mut self, row: i32, x0: i32, x1: i32, pixel: EncodedPixel) {
        let Some((row, x0, x1)) = self.clip_row_span(row, x0, x1) else {
            return;
        };
        let start = row * self.pitch + x0;
        let end = row * self.pitch + x1 + 1;
        self.data[start..end].fill(pixel.index());
    }

    #[inline]
    fn clear_canvas(&mut self, pixel: EncodedPixel) {
        self.data.fill(pixel.index());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: EncodedPixel = EncodedPixel::from_index(5);

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(DrawBuffer::new(0, 10).is_none());
        assert!(DrawBuffer::new(10, 0).is_none());
        assert!(DrawBuffer::new(70_000, 1).is_none());
        assert!(DrawBuffer::new(3, 2).is_some());
    }

    #[test]
    fn identical_buffers_have_no_diff() {
        let a = DrawBuffer::new(8, 8).unwrap();
        let b = a.clone();
        assert_eq!(a.diff_bounds(&b), None);
    }

    #[test]
    fn diff_bounds_covers_changed_pixels() {
        let prev = DrawBuffer::new(10, 10).unwrap();
        let mut cur = prev.clone();
        cur.put_pixel(2, 3, INK);
        cur.put_pixel(7, 5, INK);
        assert_eq!(
            cur.diff_bounds(&prev),
            Some(DamageRect { x0: 2, y0: 3, x1: 7, y1: 5 })
        );
    }

    #[test]
    fn crop_is_row_major() {
        let mut buf = DrawBuffer::new(4, 4).unwrap();
        buf.put_pixel(1, 1, INK);
        buf.put_pixel(2, 2, INK);
        let cropped = buf.crop(&DamageRect { x0: 1, y0: 1, x1: 2, y1: 2 });
        assert_eq!(cropped, vec![5, 0, 0, 5]);
    }

    #[test]
    fn rgba_expansion_uses_palette() {
        let mut buf = DrawBuffer::new(2, 1).unwrap();
        buf.put_pixel(1, 0, EncodedPixel::from_index(1));
        let palette = [Color32::rgb(1, 2, 3), Color32::rgb(9, 8, 7)];
        assert_eq!(buf.to_rgba(&palette), vec![1, 2, 3, 255, 9, 8, 7, 255]);
    }

    #[test]
    fn clear_resets_every_pixel() {
        let mut buf = DrawBuffer::new(5, 5).unwrap();
        buf.put_pixel(4, 4, INK);
        buf.clear_canvas(EncodedPixel::from_index(2));
        assert_eq!(buf.index_histogram()[2], 25);
    }
}
