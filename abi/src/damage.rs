/// A rectangular region in buffer-local coordinates (inclusive bounds).
///
/// Used to describe the part of a frame that changed relative to the
/// previous one, so an encoder can store only that sub-image.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32, // inclusive
    pub y1: i32, // inclusive
}

impl DamageRect {
    /// Create an invalid (empty) damage rect
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: -1,
            y1: -1,
        }
    }

    /// Rect covering a whole `width` x `height` buffer.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width as i32 - 1,
            y1: height as i32 - 1,
        }
    }

    /// Check if this rect is valid (non-empty)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x0 <= self.x1 && self.y0 <= self.y1
    }

    #[inline]
    pub fn width(&self) -> i32 {
        if self.is_valid() { self.x1 - self.x0 + 1 } else { 0 }
    }

    #[inline]
    pub fn height(&self) -> i32 {
        if self.is_valid() { self.y1 - self.y0 + 1 } else { 0 }
    }

    /// Calculate the area of this rect
    #[inline]
    pub fn area(&self) -> i32 {
        self.width() * self.height()
    }

    /// Compute the union (bounding box) of two rects
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        if !self.is_valid() {
            return *other;
        }
        if !other.is_valid() {
            return *self;
        }
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow the rect so it covers `(x, y)`.
    #[inline]
    pub fn include_point(&mut self, x: i32, y: i32) {
        if !self.is_valid() {
            *self = Self {
                x0: x,
                y0: y,
                x1: x,
                y1: y,
            };
            return;
        }
        self.x0 = self.x0.min(x);
        self.y0 = self.y0.min(y);
        self.x1 = self.x1.max(x);
        self.y1 = self.y1.max(y);
    }

    /// Clip this rect to buffer bounds
    #[inline]
    pub fn clip(&self, width: i32, height: i32) -> Self {
        Self {
            x0: self.x0.max(0),
            y0: self.y0.max(0),
            x1: self.x1.min(width - 1),
            y1: self.y1.min(height - 1),
        }
    }

    /// Check if this rect intersects with another
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x0 <= other.x1 && self.x1 >= other.x0 && self.y0 <= other.y1 && self.y1 >= other.y0
    }
}
