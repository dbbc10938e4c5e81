#![forbid(unsafe_code)]

//! Geometric primitives.

/// The trigger control's bounds, in surface cells (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Zero-area bounds carry no usable center.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Midpoint in continuous cell space; a 1x1 rect centers on `(x + 0.5, y + 0.5)`.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            f32::from(self.x) + f32::from(self.width) * 0.5,
            f32::from(self.y) + f32::from(self.height) * 0.5,
        )
    }
}

/// A point in continuous cell space.
///
/// Effects do their math in `f32` and only snap to cells when drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance to the farthest corner of a `width x height` area.
    ///
    /// A circle of this radius around the point covers the whole area.
    pub fn farthest_corner_distance(self, width: u16, height: u16) -> f32 {
        let w = f32::from(width);
        let h = f32::from(height);
        [
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(0.0, h),
            Point::new(w, h),
        ]
        .into_iter()
        .map(|corner| self.distance(corner))
        .fold(0.0, f32::max)
    }
}
