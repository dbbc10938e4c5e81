#![forbid(unsafe_code)]

//! Full-viewport drawing surface for transition effects.
//!
//! An [`FxSurface`] is a row-major grid of [`FxCell`]s laid over the host UI,
//! plus a [`ViewTransform`] the host applies to the UI underneath (scale,
//! rotation, blur, jitter). Effects own the surface exclusively while they
//! run and clear it at the start of every frame.
//!
//! All drawing entry points take signed or continuous coordinates and clip
//! silently: off-surface work is a no-op, never a panic.

use crate::color::PackedRgba;
use flipfx_core::geometry::Point;
use smallvec::SmallVec;
use unicode_width::UnicodeWidthChar;

/// One surface cell: an optional glyph over a background tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FxCell {
    /// Glyph to draw, or `'\0'` for none.
    pub glyph: char,
    /// Glyph color.
    pub fg: PackedRgba,
    /// Background tint composited over the host UI.
    pub bg: PackedRgba,
}

impl FxCell {
    /// A cell that draws nothing.
    pub const EMPTY: Self = Self {
        glyph: '\0',
        fg: PackedRgba::TRANSPARENT,
        bg: PackedRgba::TRANSPARENT,
    };

    /// Whether the cell carries a glyph.
    #[inline]
    pub const fn has_glyph(&self) -> bool {
        self.glyph != '\0'
    }
}

impl Default for FxCell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Whole-view transform requested from the host for the current frame.
///
/// Rotation and scale pivot around `pivot` (cell space); `None` means the
/// view center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Uniform scale factor (1.0 = unchanged).
    pub scale: f32,
    /// Rotation in degrees, clockwise.
    pub rotation_deg: f32,
    /// Blur radius in cells.
    pub blur: f32,
    /// Horizontal translation in cells.
    pub offset_x: f32,
    /// Vertical translation in cells.
    pub offset_y: f32,
    /// Pivot for scale and rotation.
    pub pivot: Option<Point>,
}

impl ViewTransform {
    /// No transform.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        rotation_deg: 0.0,
        blur: 0.0,
        offset_x: 0.0,
        offset_y: 0.0,
        pivot: None,
    };

    /// Whether applying this transform would change nothing.
    pub fn is_identity(&self) -> bool {
        (self.scale - 1.0).abs() < f32::EPSILON
            && self.rotation_deg.abs() < f32::EPSILON
            && self.blur.abs() < f32::EPSILON
            && self.offset_x.abs() < f32::EPSILON
            && self.offset_y.abs() < f32::EPSILON
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Row-major cell grid plus the view transform for one frame.
#[derive(Debug, Clone)]
pub struct FxSurface {
    width: u16,
    height: u16,
    /// Grow-only backing store; only the first `width * height` cells are live.
    cells: Vec<FxCell>,
    view: ViewTransform,
}

impl FxSurface {
    /// Create a cleared surface.
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![FxCell::EMPTY; len],
            view: ViewTransform::IDENTITY,
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True while the surface has no drawable area (size not established).
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Change dimensions. The backing store only grows; contents are cleared.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let len = self.len();
        if self.cells.len() < len {
            self.cells.resize(len, FxCell::EMPTY);
        }
        self.clear();
    }

    /// Clear every cell and reset the view transform.
    pub fn clear(&mut self) {
        let len = self.len();
        self.cells[..len].fill(FxCell::EMPTY);
        self.view = ViewTransform::IDENTITY;
    }

    /// Live cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[FxCell] {
        &self.cells[..self.len()]
    }

    /// Cell at `(x, y)`, if on-surface.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&FxCell> {
        if x < self.width && y < self.height {
            self.cells.get(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Current view transform.
    #[inline]
    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// Replace the view transform for this frame.
    #[inline]
    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    /// Number of cells with a visible tint or glyph.
    pub fn painted_cells(&self) -> usize {
        self.cells()
            .iter()
            .filter(|c| c.bg.a() > 0 || (c.has_glyph() && c.fg.a() > 0))
            .count()
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Composite `color` over the background of cell `(x, y)`.
    #[inline]
    pub fn blend_bg(&mut self, x: i32, y: i32, color: PackedRgba) {
        if color.is_transparent() {
            return;
        }
        if let Some(idx) = self.index(x, y) {
            let cell = &mut self.cells[idx];
            cell.bg = color.over(cell.bg);
        }
    }

    /// Stamp a glyph at `(x, y)`.
    ///
    /// Zero-width glyphs are ignored. Wide glyphs claim the next cell as a
    /// blank continuation so the host never overdraws half a character.
    pub fn put_glyph(&mut self, x: i32, y: i32, glyph: char, color: PackedRgba) {
        if color.is_transparent() {
            return;
        }
        let width = glyph.width().unwrap_or(0);
        if width == 0 {
            return;
        }
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if width > 1 && self.index(x + 1, y).is_none() {
            return;
        }
        let cell = &mut self.cells[idx];
        cell.glyph = glyph;
        cell.fg = color;
        if width > 1 {
            let next = &mut self.cells[idx + 1];
            next.glyph = ' ';
            next.fg = color;
        }
    }

    /// Composite a solid rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: PackedRgba) {
        if color.is_transparent() || width <= 0 || height <= 0 {
            return;
        }
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(width).min(i32::from(self.width));
        let y1 = y.saturating_add(height).min(i32::from(self.height));
        for yy in y0..y1 {
            for xx in x0..x1 {
                self.blend_bg(xx, yy, color);
            }
        }
    }

    /// Composite a filled disc with a one-cell soft edge.
    pub fn fill_disc(&mut self, center: Point, radius: f32, color: PackedRgba) {
        if radius <= 0.0 || !radius.is_finite() || color.is_transparent() {
            return;
        }
        self.for_cells_near(center, radius + 1.0, |surface, x, y, dist| {
            let coverage = (radius + 0.5 - dist).clamp(0.0, 1.0);
            if coverage > 0.0 {
                surface.blend_bg(x, y, color.with_opacity(coverage));
            }
        });
    }

    /// Composite a ring of the given thickness with soft inner and outer edges.
    pub fn stroke_ring(&mut self, center: Point, radius: f32, thickness: f32, color: PackedRgba) {
        if radius <= 0.0 || thickness <= 0.0 || !radius.is_finite() || color.is_transparent() {
            return;
        }
        let half = thickness / 2.0;
        self.for_cells_near(center, radius + half + 1.0, |surface, x, y, dist| {
            let coverage = (half + 0.5 - (dist - radius).abs()).clamp(0.0, 1.0);
            if coverage > 0.0 {
                surface.blend_bg(x, y, color.with_opacity(coverage));
            }
        });
    }

    /// Radial glow: opacity falls off quadratically from `center` to `radius`.
    pub fn fill_glow(&mut self, center: Point, radius: f32, color: PackedRgba) {
        if radius <= 0.0 || !radius.is_finite() || color.is_transparent() {
            return;
        }
        self.for_cells_near(center, radius, |surface, x, y, dist| {
            let falloff = 1.0 - (dist / radius).clamp(0.0, 1.0);
            if falloff > 0.0 {
                surface.blend_bg(x, y, color.with_opacity(falloff * falloff));
            }
        });
    }

    /// Fill a closed polygon (even-odd rule), sampling at cell centers.
    pub fn fill_polygon(&mut self, points: &[Point], color: PackedRgba) {
        if points.len() < 3 || color.is_transparent() || self.is_empty() {
            return;
        }
        let (min_y, max_y) = points
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        if !min_y.is_finite() || !max_y.is_finite() {
            return;
        }
        let row_start = (min_y.floor() as i32).max(0);
        let row_end = (max_y.ceil() as i32).min(i32::from(self.height));

        let mut crossings: SmallVec<[f32; 16]> = SmallVec::new();
        for row in row_start..row_end {
            let yc = row as f32 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y > yc) != (b.y > yc) {
                    crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for span in crossings.chunks_exact(2) {
                let x0 = ((span[0] - 0.5).ceil() as i32).max(0);
                let x1 = ((span[1] - 0.5).ceil() as i32).min(i32::from(self.width));
                for x in x0..x1 {
                    self.blend_bg(x, row, color);
                }
            }
        }
    }

    /// Visit every on-surface cell whose center lies within `reach` of `center`.
    fn for_cells_near<F>(&mut self, center: Point, reach: f32, mut visit: F)
    where
        F: FnMut(&mut Self, i32, i32, f32),
    {
        if self.is_empty() || !center.x.is_finite() || !center.y.is_finite() {
            return;
        }
        let x0 = ((center.x - reach).floor() as i32).max(0);
        let x1 = ((center.x + reach).ceil() as i32).min(i32::from(self.width));
        let y0 = ((center.y - reach).floor() as i32).max(0);
        let y1 = ((center.y + reach).ceil() as i32).min(i32::from(self.height));
        for y in y0..y1 {
            for x in x0..x1 {
                let dist = Point::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                if dist <= reach {
                    visit(self, x, y, dist);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: PackedRgba = PackedRgba::rgb(255, 0, 0);

    #[test]
    fn new_surface_is_clear() {
        let s = FxSurface::new(4, 3);
        assert_eq!(s.len(), 12);
        assert_eq!(s.painted_cells(), 0);
        assert!(s.view().is_identity());
    }

    #[test]
    fn zero_sized_surface_ignores_drawing() {
        let mut s = FxSurface::new(0, 0);
        assert!(s.is_empty());
        s.fill_rect(0, 0, 5, 5, RED);
        s.fill_disc(Point::new(1.0, 1.0), 3.0, RED);
        s.fill_polygon(
            &[
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(2.0, 2.0),
            ],
            RED,
        );
        assert_eq!(s.painted_cells(), 0);
    }

    #[test]
    fn fill_rect_clips() {
        let mut s = FxSurface::new(4, 4);
        s.fill_rect(-2, -2, 4, 4, RED);
        assert_eq!(s.painted_cells(), 4);
        assert_eq!(s.get(1, 1).map(|c| c.bg), Some(RED));
        assert_eq!(s.get(2, 2).map(|c| c.bg), Some(PackedRgba::TRANSPARENT));
    }

    #[test]
    fn clear_resets_cells_and_view() {
        let mut s = FxSurface::new(3, 3);
        s.fill_rect(0, 0, 3, 3, RED);
        s.set_view(ViewTransform {
            scale: 0.5,
            ..ViewTransform::IDENTITY
        });
        s.clear();
        assert_eq!(s.painted_cells(), 0);
        assert!(s.view().is_identity());
    }

    #[test]
    fn resize_grows_and_clears() {
        let mut s = FxSurface::new(2, 2);
        s.fill_rect(0, 0, 2, 2, RED);
        s.resize(5, 3);
        assert_eq!(s.cells().len(), 15);
        assert_eq!(s.painted_cells(), 0);
        s.resize(1, 1);
        assert_eq!(s.cells().len(), 1);
    }

    #[test]
    fn polygon_square_fills_interior() {
        let mut s = FxSurface::new(10, 10);
        let square = [
            Point::new(2.0, 2.0),
            Point::new(6.0, 2.0),
            Point::new(6.0, 6.0),
            Point::new(2.0, 6.0),
        ];
        s.fill_polygon(&square, RED);
        assert_eq!(s.painted_cells(), 16);
        assert_eq!(s.get(2, 2).map(|c| c.bg), Some(RED));
        assert_eq!(s.get(6, 6).map(|c| c.bg), Some(PackedRgba::TRANSPARENT));
    }

    #[test]
    fn disc_covers_center_not_corners() {
        let mut s = FxSurface::new(11, 11);
        s.fill_disc(Point::new(5.5, 5.5), 3.0, RED);
        assert_eq!(s.get(5, 5).map(|c| c.bg), Some(RED));
        assert_eq!(s.get(0, 0).map(|c| c.bg), Some(PackedRgba::TRANSPARENT));
    }

    #[test]
    fn ring_leaves_center_empty() {
        let mut s = FxSurface::new(21, 21);
        s.stroke_ring(Point::new(10.5, 10.5), 7.0, 1.0, RED);
        assert_eq!(s.get(10, 10).map(|c| c.bg.a()), Some(0));
        assert!(s.get(17, 10).is_some_and(|c| c.bg.a() > 0));
    }

    #[test]
    fn glyph_stamps_and_clips() {
        let mut s = FxSurface::new(3, 1);
        s.put_glyph(1, 0, 'a', RED);
        s.put_glyph(-1, 0, 'b', RED);
        s.put_glyph(0, 0, '\u{0301}', RED);
        assert_eq!(s.get(1, 0).map(|c| c.glyph), Some('a'));
        assert_eq!(s.get(0, 0).map(|c| c.glyph), Some('\0'));
    }

    #[test]
    fn wide_glyph_claims_continuation() {
        let mut s = FxSurface::new(3, 1);
        s.put_glyph(0, 0, '日', RED);
        assert_eq!(s.get(1, 0).map(|c| c.glyph), Some(' '));
        // No room for the second half at the right edge.
        s.put_glyph(2, 0, '日', RED);
        assert_eq!(s.get(2, 0).map(|c| c.glyph), Some('\0'));
    }
}
