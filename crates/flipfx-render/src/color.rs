#![forbid(unsafe_code)]

//! Packed straight-alpha RGBA color.
//!
//! Effects composite many translucent layers per cell per frame (veils,
//! trails, glows), so colors stay packed in a `u32` and blending is integer
//! math rounded once per channel.

/// `0xRRGGBBAA`, straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::hex(0x000000);
    pub const WHITE: Self = Self::hex(0xFFFFFF);

    /// Opaque color from `0xRRGGBB`.
    #[inline]
    pub const fn hex(rgb: u32) -> Self {
        Self(((rgb & 0x00FF_FFFF) << 8) | 0xFF)
    }

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    #[inline]
    pub const fn g(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0.to_be_bytes()[3]
    }

    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a() == 0
    }

    /// Composite `self` over `dst` (Porter-Duff source-over).
    pub fn over(self, dst: Self) -> Self {
        match self.a() {
            0xFF => return self,
            0 => return dst,
            _ => {}
        }
        // Weights in the 255^2 domain: source contributes a_s * 255, the
        // destination a_d * (255 - a_s). Their sum is the output alpha * 255.
        let w_src = u32::from(self.a()) * 255;
        let w_dst = u32::from(dst.a()) * (255 - u32::from(self.a()));
        let w_out = w_src + w_dst;
        if w_out == 0 {
            return Self::TRANSPARENT;
        }
        let channel = |s: u8, d: u8| -> u8 {
            let num = u32::from(s) * w_src + u32::from(d) * w_dst;
            ((num + w_out / 2) / w_out).min(255) as u8
        };
        Self::rgba(
            channel(self.r(), dst.r()),
            channel(self.g(), dst.g()),
            channel(self.b(), dst.b()),
            ((w_out + 127) / 255).min(255) as u8,
        )
    }

    /// Scale alpha by `opacity`, clamped to [0, 1]. NaN is treated as 0.
    #[inline]
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        self.with_alpha((f32::from(self.a()) * opacity).round() as u8)
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | a as u32)
    }

    /// Per-channel linear interpolation toward `other`, alpha included.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |x: u8, y: u8| -> u8 {
            (f32::from(x) + (f32::from(y) - f32::from(x)) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Self::rgba(
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
            mix(self.a(), other.a()),
        )
    }
}
