#![forbid(unsafe_code)]

//! Shared color utilities and the per-transition palette.
//!
//! A transition always goes from one theme to the other, so every effect
//! derives its colors from the frozen `was_dark` flag alone: `from_*` slots
//! belong to the outgoing theme, `to_*` slots to the incoming one.

use flipfx_render::PackedRgba;

const DARK_BG: PackedRgba = PackedRgba::hex(0x1A1F29);
const LIGHT_BG: PackedRgba = PackedRgba::hex(0xEEF1F5);

/// Colors for one direction of the theme flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPalette {
    /// Outgoing theme background.
    pub from_bg: PackedRgba,
    /// Incoming theme background.
    pub to_bg: PackedRgba,
    /// Main effect accent.
    pub accent: PackedRgba,
    /// Secondary accent.
    pub accent_alt: PackedRgba,
    /// Bright highlight (rain heads, portal core).
    pub glow: PackedRgba,
    /// Particle colors.
    pub sparks: [PackedRgba; 4],
}

impl TransitionPalette {
    /// Palette for a flip away from dark (`was_dark`) or away from light.
    pub const fn for_transition(was_dark: bool) -> Self {
        if was_dark {
            Self {
                from_bg: DARK_BG,
                to_bg: LIGHT_BG,
                accent: PackedRgba::hex(0x39FFB4),
                accent_alt: PackedRgba::hex(0x00AAFF),
                glow: PackedRgba::hex(0xFFE566),
                sparks: [
                    PackedRgba::hex(0xFFE566),
                    PackedRgba::hex(0xFFAA33),
                    PackedRgba::hex(0xFFFFFF),
                    PackedRgba::hex(0x00FFFF),
                ],
            }
        } else {
            Self {
                from_bg: LIGHT_BG,
                to_bg: DARK_BG,
                accent: PackedRgba::hex(0x16A34A),
                accent_alt: PackedRgba::hex(0x7C3AED),
                glow: PackedRgba::hex(0x2563EB),
                sparks: [
                    PackedRgba::hex(0x7C3AED),
                    PackedRgba::hex(0x2563EB),
                    PackedRgba::hex(0x0EA5E9),
                    PackedRgba::hex(0xDC2626),
                ],
            }
        }
    }
}

/// Per-channel linear interpolation, alpha included.
#[inline]
pub fn lerp_color(a: PackedRgba, b: PackedRgba, t: f32) -> PackedRgba {
    a.lerp(b, t)
}

/// Pure red / cyan halves of an RGB split, tinted by `intensity`.
#[inline]
pub fn rgb_split_pair(intensity: f32) -> (PackedRgba, PackedRgba) {
    let a = (intensity.clamp(0.0, 1.0) * 110.0).round() as u8;
    (
        PackedRgba::rgba(255, 0, 64, a),
        PackedRgba::rgba(0, 255, 255, a),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_are_mirrored() {
        let to_light = TransitionPalette::for_transition(true);
        let to_dark = TransitionPalette::for_transition(false);
        assert_eq!(to_light.from_bg, to_dark.to_bg);
        assert_eq!(to_light.to_bg, to_dark.from_bg);
    }

    #[test]
    fn lerp_endpoints() {
        let a = PackedRgba::rgba(0, 0, 0, 0);
        let b = PackedRgba::rgba(200, 100, 50, 255);
        assert_eq!(lerp_color(a, b, 0.0), a);
        assert_eq!(lerp_color(a, b, 1.0), b);
        assert_eq!(lerp_color(a, b, 0.5), PackedRgba::rgba(100, 50, 25, 128));
    }

    #[test]
    fn rgb_split_scales_alpha() {
        let (r, c) = rgb_split_pair(0.0);
        assert_eq!((r.a(), c.a()), (0, 0));
        let (r, _) = rgb_split_pair(1.0);
        assert_eq!(r.a(), 110);
    }
}
