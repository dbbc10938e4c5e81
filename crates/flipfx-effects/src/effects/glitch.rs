#![forbid(unsafe_code)]

//! Glitch / RGB-split transition.
//!
//! Nothing persists between frames: every frame draws a fresh random set of
//! horizontal slice bands (red and cyan halves displaced in opposite
//! directions), a few solid flash blocks, and a small jitter of the whole
//! view. The draw count and displacement scale with a ramp-up-then-fade
//! intensity envelope. A short full-view flash straddles the midpoint so the
//! theme flip lands behind it.
//!
//! The per-frame RNG is seeded from the session seed and the frame number,
//! so a given frame always looks the same no matter what came before it.

use flipfx_core::animation::Envelope;
use flipfx_render::{FxSurface, PackedRgba, ViewTransform};

use crate::palette::{TransitionPalette, rgb_split_pair};
use crate::protocol::{EffectKind, EffectMount, FxContext, TransitionFx};
use crate::rng::{FxRng, mix_seed};

const MAX_SLICES: f32 = 7.0;
const MAX_BLOCKS: f32 = 4.0;
/// Horizontal slice displacement at full intensity, as a share of the width.
const MAX_SHIFT: f32 = 0.15;
const MAX_JITTER_X: f32 = 1.5;
const MAX_JITTER_Y: f32 = 0.5;
/// Half-width of the midpoint flash, in progress units.
const FLASH_HALF_WIDTH: f32 = 0.05;

/// Glitch transition.
#[derive(Debug, Clone)]
pub struct GlitchFx {
    palette: TransitionPalette,
    envelope: Envelope,
    seed: u32,
}

impl GlitchFx {
    pub fn new(mount: &EffectMount) -> Self {
        Self {
            palette: TransitionPalette::for_transition(mount.was_dark),
            envelope: Envelope::new(0.2, 0.35),
            seed: mount.seed,
        }
    }

    /// Intensity at `progress`.
    pub fn intensity(&self, progress: f32) -> f32 {
        self.envelope.at(progress)
    }
}

impl TransitionFx for GlitchFx {
    fn kind(&self) -> EffectKind {
        EffectKind::Glitch
    }

    fn render(&mut self, ctx: &FxContext, surface: &mut FxSurface) {
        let intensity = self.intensity(ctx.progress);
        if intensity <= 0.0 {
            return;
        }
        let mut rng = FxRng::new(mix_seed(self.seed, ctx.frame));
        let w = i32::from(surface.width());
        let h = surface.height();

        let flash = 1.0 - ((ctx.progress - 0.5).abs() / FLASH_HALF_WIDTH).min(1.0);
        if flash > 0.0 {
            surface.fill_rect(0, 0, w, i32::from(h), self.palette.to_bg.with_opacity(flash));
        }

        let (red, cyan) = rgb_split_pair(intensity);
        let slices = 1 + (intensity * MAX_SLICES) as u32;
        for _ in 0..slices {
            let y = rng.below(u32::from(h)) as i32;
            let band = 1 + rng.below(2) as i32;
            let shift = (rng.signed_unit() * intensity * MAX_SHIFT * w as f32).round() as i32;
            surface.fill_rect(shift, y, w, band, red);
            surface.fill_rect(-shift, y, w, band, cyan);
        }

        let blocks = rng.below(1 + (intensity * MAX_BLOCKS) as u32);
        let colors: [PackedRgba; 3] = [self.palette.accent, self.palette.to_bg, self.palette.glow];
        for _ in 0..blocks {
            let bw = 2 + rng.below(7) as i32;
            let bh = 1 + rng.below(3) as i32;
            let x = rng.below(u32::from(surface.width())) as i32;
            let y = rng.below(u32::from(h)) as i32;
            let color = rng.pick(&colors).unwrap_or(self.palette.accent);
            surface.fill_rect(x, y, bw, bh, color.with_opacity(0.7 * intensity));
        }

        surface.set_view(ViewTransform {
            offset_x: rng.signed_unit() * MAX_JITTER_X * intensity,
            offset_y: rng.signed_unit() * MAX_JITTER_Y * intensity,
            ..ViewTransform::IDENTITY
        });
    }
}
