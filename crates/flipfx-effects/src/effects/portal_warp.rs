#![forbid(unsafe_code)]

//! Portal warp: the view spins into a vortex, the theme flips while it is
//! collapsed, and the new view spins back out.
//!
//! Three phases partition the run by progress thresholds alone:
//!
//! | Phase | Progress | View | Geometry |
//! |-------|----------|------|----------|
//! | sucking | `[0, 0.5)` | spins up, shrinks, blurs | ring collapses inward |
//! | expanding | `[0.5, 0.8)` | unwinds, overshoots scale, sharpens | new-theme disc and ring grow out |
//! | settling | `[0.8, 1]` | scale relaxes to 1 | ring and glow fade |
//!
//! The whole-view transform is published through [`FxSurface::set_view`]
//! with the anchor as pivot; the host applies it to the UI underneath.

use flipfx_core::animation::{ease_in, ease_in_out, ease_out, lerp, segment};
use flipfx_core::geometry::Point;
use flipfx_render::{FxSurface, ViewTransform};

use crate::palette::TransitionPalette;
use crate::protocol::{EffectKind, EffectMount, FxContext, TransitionFx};

const SUCK_END: f32 = 0.5;
const EXPAND_END: f32 = 0.8;
const MAX_BLUR: f32 = 8.0;
const SPIN_DEG: f32 = 540.0;
const OVERSHOOT: f32 = 1.1;
const SPIRAL_DOTS: usize = 24;

/// Which part of the warp a progress value falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalPhase {
    Sucking,
    Expanding,
    Settling,
}

impl PortalPhase {
    pub fn at(progress: f32) -> Self {
        if progress < SUCK_END {
            Self::Sucking
        } else if progress < EXPAND_END {
            Self::Expanding
        } else {
            Self::Settling
        }
    }
}

/// Every animated quantity of the warp at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalState {
    pub phase: PortalPhase,
    /// Accumulated spin, degrees.
    pub rotation_deg: f32,
    pub scale: f32,
    pub blur: f32,
    /// Ring radius as a fraction of the covering radius.
    pub ring: f32,
    /// Core glow strength in [0, 1].
    pub glow: f32,
}

impl PortalState {
    /// Evaluate the phase curves at `progress`.
    pub fn at(progress: f32) -> Self {
        let p = progress.clamp(0.0, 1.0);
        let phase = PortalPhase::at(p);
        match phase {
            PortalPhase::Sucking => {
                let s = ease_in(segment(p, 0.0, SUCK_END));
                Self {
                    phase,
                    rotation_deg: SPIN_DEG * s,
                    scale: 1.0 - 0.9 * s,
                    blur: MAX_BLUR * s,
                    ring: lerp(1.0, 0.04, s),
                    glow: s,
                }
            }
            PortalPhase::Expanding => {
                let e = ease_out(segment(p, SUCK_END, EXPAND_END));
                Self {
                    phase,
                    rotation_deg: SPIN_DEG + 180.0 * e,
                    scale: lerp(0.1, OVERSHOOT, e),
                    blur: MAX_BLUR * (1.0 - e),
                    ring: lerp(0.04, 1.0, e),
                    glow: 1.0 - 0.5 * e,
                }
            }
            PortalPhase::Settling => {
                let s = ease_in_out(segment(p, EXPAND_END, 1.0));
                Self {
                    phase,
                    rotation_deg: SPIN_DEG + 180.0,
                    // Written so s == 1 lands exactly on 1.0.
                    scale: 1.0 + (OVERSHOOT - 1.0) * (1.0 - s),
                    blur: 0.0,
                    ring: lerp(1.0, 1.2, s),
                    glow: 0.5 * (1.0 - s),
                }
            }
        }
    }

    /// View transform pivoting on `pivot`.
    pub fn view(&self, pivot: Point) -> ViewTransform {
        ViewTransform {
            scale: self.scale,
            rotation_deg: self.rotation_deg.rem_euclid(360.0),
            blur: self.blur,
            offset_x: 0.0,
            offset_y: 0.0,
            pivot: Some(pivot),
        }
    }
}

/// Portal-warp transition.
#[derive(Debug, Clone)]
pub struct PortalWarpFx {
    palette: TransitionPalette,
    last_state: Option<PortalState>,
}

impl PortalWarpFx {
    pub fn new(mount: &EffectMount) -> Self {
        Self {
            palette: TransitionPalette::for_transition(mount.was_dark),
            last_state: None,
        }
    }

    /// State used for the last rendered frame.
    pub fn last_state(&self) -> Option<PortalState> {
        self.last_state
    }
}

impl TransitionFx for PortalWarpFx {
    fn kind(&self) -> EffectKind {
        EffectKind::PortalWarp
    }

    fn render(&mut self, ctx: &FxContext, surface: &mut FxSurface) {
        let state = PortalState::at(ctx.progress);
        self.last_state = Some(state);

        let (w, h) = (surface.width(), surface.height());
        let anchor = ctx.anchor(w, h);
        let reach = anchor.farthest_corner_distance(w, h) + 1.0;
        let ring_radius = (state.ring * reach).max(0.5);

        surface.set_view(state.view(anchor));
        surface.fill_rect(
            0,
            0,
            i32::from(w),
            i32::from(h),
            self.palette.accent_alt.with_opacity(0.3 * state.glow),
        );

        let reveal = match state.phase {
            PortalPhase::Sucking => 0.0,
            PortalPhase::Expanding => 1.0,
            PortalPhase::Settling => 1.0 - segment(ctx.progress, EXPAND_END, 1.0),
        };
        surface.fill_disc(anchor, ring_radius, self.palette.to_bg.with_opacity(reveal));

        let ring_alpha = match state.phase {
            PortalPhase::Settling => state.glow * 2.0,
            _ => 1.0,
        };
        for (i, frac) in [1.0_f32, 0.66, 0.33].into_iter().enumerate() {
            let color = if i % 2 == 0 {
                self.palette.accent
            } else {
                self.palette.accent_alt
            };
            surface.stroke_ring(
                anchor,
                ring_radius * frac,
                1.5,
                color.with_opacity(ring_alpha * (1.0 - 0.25 * i as f32)),
            );
        }

        surface.fill_glow(
            anchor,
            (reach * 0.25).max(2.0),
            self.palette.glow.with_opacity(state.glow),
        );

        let spin = state.rotation_deg.to_radians();
        for k in 0..SPIRAL_DOTS {
            let along = (k + 1) as f32 / SPIRAL_DOTS as f32;
            let angle = spin + k as f32 * 0.6;
            let r = along * ring_radius;
            surface.put_glyph(
                (anchor.x + angle.cos() * r).floor() as i32,
                (anchor.y + angle.sin() * r * 0.5).floor() as i32,
                '•',
                self.palette.accent_alt.with_opacity(ring_alpha * (1.0 - along * 0.5)),
            );
        }
    }
}
