#![forbid(unsafe_code)]

//! The effect protocol: kinds, static descriptors, per-frame context, and the
//! [`TransitionFx`] strategy trait.
//!
//! # Contract
//!
//! - `theme_switch_offset < duration` for every descriptor, so a session
//!   always observes the theme switch before completion.
//! - Effects draw from [`FxContext`] only. The frozen `was_dark` flag is the
//!   only theme information they ever see; live theme state is out of reach.
//! - `render` must tolerate any surface size, including sizes that change
//!   mid-run (after a [`TransitionFx::resize`] call).

use std::fmt;
use std::time::Duration;

use flipfx_core::geometry::Point;
use flipfx_render::FxSurface;

use crate::effects::{BlobMorphFx, GlitchFx, ParticleExplosionFx, PortalWarpFx, RainFx};

// ---------------------------------------------------------------------------
// EffectKind + descriptors
// ---------------------------------------------------------------------------

/// The five transition effects, in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Rain,
    BlobMorph,
    PortalWarp,
    Glitch,
    ParticleExplosion,
}

/// Static timing and labeling for one effect kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectDescriptor {
    pub kind: EffectKind,
    /// Shown to the user as a hint for the next effect.
    pub label: &'static str,
    /// Total wall-clock length of the effect.
    pub duration: Duration,
    /// Elapsed time at which the theme flips.
    pub theme_switch_offset: Duration,
}

static DESCRIPTORS: [EffectDescriptor; 5] = [
    EffectDescriptor {
        kind: EffectKind::Rain,
        label: "Matrix Rain",
        duration: Duration::from_millis(2000),
        theme_switch_offset: Duration::from_millis(1000),
    },
    EffectDescriptor {
        kind: EffectKind::BlobMorph,
        label: "Liquid Morph",
        duration: Duration::from_millis(1500),
        theme_switch_offset: Duration::from_millis(900),
    },
    EffectDescriptor {
        kind: EffectKind::PortalWarp,
        label: "Portal Warp",
        duration: Duration::from_millis(1800),
        theme_switch_offset: Duration::from_millis(900),
    },
    EffectDescriptor {
        kind: EffectKind::Glitch,
        label: "Glitch",
        duration: Duration::from_millis(1200),
        theme_switch_offset: Duration::from_millis(600),
    },
    EffectDescriptor {
        kind: EffectKind::ParticleExplosion,
        label: "Particle Burst",
        duration: Duration::from_millis(1500),
        theme_switch_offset: Duration::from_millis(700),
    },
];

impl EffectKind {
    /// Every kind, in rotation order.
    pub const ALL: [EffectKind; 5] = [
        EffectKind::Rain,
        EffectKind::BlobMorph,
        EffectKind::PortalWarp,
        EffectKind::Glitch,
        EffectKind::ParticleExplosion,
    ];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::Rain => 0,
            Self::BlobMorph => 1,
            Self::PortalWarp => 2,
            Self::Glitch => 3,
            Self::ParticleExplosion => 4,
        }
    }

    /// Static timing for this kind.
    #[inline]
    pub fn descriptor(self) -> &'static EffectDescriptor {
        &DESCRIPTORS[self.index()]
    }

    #[inline]
    pub fn label(self) -> &'static str {
        self.descriptor().label
    }

    #[inline]
    pub fn duration(self) -> Duration {
        self.descriptor().duration
    }

    #[inline]
    pub fn theme_switch_offset(self) -> Duration {
        self.descriptor().theme_switch_offset
    }

    /// Short config token (`rain`, `blob`, `portal`, `glitch`, `explosion`).
    pub const fn token(self) -> &'static str {
        match self {
            Self::Rain => "rain",
            Self::BlobMorph => "blob",
            Self::PortalWarp => "portal",
            Self::Glitch => "glitch",
            Self::ParticleExplosion => "explosion",
        }
    }

    /// Parse a config token. Accepts a few aliases, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rain" | "matrix" | "matrix-rain" => Some(Self::Rain),
            "blob" | "blob-morph" | "liquid" | "morph" => Some(Self::BlobMorph),
            "portal" | "portal-warp" | "warp" => Some(Self::PortalWarp),
            "glitch" | "rgb-split" => Some(Self::Glitch),
            "explosion" | "particles" | "particle-explosion" | "burst" => {
                Some(Self::ParticleExplosion)
            }
            _ => None,
        }
    }

    /// Dispatch table: build the effect for one session.
    pub fn instantiate(self, mount: &EffectMount) -> Box<dyn TransitionFx> {
        match self {
            Self::Rain => Box::new(RainFx::new(mount)),
            Self::BlobMorph => Box::new(BlobMorphFx::new(mount)),
            Self::PortalWarp => Box::new(PortalWarpFx::new(mount)),
            Self::Glitch => Box::new(GlitchFx::new(mount)),
            Self::ParticleExplosion => Box::new(ParticleExplosionFx::new(mount)),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// ---------------------------------------------------------------------------
// EffectSet
// ---------------------------------------------------------------------------

bitflags::bitflags! {
    /// A subset of effect kinds, used to restrict the rotation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EffectSet: u8 {
        const RAIN               = 0b0_0001;
        const BLOB_MORPH         = 0b0_0010;
        const PORTAL_WARP        = 0b0_0100;
        const GLITCH             = 0b0_1000;
        const PARTICLE_EXPLOSION = 0b1_0000;
    }
}

impl EffectSet {
    /// Flag for a single kind.
    pub const fn of(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Rain => Self::RAIN,
            EffectKind::BlobMorph => Self::BLOB_MORPH,
            EffectKind::PortalWarp => Self::PORTAL_WARP,
            EffectKind::Glitch => Self::GLITCH,
            EffectKind::ParticleExplosion => Self::PARTICLE_EXPLOSION,
        }
    }

    /// Member kinds, in rotation order.
    pub fn kinds(self) -> impl Iterator<Item = EffectKind> {
        EffectKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(Self::of(*kind)))
    }

    /// Longest member duration (zero for the empty set).
    pub fn longest_duration(self) -> Duration {
        self.kinds()
            .map(EffectKind::duration)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for EffectSet {
    fn default() -> Self {
        Self::all()
    }
}

// ---------------------------------------------------------------------------
// Events, mount, context
// ---------------------------------------------------------------------------

/// Lifecycle callbacks an effect raises toward the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectEvent {
    /// The theme-switch offset has elapsed; flip the theme now.
    ThemeSwitch,
    /// The effect reached its duration and stopped scheduling frames.
    Complete,
}

/// Frozen per-session inputs handed to an effect at mount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectMount {
    pub kind: EffectKind,
    /// Theme state captured when the session started.
    pub was_dark: bool,
    /// Trigger control center, for effects that radiate from it.
    pub origin: Option<Point>,
    /// Seed for every random draw the effect makes.
    pub seed: u32,
}

impl EffectMount {
    pub fn new(kind: EffectKind, was_dark: bool) -> Self {
        Self {
            kind,
            was_dark,
            origin: None,
            seed: DEFAULT_SEED,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Option<Point>) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

/// Seed used when the host does not pick one.
pub const DEFAULT_SEED: u32 = 0x5EED_F11F;

/// Per-frame render context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxContext {
    /// Time since the effect was mounted.
    pub elapsed: Duration,
    /// `elapsed / duration`, clamped to [0, 1].
    pub progress: f32,
    /// Time since the previous delivered frame.
    pub dt: Duration,
    /// Delivered-frame counter, starting at 0.
    pub frame: u64,
    /// Frozen theme snapshot.
    pub was_dark: bool,
    pub origin: Option<Point>,
}

impl FxContext {
    /// `dt` in seconds, capped so a stalled host does not teleport particles.
    #[inline]
    pub fn dt_secs(&self) -> f32 {
        self.dt.as_secs_f32().min(MAX_STEP_SECS)
    }

    /// The origin point, or the surface center when the trigger gave none.
    #[inline]
    pub fn anchor(&self, width: u16, height: u16) -> Point {
        self.origin
            .unwrap_or_else(|| Point::new(f32::from(width) / 2.0, f32::from(height) / 2.0))
    }
}

/// Largest integration step, in seconds.
pub const MAX_STEP_SECS: f32 = 0.1;

// ---------------------------------------------------------------------------
// TransitionFx
// ---------------------------------------------------------------------------

/// One visual transition effect.
///
/// Implementations allocate their per-session batches in `new` or `resize`
/// and must not grow them per frame.
pub trait TransitionFx {
    /// Which kind this is.
    fn kind(&self) -> EffectKind;

    /// Surface size became known or changed.
    fn resize(&mut self, _width: u16, _height: u16) {}

    /// Draw one frame. The surface arrives cleared.
    fn render(&mut self, ctx: &FxContext, surface: &mut FxSurface);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_offset_precedes_duration() {
        for kind in EffectKind::ALL {
            let d = kind.descriptor();
            assert_eq!(d.kind, kind);
            assert!(d.theme_switch_offset > Duration::ZERO);
            assert!(
                d.theme_switch_offset < d.duration,
                "{kind}: offset must precede duration"
            );
        }
    }

    #[test]
    fn explosion_timing() {
        let d = EffectKind::ParticleExplosion.descriptor();
        assert_eq!(d.duration, Duration::from_millis(1500));
        assert_eq!(d.theme_switch_offset, Duration::from_millis(700));
    }

    #[test]
    fn tokens_round_trip_through_parse() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::parse(kind.token()), Some(kind));
        }
        assert_eq!(EffectKind::parse(" Portal-Warp "), Some(EffectKind::PortalWarp));
        assert_eq!(EffectKind::parse("fireworks"), None);
    }

    #[test]
    fn effect_set_iterates_in_rotation_order() {
        let set = EffectSet::PARTICLE_EXPLOSION | EffectSet::RAIN;
        let kinds: Vec<_> = set.kinds().collect();
        assert_eq!(kinds, vec![EffectKind::Rain, EffectKind::ParticleExplosion]);
        assert_eq!(EffectSet::default().kinds().count(), 5);
    }

    #[test]
    fn longest_duration() {
        assert_eq!(
            EffectSet::all().longest_duration(),
            Duration::from_millis(2000)
        );
        assert_eq!(
            EffectSet::GLITCH.longest_duration(),
            Duration::from_millis(1200)
        );
        assert_eq!(EffectSet::empty().longest_duration(), Duration::ZERO);
    }

    #[test]
    fn dispatch_builds_matching_kind() {
        for kind in EffectKind::ALL {
            let fx = kind.instantiate(&EffectMount::new(kind, true));
            assert_eq!(fx.kind(), kind);
        }
    }

    #[test]
    fn anchor_falls_back_to_center() {
        let ctx = FxContext {
            elapsed: Duration::ZERO,
            progress: 0.0,
            dt: Duration::from_secs(5),
            frame: 0,
            was_dark: false,
            origin: None,
        };
        assert_eq!(ctx.anchor(10, 4), Point::new(5.0, 2.0));
        assert_eq!(ctx.dt_secs(), MAX_STEP_SECS);
    }
}
