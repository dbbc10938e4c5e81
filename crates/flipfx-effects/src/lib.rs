#![forbid(unsafe_code)]

//! Theme-transition effects.
//!
//! Five interchangeable effects share one protocol ([`TransitionFx`]) and one
//! lifecycle runner ([`EffectPlayer`]):
//!
//! | Kind | Style |
//! |------|-------|
//! | [`EffectKind::Rain`] | falling-glyph columns with fading trails |
//! | [`EffectKind::BlobMorph`] | wobbling liquid blob grows from the trigger |
//! | [`EffectKind::PortalWarp`] | the view is sucked into a vortex and re-emerges |
//! | [`EffectKind::Glitch`] | RGB-split slices, flash blocks, jitter |
//! | [`EffectKind::ParticleExplosion`] | radial burst with gravity and damping |
//!
//! The player owns timing: it measures elapsed time from its own mount
//! instant, emits [`EffectEvent::ThemeSwitch`] once at the effect's offset and
//! [`EffectEvent::Complete`] once at its duration. Effects only draw.

pub mod effects;
pub mod palette;
pub mod particle;
pub mod player;
pub mod protocol;
pub mod rng;

pub use player::{EffectPlayer, FrameEvents};
pub use protocol::{
    EffectDescriptor, EffectEvent, EffectKind, EffectMount, EffectSet, FxContext, TransitionFx,
};
