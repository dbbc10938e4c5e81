#![forbid(unsafe_code)]

pub mod blob_morph;
pub mod explosion;
pub mod glitch;
pub mod portal_warp;
pub mod rain;

pub use blob_morph::BlobMorphFx;
pub use explosion::ParticleExplosionFx;
pub use glitch::GlitchFx;
pub use portal_warp::PortalWarpFx;
pub use rain::{RainFx, TrailCell};
