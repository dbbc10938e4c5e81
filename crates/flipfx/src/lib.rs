#![forbid(unsafe_code)]

//! flipfx public facade crate.
//!
//! Re-exports the types a host needs to wire an animated theme toggle: the
//! orchestrator and its collaborators, the effect catalogue, and the drawing
//! surface the effects paint into.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use flipfx_core::geometry::{Point, Rect};
pub use flipfx_core::scheduler::{
    Clock, FrameHandle, FrameScheduler, ManualClock, ManualScheduler, SystemClock, TimerHandle,
    TimerScheduler,
};

// --- Render re-exports -----------------------------------------------------

pub use flipfx_render::{FxCell, FxSurface, PackedRgba, ViewTransform};

// --- Effect re-exports -----------------------------------------------------

pub use flipfx_effects::{
    EffectDescriptor, EffectEvent, EffectKind, EffectMount, EffectPlayer, EffectSet, FrameEvents,
    TransitionFx,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use flipfx_runtime::{
    Activation, MemoryThemeStore, MotionQuery, ReducedMotion, SimEvent, ThemeStore, ThemeToggle,
    ToggleConfig, ToggleConfigError, TransitionSimulator,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for flipfx hosts.
#[derive(Debug)]
pub enum Error {
    /// One or more configuration values were rejected.
    #[cfg(feature = "runtime")]
    Config(Vec<ToggleConfigError>),
    /// The host could not supply a drawing surface of the given size.
    Surface { width: u16, height: u16 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "runtime")]
            Self::Config(errors) => {
                write!(f, "invalid flipfx config: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
            Self::Surface { width, height } => {
                write!(f, "unusable surface size {width}x{height}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(feature = "runtime")]
impl From<ToggleConfigError> for Error {
    fn from(err: ToggleConfigError) -> Self {
        Self::Config(vec![err])
    }
}

/// Standard result type for flipfx APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Read the environment configuration, rejecting it if any value was bad.
///
/// [`ToggleConfig::from_env`] is the lenient variant that falls back to
/// defaults field by field.
#[cfg(feature = "runtime")]
pub fn config_from_env() -> Result<ToggleConfig> {
    let parsed = ToggleConfig::from_env_with_diagnostics();
    if parsed.errors.is_empty() {
        Ok(parsed.config)
    } else {
        Err(Error::Config(parsed.errors))
    }
}

/// Allocate a surface for the host's viewport. Zero-area sizes are rejected.
pub fn surface(width: u16, height: u16) -> Result<FxSurface> {
    if width == 0 || height == 0 {
        return Err(Error::Surface { width, height });
    }
    Ok(FxSurface::new(width, height))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Clock, EffectKind, EffectSet, Error, FrameScheduler, FxSurface, ManualScheduler,
        PackedRgba, Point, Rect, Result, SystemClock, TimerScheduler, ViewTransform,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        Activation, MemoryThemeStore, MotionQuery, ReducedMotion, ThemeStore, ThemeToggle,
        ToggleConfig, TransitionSimulator,
    };

    pub use crate::{core, effects, render};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use flipfx_core as core;
pub use flipfx_effects as effects;
pub use flipfx_render as render;
#[cfg(feature = "runtime")]
pub use flipfx_runtime as runtime;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_area_surface_is_an_error() {
        assert!(matches!(
            surface(0, 10),
            Err(Error::Surface {
                width: 0,
                height: 10
            })
        ));
        let ok = surface(4, 2).expect("non-empty surface");
        assert_eq!(ok.cells().len(), 8);
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn config_error_lists_every_field() {
        let err = Error::Config(vec![
            ToggleConfigError {
                field: "seed",
                value: "x".into(),
                message: "expected u32".into(),
            },
            ToggleConfigError {
                field: "watchdog_ms",
                value: "1".into(),
                message: "too short".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "invalid flipfx config: seed=x (expected u32); watchdog_ms=1 (too short)"
        );
    }
}
