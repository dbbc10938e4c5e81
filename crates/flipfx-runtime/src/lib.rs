#![forbid(unsafe_code)]

//! Orchestration for animated theme flips.
//!
//! # Role
//! `flipfx-runtime` owns the session: it gates the trigger control, picks the
//! next effect from a round-robin rotation, mounts it on the host scheduler,
//! debounces the theme mutation, and arms a watchdog so input always unlocks.
//!
//! # Primary responsibilities
//! - **ThemeToggle**: activation, callbacks, watchdog, forced teardown.
//! - **ThemeStore / ReducedMotion**: the external collaborators it consumes.
//! - **ToggleConfig**: env-var configuration with per-field diagnostics.
//! - **TransitionSimulator**: deterministic harness for tests.

pub mod config;
pub mod motion;
pub mod session;
pub mod simulator;
pub mod theme_store;
pub mod theme_toggle;

pub use config::{ToggleConfig, ToggleConfigError, ToggleConfigParse};
pub use motion::{MotionQuery, ReducedMotion};
pub use session::AnimationSession;
pub use simulator::{SimEvent, TransitionSimulator};
pub use theme_store::{MemoryThemeStore, ThemeStore};
pub use theme_toggle::{Activation, ThemeToggle};
