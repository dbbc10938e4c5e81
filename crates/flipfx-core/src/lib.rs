#![forbid(unsafe_code)]

//! Core: easing curves, progress envelopes, geometry, host scheduling, and logging.

pub mod animation;
pub mod geometry;
pub mod logging;
pub mod scheduler;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
