#![forbid(unsafe_code)]

//! Logging support.
//!
//! Re-exports tracing macros when the `tracing` feature is enabled.
//! When the feature is disabled, no-op macros with the same names are
//! exported so call sites compile unchanged.
//!
//! [`frame_span`] wraps one effect frame; with the feature off it is a
//! zero-sized guard.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

/// Span covering one rendered effect frame.
#[cfg(feature = "tracing")]
#[inline]
pub fn frame_span(effect: &'static str, frame: u64) -> tracing::Span {
    tracing::trace_span!("flipfx.frame", effect, frame)
}

/// Span covering one rendered effect frame (disabled).
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn frame_span(_effect: &'static str, _frame: u64) -> NoopSpan {
    NoopSpan
}

/// Stand-in for `tracing::Span` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}
