#![forbid(unsafe_code)]

//! The reduced-motion accessibility signal, read once per activation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Source of the user's reduced-motion preference.
pub trait ReducedMotion {
    fn prefers_reduced_motion(&self) -> bool;
}

impl ReducedMotion for bool {
    fn prefers_reduced_motion(&self) -> bool {
        *self
    }
}

/// Shared flag a host can flip from elsewhere (e.g. a settings watcher).
impl ReducedMotion for Arc<AtomicBool> {
    fn prefers_reduced_motion(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Adapts a query closure, e.g. one that asks the platform each time.
#[derive(Clone, Copy)]
pub struct MotionQuery<F>(pub F);

impl<F: Fn() -> bool> ReducedMotion for MotionQuery<F> {
    fn prefers_reduced_motion(&self) -> bool {
        (self.0)()
    }
}

impl<F> std::fmt::Debug for MotionQuery<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MotionQuery(..)")
    }
}
