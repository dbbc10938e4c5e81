#![forbid(unsafe_code)]

//! Time-based progress primitives for transition effects.
//!
//! Everything here maps elapsed time or a normalized progress value `t`
//! onto `f32` outputs in `[0.0, 1.0]`. Nothing allocates, and nothing
//! depends on frame counts: callers feed elapsed wall-clock time, so an
//! effect looks the same at 30 Hz and 144 Hz.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Curves
// ---------------------------------------------------------------------------

/// A progress curve: `[0, 1] -> [0, 1]`, clamping its input.
pub type EasingFn = fn(f32) -> f32;

#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Accelerating from rest (`t²`).
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Decelerating to rest.
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let u = 1.0 - t.clamp(0.0, 1.0);
    1.0 - u * u
}

/// `ease_in` for the first half, `ease_out` for the second.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        ease_in(t * 2.0) / 2.0
    } else {
        0.5 + ease_out(t * 2.0 - 1.0) / 2.0
    }
}

/// Hermite smoothstep between `edge0` and `edge1`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Local progress of `t` inside the window `[start, end)`, clamped to [0, 1].
///
/// Used to partition one overall progress value into sequential phases.
#[inline]
pub fn segment(t: f32, start: f32, end: f32) -> f32 {
    if end <= start {
        return if t >= end { 1.0 } else { 0.0 };
    }
    ((t - start) / (end - start)).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Ramp-up / peak / fade-out intensity curve keyed to overall progress.
///
/// `rise` and `fall` are fractions of the total progress range. The output
/// ramps from 0 to 1 over `[0, rise)`, holds at 1, then ramps back to 0 over
/// `[1 - fall, 1]`. Ramps use smoothstep so the edges have no visible kink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    rise: f32,
    fall: f32,
}

impl Envelope {
    /// Create an envelope. Overlapping ramps are scaled down to fit.
    pub fn new(rise: f32, fall: f32) -> Self {
        let rise = if rise.is_finite() { rise.max(0.0) } else { 0.0 };
        let fall = if fall.is_finite() { fall.max(0.0) } else { 0.0 };
        let total = rise + fall;
        if total > 1.0 {
            Self {
                rise: rise / total,
                fall: fall / total,
            }
        } else {
            Self { rise, fall }
        }
    }

    /// Fraction of progress spent ramping up.
    pub fn rise(&self) -> f32 {
        self.rise
    }

    /// Fraction of progress spent fading out.
    pub fn fall(&self) -> f32 {
        self.fall
    }

    /// Intensity at progress `t`, in [0, 1].
    pub fn at(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let up = if self.rise > 0.0 {
            smoothstep(0.0, self.rise, t)
        } else {
            1.0
        };
        let down = if self.fall > 0.0 {
            1.0 - smoothstep(1.0 - self.fall, 1.0, t)
        } else {
            1.0
        };
        up.min(down)
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// A fixed-length run with one cue point, positioned by absolute elapsed time.
///
/// The host never ticks it; each frame seeks it to `now - start`. Elapsed
/// time is kept as a [`Duration`], so there is no float drift and the cue and
/// end checks are exact to the nanosecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    elapsed: Duration,
    duration: Duration,
    cue: Duration,
}

impl Timeline {
    /// A timeline of `duration` with a cue at `cue` (clamped into the run).
    ///
    /// A zero duration is bumped to 1 ns so progress stays well defined.
    pub fn new(duration: Duration, cue: Duration) -> Self {
        let duration = duration.max(Duration::from_nanos(1));
        Self {
            elapsed: Duration::ZERO,
            duration,
            cue: cue.min(duration),
        }
    }

    /// Jump to an absolute elapsed time. Going backwards is allowed.
    pub fn seek(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Elapsed time at the last seek (may exceed the duration).
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// `elapsed / duration`, clamped to [0, 1].
    pub fn progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }

    pub fn cue_reached(&self) -> bool {
        self.elapsed >= self.cue
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}
