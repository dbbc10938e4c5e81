#![forbid(unsafe_code)]

//! Host scheduling primitives: per-frame callbacks, one-shot timers, clocks.
//!
//! Effects never sleep or block. They register for the next rendered frame
//! through a [`FrameScheduler`] and get called back with a timestamp; the
//! orchestrator's watchdog is a one-shot [`TimerScheduler`] timeout that is
//! independent of the frame loop. Real hosts adapt their platform primitives
//! (a compositor vsync, a terminal tick, `requestAnimationFrame`) to these
//! traits; [`ManualScheduler`] is the deterministic in-process host.
//!
//! Timestamps are [`Duration`]s since an arbitrary host epoch. Only
//! differences between timestamps are meaningful.

use std::time::Duration;

/// Handle for one outstanding next-frame registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Handle for one pending one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Callback-per-rendered-frame facility.
pub trait FrameScheduler {
    /// Register interest in the next rendered frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a registration. Unknown or already-delivered handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// One-shot deferred callbacks.
pub trait TimerScheduler {
    /// Schedule a timer that fires once after `delay`.
    fn set_timeout(&mut self, delay: Duration) -> TimerHandle;

    /// Cancel a timer. Unknown or already-fired handles are ignored.
    fn clear_timeout(&mut self, handle: TimerHandle);
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall clock backed by `web_time::Instant` (native and wasm32).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: web_time::Instant,
}

impl SystemClock {
    /// Start a clock whose origin is "now".
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for tests and simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Jump to `t`. Time never moves backwards.
    pub fn set(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }
}

// ---------------------------------------------------------------------------
// ManualScheduler
// ---------------------------------------------------------------------------

/// Deterministic frame + timer host.
///
/// Frame registrations accumulate until the host calls
/// [`take_frames`](Self::take_frames); timers fire when
/// [`advance_to`](Self::advance_to) moves past their deadline. Frames can be
/// stalled to simulate a compositor that stops delivering callbacks while
/// timers keep running.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    now: Duration,
    frames: Vec<FrameHandle>,
    /// Pending timers as `(deadline, handle)`.
    timers: Vec<(Duration, TimerHandle)>,
    frames_stalled: bool,
    frames_requested: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Stop (or resume) delivering frame callbacks.
    pub fn stall_frames(&mut self, stalled: bool) {
        self.frames_stalled = stalled;
    }

    pub fn frames_stalled(&self) -> bool {
        self.frames_stalled
    }

    /// Number of outstanding frame registrations.
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Total frame registrations ever made.
    pub fn frames_requested(&self) -> u64 {
        self.frames_requested
    }

    /// Drain the frame registrations due this frame, in request order.
    ///
    /// Returns nothing while frames are stalled; registrations stay pending.
    pub fn take_frames(&mut self) -> Vec<FrameHandle> {
        if self.frames_stalled {
            return Vec::new();
        }
        std::mem::take(&mut self.frames)
    }

    /// Move time to `t` and return the timers that became due, earliest first.
    pub fn advance_to(&mut self, t: Duration) -> Vec<TimerHandle> {
        self.now = self.now.max(t);
        let now = self.now;
        let mut due: Vec<(Duration, TimerHandle)> = Vec::new();
        self.timers.retain(|&(deadline, handle)| {
            if deadline <= now {
                due.push((deadline, handle));
                false
            } else {
                true
            }
        });
        due.sort();
        due.into_iter().map(|(_, handle)| handle).collect()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id());
        self.frames.push(handle);
        self.frames_requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|&h| h != handle);
    }
}

impl TimerScheduler for ManualScheduler {
    fn set_timeout(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id());
        self.timers.push((self.now.saturating_add(delay), handle));
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.timers.retain(|&(_, h)| h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn frames_drain_in_request_order() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        assert_eq!(s.take_frames(), vec![a, b]);
        assert!(s.take_frames().is_empty());
    }

    #[test]
    fn cancelled_frame_is_not_delivered() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        s.cancel_frame(a);
        assert_eq!(s.take_frames(), vec![b]);
    }

    #[test]
    fn stalled_frames_stay_pending() {
        let mut s = ManualScheduler::new();
        s.request_frame();
        s.stall_frames(true);
        assert!(s.take_frames().is_empty());
        assert_eq!(s.pending_frames(), 1);
        s.stall_frames(false);
        assert_eq!(s.take_frames().len(), 1);
    }

    #[test]
    fn timers_fire_at_deadline_in_order() {
        let mut s = ManualScheduler::new();
        let late = s.set_timeout(ms(300));
        let early = s.set_timeout(ms(100));
        assert!(s.advance_to(ms(99)).is_empty());
        assert_eq!(s.advance_to(ms(300)), vec![early, late]);
        assert_eq!(s.pending_timers(), 0);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let mut s = ManualScheduler::new();
        let t = s.set_timeout(ms(10));
        s.clear_timeout(t);
        assert!(s.advance_to(ms(1000)).is_empty());
    }

    #[test]
    fn timers_fire_while_frames_stalled() {
        let mut s = ManualScheduler::new();
        s.stall_frames(true);
        let t = s.set_timeout(ms(50));
        assert_eq!(s.advance_to(ms(50)), vec![t]);
    }

    #[test]
    fn time_never_moves_backwards() {
        let mut s = ManualScheduler::new();
        s.advance_to(ms(100));
        s.advance_to(ms(50));
        assert_eq!(s.now(), ms(100));

        let mut c = ManualClock::new();
        c.set(ms(20));
        c.set(ms(10));
        assert_eq!(c.now(), ms(20));
        c.advance(ms(5));
        assert_eq!(c.now(), ms(25));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let c = SystemClock::new();
        let a = c.now();
        let b = c.now();
        assert!(b >= a);
    }
}
