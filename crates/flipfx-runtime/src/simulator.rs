#![forbid(unsafe_code)]

//! Deterministic transition simulator for testing.
//!
//! `TransitionSimulator` runs a [`ThemeToggle`] on a [`ManualScheduler`] with
//! a virtual clock. Frames are delivered on a fixed grid (`frame_interval`),
//! timers fire at their exact deadlines, and every observable outcome is
//! recorded in an event log.
//!
//! # Example
//!
//! ```ignore
//! use flipfx_runtime::simulator::{SimEvent, TransitionSimulator};
//!
//! let mut sim = TransitionSimulator::new(MemoryThemeStore::new(true));
//! sim.activate(None);
//! sim.advance(Duration::from_millis(2500));
//! assert!(!sim.is_running());
//! assert!(sim.log().iter().any(|(_, e)| matches!(e, SimEvent::Completed(_))));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use flipfx_core::geometry::Rect;
use flipfx_core::scheduler::{Clock, ManualClock, ManualScheduler};
use flipfx_effects::EffectKind;
use flipfx_render::FxSurface;

use crate::config::ToggleConfig;
use crate::theme_store::{MemoryThemeStore, ThemeStore};
use crate::theme_toggle::{Activation, ThemeToggle};

/// Something observable that happened during simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// `activate` was called.
    Activated(Activation),
    /// The theme flipped; carries the new state.
    ThemeSwitched { is_dark: bool },
    /// The effect reached its natural end.
    Completed(EffectKind),
    /// The watchdog force-finished the session.
    WatchdogFired(EffectKind),
    /// The host tore the effect down.
    Unmounted(EffectKind),
}

type SimToggle = ThemeToggle<MemoryThemeStore, ManualScheduler, Arc<AtomicBool>>;

/// Deterministic simulator for [`ThemeToggle`].
pub struct TransitionSimulator {
    toggle: SimToggle,
    clock: ManualClock,
    frame_interval: Duration,
    next_frame_at: Duration,
    surface: Option<FxSurface>,
    reduced_motion: Arc<AtomicBool>,
    log: Vec<(Duration, SimEvent)>,
    frames_delivered: u64,
}

/// Default frame grid (~60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

impl TransitionSimulator {
    /// Simulator at `t = 0` with an 80x24 surface and 16 ms frames.
    pub fn new(store: MemoryThemeStore) -> Self {
        let reduced_motion = Arc::new(AtomicBool::new(false));
        Self {
            toggle: ThemeToggle::new(store, ManualScheduler::new(), Arc::clone(&reduced_motion)),
            clock: ManualClock::new(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            next_frame_at: DEFAULT_FRAME_INTERVAL,
            surface: Some(FxSurface::new(80, 24)),
            reduced_motion,
            log: Vec::new(),
            frames_delivered: 0,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ToggleConfig) -> Self {
        self.toggle = self.toggle.with_config(config);
        self
    }

    /// Set the frame grid spacing (at least 1 ms).
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval.max(Duration::from_millis(1));
        self.next_frame_at = self.clock.now() + self.frame_interval;
        self
    }

    /// Set the surface size; `None` simulates a surface that is not sized yet.
    #[must_use]
    pub fn with_surface(mut self, size: Option<(u16, u16)>) -> Self {
        self.set_surface(size);
        self
    }

    pub fn set_surface(&mut self, size: Option<(u16, u16)>) {
        match (size, self.surface.as_mut()) {
            (None, _) => self.surface = None,
            (Some((w, h)), Some(surface)) => surface.resize(w, h),
            (Some((w, h)), None) => self.surface = Some(FxSurface::new(w, h)),
        }
    }

    /// Stop or resume frame delivery; timers keep running.
    pub fn stall_frames(&mut self, stalled: bool) {
        self.toggle.host_mut().stall_frames(stalled);
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.reduced_motion.store(on, Ordering::Relaxed);
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Click the trigger at the current time.
    pub fn activate(&mut self, trigger: Option<Rect>) -> Activation {
        let now = self.clock.now();
        let before = self.toggle.store().is_dark();
        let outcome = self.toggle.activate(now, trigger);
        self.log.push((now, SimEvent::Activated(outcome)));
        self.note_theme(now, before);
        outcome
    }

    /// Host tears the effect down at the current time.
    pub fn unmount(&mut self) {
        let now = self.clock.now();
        let before = self.toggle.store().is_dark();
        let kind = self.active_effect();
        self.toggle.unmount();
        self.note_theme(now, before);
        if let Some(kind) = kind {
            self.log.push((now, SimEvent::Unmounted(kind)));
        }
    }

    /// Advance virtual time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.clock.now() + dt;
        self.advance_to(target);
    }

    /// Advance virtual time to `target`, delivering timers at their deadlines
    /// and frames on the grid.
    pub fn advance_to(&mut self, target: Duration) {
        while self.clock.now() < target {
            let step = self.next_frame_at.min(target);
            self.clock.set(step);
            let now = self.clock.now();

            let timers = self.toggle.host_mut().advance_to(now);
            for timer in timers {
                let before = self.toggle.store().is_dark();
                let kind = self.active_effect();
                if self.toggle.on_timer(timer, now) {
                    self.note_theme(now, before);
                    if let Some(kind) = kind {
                        self.log.push((now, SimEvent::WatchdogFired(kind)));
                    }
                }
            }

            if now == self.next_frame_at {
                self.deliver_frames(now);
                self.next_frame_at += self.frame_interval;
            }
        }
    }

    /// Advance until no session is running, at most `limit` more time.
    ///
    /// Returns true if the toggle went idle.
    pub fn run_until_idle(&mut self, limit: Duration) -> bool {
        let deadline = self.clock.now() + limit;
        while self.toggle.is_running() && self.clock.now() < deadline {
            let step = self.frame_interval.min(deadline - self.clock.now());
            self.advance(step);
        }
        !self.toggle.is_running()
    }

    fn deliver_frames(&mut self, now: Duration) {
        let frames = self.toggle.host_mut().take_frames();
        for frame in frames {
            let before = self.toggle.store().is_dark();
            let kind = self.active_effect();
            let events = self.toggle.on_frame(frame, now, self.surface.as_mut());
            self.frames_delivered += 1;
            self.note_theme(now, before);
            if events.complete {
                if let Some(kind) = kind {
                    self.log.push((now, SimEvent::Completed(kind)));
                }
            }
        }
    }

    fn note_theme(&mut self, now: Duration, before: bool) {
        let is_dark = self.toggle.store().is_dark();
        if is_dark != before {
            self.log.push((now, SimEvent::ThemeSwitched { is_dark }));
        }
    }

    fn active_effect(&self) -> Option<EffectKind> {
        self.toggle.session().map(|s| s.selected_effect)
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn is_dark(&self) -> bool {
        self.toggle.store().is_dark()
    }

    pub fn is_running(&self) -> bool {
        self.toggle.is_running()
    }

    pub fn toggle(&self) -> &SimToggle {
        &self.toggle
    }

    pub fn toggle_mut(&mut self) -> &mut SimToggle {
        &mut self.toggle
    }

    pub fn surface(&self) -> Option<&FxSurface> {
        self.surface.as_ref()
    }

    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered
    }

    /// Everything recorded so far, in order.
    pub fn log(&self) -> &[(Duration, SimEvent)] {
        &self.log
    }

    /// Drain the log.
    pub fn take_log(&mut self) -> Vec<(Duration, SimEvent)> {
        std::mem::take(&mut self.log)
    }
}

impl std::fmt::Debug for TransitionSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionSimulator")
            .field("now", &self.clock.now())
            .field("frame_interval", &self.frame_interval)
            .field("toggle", &self.toggle)
            .field("events", &self.log.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn frames_land_on_grid() {
        let mut sim = TransitionSimulator::new(MemoryThemeStore::new(true));
        sim.activate(None);
        sim.advance(ms(160));
        assert_eq!(sim.frames_delivered(), 10);
        assert_eq!(sim.now(), ms(160));
    }

    #[test]
    fn full_run_is_logged_in_order() {
        let mut sim = TransitionSimulator::new(MemoryThemeStore::new(true));
        sim.activate(None);
        assert!(sim.run_until_idle(ms(5000)));
        let events: Vec<SimEvent> = sim.log().iter().map(|(_, e)| *e).collect();
        assert_eq!(
            events,
            vec![
                SimEvent::Activated(Activation::Started(EffectKind::Rain)),
                SimEvent::ThemeSwitched { is_dark: false },
                SimEvent::Completed(EffectKind::Rain),
            ]
        );
    }

    #[test]
    fn surface_can_be_absent() {
        let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false)).with_surface(None);
        sim.activate(None);
        assert!(sim.run_until_idle(ms(5000)));
        assert!(sim.is_dark());
        assert!(sim.surface().is_none());
    }

    #[test]
    fn surface_appears_mid_run() {
        let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false)).with_surface(None);
        sim.activate(None);
        sim.advance(ms(300));
        sim.set_surface(Some((40, 12)));
        sim.advance(ms(100));
        assert!(sim.surface().is_some_and(|s| s.painted_cells() > 0));
    }

    #[test]
    fn watchdog_is_logged() {
        let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false));
        sim.stall_frames(true);
        sim.activate(None);
        sim.advance(ms(3000));
        let tail: Vec<SimEvent> = sim.log().iter().skip(1).map(|(_, e)| *e).collect();
        assert_eq!(
            tail,
            vec![
                SimEvent::ThemeSwitched { is_dark: true },
                SimEvent::WatchdogFired(EffectKind::Rain),
            ]
        );
        assert_eq!(sim.log()[1].0, ms(3000));
    }

    #[test]
    fn take_log_drains() {
        let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false));
        sim.activate(None);
        assert_eq!(sim.take_log().len(), 1);
        assert!(sim.log().is_empty());
    }
}
