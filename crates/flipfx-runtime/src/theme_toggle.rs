#![forbid(unsafe_code)]

//! The theme-toggle orchestrator.
//!
//! [`ThemeToggle`] gates the trigger control, picks one effect per
//! activation from a round-robin rotation, and guarantees that every
//! activation flips the theme exactly once and eventually unlocks input.
//!
//! # Session lifecycle
//!
//! ```text
//! activate ──reduced motion──▶ flip theme, advance cursor (no session)
//!    │
//!    ▼
//! running ──ThemeSwitch──▶ flip theme (debounced)
//!    │
//!    ├──Complete────────▶ finish
//!    ├──watchdog fires──▶ flip theme (debounced), finish
//!    └──unmount─────────▶ flip theme (debounced), finish
//!
//! finish: cancel frame + watchdog, drop effect, advance cursor
//! ```
//!
//! Completion and the watchdog race; whichever lands first wins and
//! the other finds no session and does nothing.
//!
//! # Host integration
//!
//! The host owns the frame loop and timers. It forwards every frame callback
//! to [`ThemeToggle::on_frame`] and every timer callback to
//! [`ThemeToggle::on_timer`]; stale handles are ignored.

use std::time::Duration;

use flipfx_core::geometry::Rect;
use flipfx_core::scheduler::{FrameHandle, FrameScheduler, TimerHandle, TimerScheduler};
use flipfx_effects::{EffectEvent, EffectKind, EffectMount, EffectPlayer, FrameEvents};
use flipfx_render::FxSurface;
use tracing::{debug, info, trace, warn};

use crate::config::ToggleConfig;
use crate::motion::ReducedMotion;
use crate::session::AnimationSession;
use crate::theme_store::ThemeStore;

/// Outcome of [`ThemeToggle::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A session is already running; nothing happened.
    Ignored,
    /// Reduced motion: the theme flipped synchronously with no animation.
    Bypassed,
    /// A session started with this effect.
    Started(EffectKind),
}

/// Orchestrates animated theme flips.
pub struct ThemeToggle<S, H, M = bool> {
    store: S,
    host: H,
    motion: M,
    config: ToggleConfig,
    rotation: Vec<EffectKind>,
    session: Option<AnimationSession>,
    player: Option<EffectPlayer>,
    watchdog: Option<TimerHandle>,
    sessions_started: u32,
}

impl<S, H, M> ThemeToggle<S, H, M>
where
    S: ThemeStore,
    H: FrameScheduler + TimerScheduler,
    M: ReducedMotion,
{
    /// Create an idle orchestrator with the default configuration.
    pub fn new(store: S, host: H, motion: M) -> Self {
        let config = ToggleConfig::default();
        Self {
            store,
            host,
            motion,
            rotation: config.effects.kinds().collect(),
            config,
            session: None,
            player: None,
            watchdog: None,
            sessions_started: 0,
        }
    }

    /// Replace the configuration. Invalid fields fall back to defaults.
    #[must_use]
    pub fn with_config(mut self, config: ToggleConfig) -> Self {
        let (config, fixed) = config.sanitize();
        for err in &fixed {
            info!(field = err.field, value = %err.value, "config fallback: {}", err.message);
        }
        self.rotation = config.effects.kinds().collect();
        self.config = config;
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// True from activation until completion, watchdog, or unmount.
    pub fn is_running(&self) -> bool {
        self.session.is_some_and(|s| s.is_running)
    }

    /// Whether the trigger control should accept input.
    pub fn is_interactive(&self) -> bool {
        !self.is_running()
    }

    pub fn session(&self) -> Option<&AnimationSession> {
        self.session.as_ref()
    }

    /// Effect the next activation will play.
    pub fn next_effect(&self) -> EffectKind {
        let len = self.rotation.len().max(1);
        self.rotation
            .get(self.store.effect_cursor() % len)
            .copied()
            .unwrap_or(EffectKind::Rain)
    }

    /// Label for the trigger's tooltip.
    pub fn next_effect_hint(&self) -> &'static str {
        self.next_effect().label()
    }

    /// Effects in rotation order.
    pub fn rotation(&self) -> &[EffectKind] {
        &self.rotation
    }

    pub fn config(&self) -> &ToggleConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn motion(&self) -> &M {
        &self.motion
    }

    /// The watchdog timer of the running session, if armed.
    pub fn watchdog(&self) -> Option<TimerHandle> {
        self.watchdog
    }

    /// The mounted effect's outstanding frame, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.player.as_ref().and_then(EffectPlayer::pending_frame)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Handle a click on the trigger control.
    ///
    /// `trigger` is the control's on-screen bounds; its center becomes the
    /// origin for effects that radiate from it.
    pub fn activate(&mut self, now: Duration, trigger: Option<Rect>) -> Activation {
        if self.is_running() {
            trace!("activation ignored; a transition is running");
            return Activation::Ignored;
        }

        if self.config.force_reduced_motion || self.motion.prefers_reduced_motion() {
            self.store.toggle_theme();
            self.store.advance_effect(self.rotation.len());
            debug!(
                is_dark = self.store.is_dark(),
                "reduced motion: theme flipped without animation"
            );
            return Activation::Bypassed;
        }

        let kind = self.next_effect();
        let was_dark = self.store.is_dark();
        let origin = trigger.filter(|r| !r.is_empty()).map(|r| r.center());
        let seed = self
            .config
            .seed
            .wrapping_add(self.sessions_started.wrapping_mul(0x9E37_79B9));
        self.sessions_started = self.sessions_started.wrapping_add(1);

        self.session = Some(AnimationSession::start(kind, was_dark, origin, now, seed));
        let mount = EffectMount::new(kind, was_dark)
            .with_origin(origin)
            .with_seed(seed);
        self.player = Some(EffectPlayer::mount(mount, now, &mut self.host));
        self.watchdog = Some(self.host.set_timeout(self.config.watchdog));

        debug!(
            effect = kind.label(),
            was_dark,
            watchdog_ms = self.config.watchdog.as_millis() as u64,
            "transition started"
        );
        Activation::Started(kind)
    }

    /// Deliver a frame callback to the mounted effect.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: Duration,
        surface: Option<&mut FxSurface>,
    ) -> FrameEvents {
        let Some(player) = self.player.as_mut() else {
            trace!(?handle, "frame with no effect mounted");
            return FrameEvents::default();
        };
        let events = player.on_frame(handle, now, surface, &mut self.host);
        for event in events.iter() {
            match event {
                EffectEvent::ThemeSwitch => self.on_theme_switch(),
                EffectEvent::Complete => self.on_complete(),
            }
        }
        events
    }

    /// Deliver a timer callback. Returns true if it was the live watchdog.
    pub fn on_timer(&mut self, handle: TimerHandle, now: Duration) -> bool {
        if self.watchdog != Some(handle) {
            trace!(?handle, "stale timer ignored");
            return false;
        }
        self.watchdog = None;
        if let Some(session) = self.session {
            warn!(
                effect = session.selected_effect.label(),
                age_ms = session.age(now).as_millis() as u64,
                switched = session.theme_switch_fired,
                "watchdog fired; forcing transition to finish"
            );
        }
        self.on_theme_switch();
        self.finish("watchdog");
        true
    }

    /// Flip the theme once per session. Later calls are no-ops.
    pub fn on_theme_switch(&mut self) {
        let Some(session) = self.session.as_mut() else {
            trace!("theme switch outside a session ignored");
            return;
        };
        if session.theme_switch_fired {
            trace!("duplicate theme switch ignored");
            return;
        }
        session.theme_switch_fired = true;
        self.store.toggle_theme();
        debug!(is_dark = self.store.is_dark(), "theme switched");
    }

    /// The running effect finished. Later calls are no-ops.
    pub fn on_complete(&mut self) {
        if self.session.is_none() {
            trace!("completion with no session ignored");
            return;
        }
        self.finish("complete");
    }

    /// Host-driven teardown of the running effect (e.g. the view unmounts).
    ///
    /// The theme still flips if the effect had not reached its switch point.
    pub fn unmount(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.on_theme_switch();
        self.finish("unmount");
    }

    fn finish(&mut self, reason: &'static str) {
        if let Some(handle) = self.watchdog.take() {
            self.host.clear_timeout(handle);
        }
        if let Some(mut player) = self.player.take() {
            player.teardown(&mut self.host);
        }
        let session = self.session.take();
        self.store.advance_effect(self.rotation.len());
        debug!(
            reason,
            effect = session.map(|s| s.selected_effect.label()),
            next = self.next_effect_hint(),
            "transition finished"
        );
    }
}

impl<S, H, M> std::fmt::Debug for ThemeToggle<S, H, M>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeToggle")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("session", &self.session)
            .field("watchdog", &self.watchdog)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme_store::MemoryThemeStore;
    use flipfx_core::geometry::Point;
    use flipfx_core::scheduler::ManualScheduler;
    use flipfx_effects::EffectSet;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn toggle(dark: bool) -> ThemeToggle<MemoryThemeStore, ManualScheduler> {
        ThemeToggle::new(MemoryThemeStore::new(dark), ManualScheduler::new(), false)
    }

    /// Deliver frames every `step` ms from `from` to `to` inclusive.
    fn pump(t: &mut ThemeToggle<MemoryThemeStore, ManualScheduler>, from: u64, to: u64, step: u64) {
        let mut now = from;
        while now <= to {
            for timer in t.host_mut().advance_to(ms(now)) {
                t.on_timer(timer, ms(now));
            }
            for frame in t.host_mut().take_frames() {
                t.on_frame(frame, ms(now), None);
            }
            now += step;
        }
    }

    #[test]
    fn activation_snapshots_session() {
        let mut t = toggle(true);
        let trigger = Rect::new(10, 2, 4, 2);
        assert_eq!(t.activate(ms(5), Some(trigger)), Activation::Started(EffectKind::Rain));
        let s = *t.session().expect("session");
        assert_eq!(s.selected_effect, EffectKind::Rain);
        assert!(s.frozen_was_dark);
        assert_eq!(s.origin_point, Some(Point::new(12.0, 3.0)));
        assert!(s.is_running && !s.theme_switch_fired);
        assert!(!t.is_interactive());
        assert!(t.watchdog().is_some());
        assert!(t.pending_frame().is_some());
    }

    #[test]
    fn empty_trigger_rect_gives_no_origin() {
        let mut t = toggle(false);
        t.activate(ms(0), Some(Rect::new(3, 3, 0, 0)));
        assert_eq!(t.session().and_then(|s| s.origin_point), None);
    }

    #[test]
    fn second_activation_is_ignored() {
        let mut t = toggle(false);
        t.activate(ms(0), None);
        assert_eq!(t.activate(ms(10), None), Activation::Ignored);
        assert_eq!(t.session().map(|s| s.started_at), Some(ms(0)));
    }

    #[test]
    fn theme_switch_is_debounced() {
        let mut t = toggle(false);
        t.activate(ms(0), None);
        t.on_theme_switch();
        t.on_theme_switch();
        assert!(t.store().is_dark());
        assert_eq!(t.store().toggles(), 1);
    }

    #[test]
    fn callbacks_outside_session_are_noops() {
        let mut t = toggle(false);
        t.on_theme_switch();
        t.on_complete();
        t.unmount();
        assert_eq!(t.store().toggles(), 0);
        assert_eq!(t.store().effect_cursor(), 0);
    }

    #[test]
    fn natural_completion_advances_rotation() {
        let mut t = toggle(true);
        t.activate(ms(0), None);
        pump(&mut t, 0, 2100, 16);
        assert!(!t.is_running());
        assert!(!t.store().is_dark());
        assert_eq!(t.store().toggles(), 1);
        assert_eq!(t.next_effect(), EffectKind::BlobMorph);
        assert_eq!(t.next_effect_hint(), "Liquid Morph");
        assert_eq!(t.host().pending_timers(), 0, "watchdog cleared on completion");
        assert_eq!(t.host().pending_frames(), 0);
    }

    #[test]
    fn watchdog_rescues_stalled_effect_and_still_flips() {
        let mut t = toggle(false);
        t.activate(ms(0), None);
        t.host_mut().stall_frames(true);
        pump(&mut t, 0, 2999, 1);
        assert!(t.is_running());
        pump(&mut t, 3000, 3000, 1);
        assert!(!t.is_running());
        assert_eq!(t.store().toggles(), 1);
        assert_eq!(t.host().pending_frames(), 0, "stuck frame cancelled");
        assert_eq!(t.activate(ms(3000), None), Activation::Started(EffectKind::BlobMorph));
    }

    #[test]
    fn late_completion_after_watchdog_is_noop() {
        let mut t = toggle(false);
        t.activate(ms(0), None);
        let watchdog = t.watchdog().expect("armed");
        t.on_timer(watchdog, ms(3000));
        let cursor = t.store().effect_cursor();
        t.on_complete();
        t.on_theme_switch();
        assert_eq!(t.store().effect_cursor(), cursor);
        assert_eq!(t.store().toggles(), 1);
        assert!(!t.on_timer(watchdog, ms(3001)), "stale watchdog");
    }

    #[test]
    fn unmount_finishes_and_flips_once() {
        let mut t = toggle(true);
        t.activate(ms(0), None);
        pump(&mut t, 0, 100, 16);
        t.unmount();
        assert!(!t.is_running());
        assert_eq!(t.store().toggles(), 1);
        assert_eq!(t.host().pending_frames(), 0);
        assert_eq!(t.host().pending_timers(), 0);
        assert_eq!(t.store().effect_cursor(), 1);
    }

    #[test]
    fn reduced_motion_flips_synchronously() {
        let mut t = ThemeToggle::new(MemoryThemeStore::new(false), ManualScheduler::new(), true);
        assert_eq!(t.activate(ms(0), None), Activation::Bypassed);
        assert!(t.store().is_dark());
        assert!(!t.is_running());
        assert!(t.session().is_none());
        assert_eq!(t.host().pending_frames(), 0);
        assert_eq!(t.host().pending_timers(), 0);
        assert_eq!(t.store().effect_cursor(), 1);
    }

    #[test]
    fn config_forces_reduced_motion() {
        let config = ToggleConfig {
            force_reduced_motion: true,
            ..ToggleConfig::default()
        };
        let mut t = toggle(true).with_config(config);
        assert_eq!(t.activate(ms(0), None), Activation::Bypassed);
    }

    #[test]
    fn restricted_rotation_cycles_enabled_effects() {
        let config = ToggleConfig {
            effects: EffectSet::GLITCH | EffectSet::PARTICLE_EXPLOSION,
            ..ToggleConfig::default()
        };
        let mut t = toggle(false).with_config(config);
        let mut seen = Vec::new();
        let mut now = 0;
        for _ in 0..4 {
            if let Activation::Started(kind) = t.activate(ms(now), None) {
                seen.push(kind);
            }
            pump(&mut t, now, now + 1600, 16);
            now += 2000;
        }
        assert_eq!(
            seen,
            vec![
                EffectKind::Glitch,
                EffectKind::ParticleExplosion,
                EffectKind::Glitch,
                EffectKind::ParticleExplosion
            ]
        );
    }

    #[test]
    fn invalid_config_is_sanitized() {
        let config = ToggleConfig {
            watchdog: ms(100),
            ..ToggleConfig::default()
        };
        let t = toggle(false).with_config(config);
        assert_eq!(t.config().watchdog, crate::config::DEFAULT_WATCHDOG);
    }

    #[test]
    fn sessions_get_distinct_seeds() {
        let mut t = toggle(false);
        t.activate(ms(0), None);
        let first = t.session().map(|s| s.seed);
        t.unmount();
        t.activate(ms(10), None);
        let second = t.session().map(|s| s.seed);
        assert_ne!(first, second);
    }
}
