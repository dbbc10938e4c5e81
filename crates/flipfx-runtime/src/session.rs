#![forbid(unsafe_code)]

//! Per-activation session record.

use std::time::Duration;

use flipfx_core::geometry::Point;
use flipfx_effects::EffectKind;

/// One activation-to-completion run, owned by the orchestrator.
///
/// Everything except `theme_switch_fired` is frozen at activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSession {
    /// Effect chosen for this session; later cursor moves do not change it.
    pub selected_effect: EffectKind,
    /// Theme state when the session started. Never re-read mid-session.
    pub frozen_was_dark: bool,
    /// Center of the trigger control, for effects that radiate from it.
    pub origin_point: Option<Point>,
    pub is_running: bool,
    /// Debounce flag for the theme mutation.
    pub theme_switch_fired: bool,
    /// Host timestamp of activation.
    pub started_at: Duration,
    /// Seed handed to the effect.
    pub seed: u32,
}

impl AnimationSession {
    pub fn start(
        selected_effect: EffectKind,
        frozen_was_dark: bool,
        origin_point: Option<Point>,
        started_at: Duration,
        seed: u32,
    ) -> Self {
        Self {
            selected_effect,
            frozen_was_dark,
            origin_point,
            is_running: true,
            theme_switch_fired: false,
            started_at,
            seed,
        }
    }

    /// Time since activation as of `now`.
    pub fn age(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running_and_unswitched() {
        let s = AnimationSession::start(
            EffectKind::Glitch,
            true,
            None,
            Duration::from_millis(40),
            7,
        );
        assert!(s.is_running);
        assert!(!s.theme_switch_fired);
        assert_eq!(s.age(Duration::from_millis(100)), Duration::from_millis(60));
        assert_eq!(s.age(Duration::ZERO), Duration::ZERO);
    }
}
