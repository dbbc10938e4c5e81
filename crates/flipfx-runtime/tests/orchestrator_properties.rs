#![forbid(unsafe_code)]

//! End-to-end orchestrator properties, driven through the simulator.
//!
//! Run:
//!   cargo test -p flipfx-runtime --test orchestrator_properties

use std::time::Duration;

use flipfx_core::geometry::Rect;
use flipfx_effects::{EffectKind, EffectSet};
use flipfx_runtime::{
    Activation, MemoryThemeStore, SimEvent, ThemeStore, ToggleConfig, TransitionSimulator,
};
use proptest::prelude::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn switches(sim: &TransitionSimulator) -> usize {
    sim.log()
        .iter()
        .filter(|(_, e)| matches!(e, SimEvent::ThemeSwitched { .. }))
        .count()
}

// ============================================================================
// Timing
// ============================================================================

#[test]
fn explosion_flips_at_700ms_and_unlocks_after_1500ms() {
    let store = MemoryThemeStore::new(false).with_cursor(4);
    let mut sim = TransitionSimulator::new(store).with_frame_interval(ms(1));

    let outcome = sim.activate(Some(Rect::new(70, 1, 6, 1)));
    assert_eq!(outcome, Activation::Started(EffectKind::ParticleExplosion));
    assert!(sim.is_running());

    sim.advance_to(ms(699));
    assert!(!sim.is_dark(), "theme flipped early");

    sim.advance_to(ms(700));
    assert!(sim.is_dark(), "theme did not flip at the switch point");

    sim.advance_to(ms(1501));
    assert!(!sim.is_running());
    assert!(sim.toggle().is_interactive());
    assert_eq!(switches(&sim), 1);
    assert!(
        sim.log()
            .iter()
            .any(|&(t, e)| t == ms(1500) && e == SimEvent::Completed(EffectKind::ParticleExplosion))
    );
}

#[test]
fn explosion_only_rotation_repeats() {
    let config = ToggleConfig {
        effects: EffectSet::PARTICLE_EXPLOSION,
        ..ToggleConfig::default()
    };
    let mut sim = TransitionSimulator::new(MemoryThemeStore::new(true)).with_config(config);
    for _ in 0..3 {
        assert_eq!(
            sim.activate(None),
            Activation::Started(EffectKind::ParticleExplosion)
        );
        assert!(sim.run_until_idle(ms(2000)));
    }
    assert!(!sim.is_dark(), "three flips from dark end on light");
}

// ============================================================================
// Watchdog
// ============================================================================

#[test]
fn watchdog_unlocks_when_frames_never_arrive() {
    let mut sim = TransitionSimulator::new(MemoryThemeStore::new(true));
    sim.stall_frames(true);
    sim.activate(None);

    sim.advance_to(ms(2999));
    assert!(sim.is_running());
    assert!(sim.is_dark());

    sim.advance_to(ms(3000));
    assert!(!sim.is_running(), "watchdog did not release the lock");
    assert!(!sim.is_dark(), "watchdog did not apply the theme");

    sim.stall_frames(false);
    assert_eq!(
        sim.activate(None),
        Activation::Started(EffectKind::BlobMorph),
        "re-activation after the watchdog must start the next effect"
    );
    assert!(sim.run_until_idle(ms(3000)));
    assert!(sim.is_dark());
}

#[test]
fn watchdog_after_switch_does_not_flip_twice() {
    let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false));
    sim.activate(None);
    // Rain flips at 1000 ms; freeze frames afterwards.
    sim.advance_to(ms(1200));
    assert!(sim.is_dark());
    sim.stall_frames(true);
    sim.advance_to(ms(3100));
    assert!(!sim.is_running());
    assert!(sim.is_dark());
    assert_eq!(switches(&sim), 1);
    assert_eq!(sim.toggle().store().toggles(), 1);
}

// ============================================================================
// Gating and idempotence
// ============================================================================

#[test]
fn clicks_during_a_run_are_ignored() {
    let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false));
    sim.activate(None);
    for step in 1..20 {
        sim.advance_to(ms(step * 50));
        assert_eq!(sim.activate(None), Activation::Ignored);
    }
    assert!(sim.run_until_idle(ms(3000)));
    assert_eq!(switches(&sim), 1);
    assert_eq!(sim.toggle().store().effect_cursor(), 1);
}

#[test]
fn repeated_callbacks_are_idempotent() {
    let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false));
    sim.activate(None);
    sim.toggle_mut().on_theme_switch();
    sim.toggle_mut().on_theme_switch();
    assert_eq!(sim.toggle().store().toggles(), 1);

    sim.toggle_mut().on_complete();
    sim.toggle_mut().on_complete();
    assert!(!sim.is_running());
    assert_eq!(sim.toggle().store().effect_cursor(), 1);

    // Frames already queued for the torn-down effect change nothing.
    sim.advance(ms(500));
    assert_eq!(sim.toggle().store().toggles(), 1);
}

#[test]
fn unmount_before_switch_still_applies_theme() {
    let mut sim = TransitionSimulator::new(MemoryThemeStore::new(true));
    sim.activate(None);
    sim.advance_to(ms(200));
    sim.unmount();
    assert!(!sim.is_running());
    assert!(!sim.is_dark());
    assert_eq!(sim.toggle().host().pending_timers(), 0);
    assert!(matches!(
        sim.log().last(),
        Some((_, SimEvent::Unmounted(EffectKind::Rain)))
    ));
}

// ============================================================================
// Reduced motion
// ============================================================================

#[test]
fn reduced_motion_flips_synchronously() {
    let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false));
    sim.set_reduced_motion(true);
    for round in 0..4u64 {
        assert_eq!(sim.activate(None), Activation::Bypassed);
        assert!(!sim.is_running());
        assert_eq!(sim.is_dark(), round % 2 == 0);
        sim.advance(ms(100));
        assert!(!sim.is_running());
    }
    assert_eq!(sim.frames_delivered(), 0);
    assert_eq!(sim.toggle().host().frames_requested(), 0);
}

#[test]
fn reduced_motion_can_change_between_clicks() {
    let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false));
    sim.set_reduced_motion(true);
    assert_eq!(sim.activate(None), Activation::Bypassed);
    sim.set_reduced_motion(false);
    // The bypass still advanced the cursor.
    assert_eq!(
        sim.activate(None),
        Activation::Started(EffectKind::BlobMorph)
    );
}

// ============================================================================
// Rotation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn rotation_cycles_under_jitter(
        interval_ms in 1u64..40,
        gaps in prop::collection::vec(0u64..400, 10),
        dark in any::<bool>(),
    ) {
        let mut sim = TransitionSimulator::new(MemoryThemeStore::new(dark))
            .with_frame_interval(ms(interval_ms));
        let mut played = Vec::new();
        for gap in gaps {
            sim.advance(ms(gap));
            match sim.activate(None) {
                Activation::Started(kind) => played.push(kind),
                other => prop_assert!(false, "unexpected {other:?}"),
            }
            prop_assert!(sim.run_until_idle(ms(3000)));
        }
        let expected: Vec<EffectKind> = EffectKind::ALL.iter().copied().cycle().take(10).collect();
        prop_assert_eq!(played, expected);
        prop_assert_eq!(switches(&sim), 10);
        prop_assert_eq!(sim.is_dark(), dark);
    }

    #[test]
    fn every_run_flips_exactly_once(
        cursor in 0usize..5,
        interval_ms in 1u64..50,
        stall_at in prop::option::of(0u64..2000),
    ) {
        let mut sim = TransitionSimulator::new(MemoryThemeStore::new(false).with_cursor(cursor))
            .with_frame_interval(ms(interval_ms));
        sim.activate(None);
        if let Some(at) = stall_at {
            sim.advance_to(ms(at));
            sim.stall_frames(true);
        }
        prop_assert!(sim.run_until_idle(ms(3500)));
        prop_assert!(sim.is_dark());
        prop_assert_eq!(switches(&sim), 1);
        prop_assert_eq!(sim.toggle().store().effect_cursor(), (cursor + 1) % 5);
    }
}
