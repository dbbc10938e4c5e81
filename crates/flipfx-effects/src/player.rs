#![forbid(unsafe_code)]

//! Lifecycle runner shared by every effect.
//!
//! [`EffectPlayer`] turns a [`TransitionFx`] into a self-driving frame loop:
//!
//! 1. `mount` records the activation instant and registers the first frame.
//! 2. Each delivered frame computes elapsed time from that instant (never
//!    from frame counts), renders, and re-registers exactly one next frame.
//! 3. `ThemeSwitch` is raised once, on the first frame at or after the
//!    effect's offset. `Complete` is raised once, on the first frame at or
//!    after its duration; no frame is registered after that.
//! 4. `teardown` cancels the outstanding frame and drops the effect (and its
//!    particle/trail batches) without raising anything.
//!
//! A frame that arrives with no usable surface still advances timing and
//! lifecycle events; only drawing is skipped, and the next frame retries.

use std::time::Duration;

use flipfx_core::animation::Timeline;
use flipfx_core::logging::frame_span;
use flipfx_core::scheduler::{FrameHandle, FrameScheduler};
use flipfx_core::{debug, trace};
use flipfx_render::FxSurface;

use crate::protocol::{
    EffectDescriptor, EffectEvent, EffectKind, EffectMount, FxContext, TransitionFx,
};

/// Lifecycle events raised by one frame, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameEvents {
    pub theme_switch: bool,
    pub complete: bool,
}

impl FrameEvents {
    pub fn is_empty(&self) -> bool {
        !self.theme_switch && !self.complete
    }

    /// `ThemeSwitch` always precedes `Complete`.
    pub fn iter(&self) -> impl Iterator<Item = EffectEvent> {
        [
            self.theme_switch.then_some(EffectEvent::ThemeSwitch),
            self.complete.then_some(EffectEvent::Complete),
        ]
        .into_iter()
        .flatten()
    }
}

/// Drives one effect for one session.
pub struct EffectPlayer {
    descriptor: &'static EffectDescriptor,
    mount: EffectMount,
    fx: Option<Box<dyn TransitionFx>>,
    started_at: Duration,
    last_frame_at: Duration,
    timeline: Timeline,
    frame: u64,
    pending: Option<FrameHandle>,
    switched: bool,
    completed: bool,
    surface_size: (u16, u16),
}

impl EffectPlayer {
    /// Build the effect and register its first frame.
    pub fn mount<S>(mount: EffectMount, now: Duration, scheduler: &mut S) -> Self
    where
        S: FrameScheduler + ?Sized,
    {
        let descriptor = mount.kind.descriptor();
        let fx = mount.kind.instantiate(&mount);
        let pending = scheduler.request_frame();
        debug!(
            effect = descriptor.label,
            was_dark = mount.was_dark,
            "effect mounted"
        );
        Self {
            descriptor,
            mount,
            fx: Some(fx),
            started_at: now,
            last_frame_at: now,
            timeline: Timeline::new(descriptor.duration, descriptor.theme_switch_offset),
            frame: 0,
            pending: Some(pending),
            switched: false,
            completed: false,
            surface_size: (0, 0),
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.descriptor.kind
    }

    pub fn descriptor(&self) -> &'static EffectDescriptor {
        self.descriptor
    }

    /// True until completion or teardown.
    pub fn is_active(&self) -> bool {
        self.fx.is_some() && !self.completed
    }

    /// The single outstanding frame registration, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn has_switched(&self) -> bool {
        self.switched
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Elapsed time as of the last delivered frame.
    pub fn elapsed(&self) -> Duration {
        self.timeline.elapsed()
    }

    /// Frames delivered so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frame
    }

    /// Handle one frame callback.
    ///
    /// Frames for any handle other than the outstanding one are ignored.
    pub fn on_frame<S>(
        &mut self,
        handle: FrameHandle,
        now: Duration,
        surface: Option<&mut FxSurface>,
        scheduler: &mut S,
    ) -> FrameEvents
    where
        S: FrameScheduler + ?Sized,
    {
        if self.pending != Some(handle) || !self.is_active() {
            trace!(?handle, "ignoring stale frame");
            return FrameEvents::default();
        }
        self.pending = None;

        let elapsed = now.saturating_sub(self.started_at);
        let dt = now.saturating_sub(self.last_frame_at);
        self.last_frame_at = now;
        self.timeline.seek(elapsed);
        let finished = self.timeline.is_complete();

        if let Some(surface) = surface {
            let _span = frame_span(self.descriptor.label, self.frame).entered();
            self.draw(elapsed, dt, finished, surface);
        } else {
            trace!(effect = self.descriptor.label, "no surface; skipping draw");
        }
        self.frame += 1;

        let mut events = FrameEvents::default();
        if !self.switched && self.timeline.cue_reached() {
            self.switched = true;
            events.theme_switch = true;
        }
        if finished {
            self.completed = true;
            events.complete = true;
            debug!(
                effect = self.descriptor.label,
                elapsed_ms = elapsed.as_millis() as u64,
                frames = self.frame,
                "effect complete"
            );
        } else {
            self.pending = Some(scheduler.request_frame());
        }
        events
    }

    fn draw(&mut self, elapsed: Duration, dt: Duration, finished: bool, surface: &mut FxSurface) {
        let Some(fx) = self.fx.as_mut() else {
            return;
        };
        if surface.is_empty() {
            return;
        }
        let size = (surface.width(), surface.height());
        if size != self.surface_size {
            self.surface_size = size;
            fx.resize(size.0, size.1);
        }
        surface.clear();
        if finished {
            // Hand the viewport back untouched.
            return;
        }
        let ctx = FxContext {
            elapsed,
            progress: self.timeline.progress(),
            dt,
            frame: self.frame,
            was_dark: self.mount.was_dark,
            origin: self.mount.origin,
        };
        fx.render(&ctx, surface);
    }

    /// Forced teardown: cancel the outstanding frame and release the effect.
    pub fn teardown<S>(&mut self, scheduler: &mut S)
    where
        S: FrameScheduler + ?Sized,
    {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        if self.fx.take().is_some() {
            trace!(effect = self.descriptor.label, "effect released");
        }
    }
}

impl std::fmt::Debug for EffectPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectPlayer")
            .field("kind", &self.descriptor.kind)
            .field("elapsed", &self.timeline.elapsed())
            .field("frame", &self.frame)
            .field("pending", &self.pending)
            .field("switched", &self.switched)
            .field("completed", &self.completed)
            .finish()
    }
}
