#![forbid(unsafe_code)]

//! Liquid blob that swells from the trigger until it floods the view, then
//! drains away.
//!
//! # Algorithm
//!
//! `CONTROL_POINTS` angularly spaced control points sit on a circle around
//! the anchor. Each radius is perturbed by two sine terms with different
//! frequencies and drift directions, which gives the edge an organic wobble.
//! A closed Catmull-Rom spline through the points is sampled into a polygon
//! and filled.
//!
//! Overall scale is two-phase: ease-out expansion over the first 60% of the
//! run, ease-in contraction over the rest. The theme flips at the peak,
//! while the blob covers everything.

use flipfx_core::animation::{ease_in, ease_out};
use flipfx_core::geometry::Point;
use flipfx_render::FxSurface;

use crate::palette::TransitionPalette;
use crate::protocol::{EffectKind, EffectMount, FxContext, TransitionFx};

/// Control points around the blob.
pub const CONTROL_POINTS: usize = 12;
/// Spline samples per control-point segment.
const SAMPLES_PER_SEGMENT: usize = 6;
/// Progress at which expansion turns into contraction.
const PEAK: f32 = 0.6;
/// Headroom so the inward wobble still covers the corners.
const COVER_MARGIN: f32 = 1.2;
const CELL_ASPECT: f32 = 0.5;
const RIM_SCALE: f32 = 1.05;

/// Blob-morph transition.
#[derive(Debug, Clone)]
pub struct BlobMorphFx {
    palette: TransitionPalette,
    controls: [Point; CONTROL_POINTS],
    outline: Vec<Point>,
    rim: Vec<Point>,
    phase_seed: f32,
}

/// Two-phase scale curve in [0, 1].
pub fn blob_scale(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    if p < PEAK {
        ease_out(p / PEAK)
    } else {
        1.0 - ease_in((p - PEAK) / (1.0 - PEAK))
    }
}

impl BlobMorphFx {
    pub fn new(mount: &EffectMount) -> Self {
        let capacity = CONTROL_POINTS * SAMPLES_PER_SEGMENT;
        Self {
            palette: TransitionPalette::for_transition(mount.was_dark),
            controls: [Point::default(); CONTROL_POINTS],
            outline: Vec::with_capacity(capacity),
            rim: Vec::with_capacity(capacity),
            // Different sessions wobble differently.
            phase_seed: (mount.seed % 6283) as f32 / 1000.0,
        }
    }

    /// Sampled outline from the last rendered frame.
    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    fn place_controls(&mut self, anchor: Point, radius: f32, t: f32) {
        for (i, control) in self.controls.iter_mut().enumerate() {
            let theta = i as f32 / CONTROL_POINTS as f32 * std::f32::consts::TAU;
            let wobble = 1.0
                + 0.08 * (3.0 * theta + t * 2.3 + self.phase_seed).sin()
                + 0.05 * (5.0 * theta - t * 3.1).sin();
            let r = radius * wobble;
            *control = Point::new(
                anchor.x + theta.cos() * r,
                anchor.y + theta.sin() * r * CELL_ASPECT,
            );
        }
    }
}

/// Sample a closed Catmull-Rom spline through `controls` into `out`.
fn sample_closed_spline(controls: &[Point], samples: usize, out: &mut Vec<Point>) {
    out.clear();
    let n = controls.len();
    if n < 3 || samples == 0 {
        out.extend_from_slice(controls);
        return;
    }
    for i in 0..n {
        let p0 = controls[(i + n - 1) % n];
        let p1 = controls[i];
        let p2 = controls[(i + 1) % n];
        let p3 = controls[(i + 2) % n];
        for s in 0..samples {
            let t = s as f32 / samples as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            let blend = |a: f32, b: f32, c: f32, d: f32| {
                0.5 * (2.0 * b
                    + (c - a) * t
                    + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2
                    + (3.0 * b - a - 3.0 * c + d) * t3)
            };
            out.push(Point::new(
                blend(p0.x, p1.x, p2.x, p3.x),
                blend(p0.y, p1.y, p2.y, p3.y),
            ));
        }
    }
}

/// Radius (in columns) of an aspect-corrected ellipse around `anchor`
/// that reaches every corner of the surface.
fn covering_radius(anchor: Point, width: u16, height: u16) -> f32 {
    let w = f32::from(width);
    let h = f32::from(height);
    [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
        .into_iter()
        .map(|(x, y)| {
            let dx = x - anchor.x;
            let dy = (y - anchor.y) / CELL_ASPECT;
            (dx * dx + dy * dy).sqrt()
        })
        .fold(0.0, f32::max)
}

impl TransitionFx for BlobMorphFx {
    fn kind(&self) -> EffectKind {
        EffectKind::BlobMorph
    }

    fn render(&mut self, ctx: &FxContext, surface: &mut FxSurface) {
        let scale = blob_scale(ctx.progress);
        if scale <= 0.0 {
            self.outline.clear();
            return;
        }
        let anchor = ctx.anchor(surface.width(), surface.height());
        let radius =
            covering_radius(anchor, surface.width(), surface.height()) * COVER_MARGIN * scale;
        let t = ctx.elapsed.as_secs_f32();

        self.place_controls(anchor, radius * RIM_SCALE, t);
        sample_closed_spline(&self.controls, SAMPLES_PER_SEGMENT, &mut self.rim);
        surface.fill_polygon(&self.rim, self.palette.accent.with_opacity(0.85));

        self.place_controls(anchor, radius, t);
        sample_closed_spline(&self.controls, SAMPLES_PER_SEGMENT, &mut self.outline);
        surface.fill_polygon(&self.outline, self.palette.to_bg);
    }
}
