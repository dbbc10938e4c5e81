#![forbid(unsafe_code)]

//! Radial particle burst from the trigger control.
//!
//! A fixed batch of particles is seeded once, on the first known surface
//! size, with velocities spread over the full circle around the anchor.
//! Each frame integrates gravity and per-axis damping; particles that leave
//! the surface are not removed, they simply fade with the rest of the batch.
//!
//! Behind the particles a shockwave disc in the incoming background color
//! grows until it covers the view shortly before the theme flips, then
//! thins out to reveal the real (now switched) UI.

use flipfx_core::animation::{Envelope, ease_out, segment};
use flipfx_core::geometry::Point;
use flipfx_render::FxSurface;

use crate::palette::TransitionPalette;
use crate::particle::{Particle, ParticleShape};
use crate::protocol::{EffectKind, EffectMount, FxContext, TransitionFx};
use crate::rng::FxRng;

/// Particles per burst.
pub const PARTICLE_COUNT: usize = 140;

/// Cells per second squared, downward.
const GRAVITY: f32 = 18.0;
/// Velocity retained after one second.
const DAMPING: f32 = 0.35;
/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 0.5;

const SHAPES: [ParticleShape; 4] = [
    ParticleShape::Circle,
    ParticleShape::Square,
    ParticleShape::Spark,
    ParticleShape::Star,
];

/// Particle-explosion transition.
#[derive(Debug, Clone)]
pub struct ParticleExplosionFx {
    palette: TransitionPalette,
    envelope: Envelope,
    origin: Option<Point>,
    seed: u32,
    anchor: Point,
    reach: f32,
    particles: Vec<Particle>,
}

impl ParticleExplosionFx {
    pub fn new(mount: &EffectMount) -> Self {
        Self {
            palette: TransitionPalette::for_transition(mount.was_dark),
            envelope: Envelope::new(0.05, 0.3),
            origin: mount.origin,
            seed: mount.seed,
            anchor: Point::default(),
            reach: 0.0,
            particles: Vec::with_capacity(PARTICLE_COUNT),
        }
    }

    /// The particle batch.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Burst center in cell space.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    fn seed_particles(&mut self) {
        let mut rng = FxRng::new(self.seed);
        self.particles.clear();
        for _ in 0..PARTICLE_COUNT {
            let angle = rng.range_f32(0.0, std::f32::consts::TAU);
            let speed = rng.range_f32(12.0, 42.0);
            let color = rng.pick(&self.palette.sparks).unwrap_or(self.palette.glow);
            let shape = rng.pick(&SHAPES).unwrap_or(ParticleShape::Circle);
            let mut p = Particle::new(self.anchor.x, self.anchor.y, color, shape);
            p.vx = angle.cos() * speed;
            p.vy = angle.sin() * speed * CELL_ASPECT;
            p.size = rng.range_f32(0.6, 2.4);
            p.rotation = rng.range_f32(0.0, std::f32::consts::TAU);
            p.rotation_speed = rng.signed_unit() * 6.0;
            p.max_life = rng.range_f32(0.45, 1.0);
            self.particles.push(p);
        }
    }

    fn draw_shockwave(&self, p: f32, intensity: f32, surface: &mut FxSurface) {
        let grow = ease_out(segment(p, 0.0, 0.45));
        let thin = 1.0 - segment(p, 0.55, 0.8);
        if grow <= 0.0 || thin <= 0.0 {
            return;
        }
        let radius = grow * self.reach;
        surface.fill_disc(self.anchor, radius, self.palette.to_bg.with_opacity(thin));
        surface.stroke_ring(
            self.anchor,
            radius,
            2.0,
            self.palette.accent.with_opacity(intensity * thin),
        );
        surface.fill_glow(
            self.anchor,
            (radius * 0.35).max(3.0),
            self.palette.glow.with_opacity(0.6 * (1.0 - grow) * intensity),
        );
    }
}

impl TransitionFx for ParticleExplosionFx {
    fn kind(&self) -> EffectKind {
        EffectKind::ParticleExplosion
    }

    fn resize(&mut self, width: u16, height: u16) {
        let first = self.particles.is_empty();
        self.anchor = self
            .origin
            .unwrap_or_else(|| Point::new(f32::from(width) / 2.0, f32::from(height) / 2.0));
        // Cover the view with a little margin for the soft edge.
        self.reach = self.anchor.farthest_corner_distance(width, height) * 1.05 + 1.0;
        if first {
            self.seed_particles();
        }
    }

    fn render(&mut self, ctx: &FxContext, surface: &mut FxSurface) {
        let p = ctx.progress;
        let dt = ctx.dt_secs();
        for particle in &mut self.particles {
            particle.integrate(dt, GRAVITY, DAMPING);
        }

        let intensity = self.envelope.at(p);
        self.draw_shockwave(p, intensity, surface);
        if intensity <= 0.0 {
            return;
        }

        for particle in &self.particles {
            let alpha = intensity * particle.opacity(p);
            if alpha <= 0.0 {
                continue;
            }
            let len = particle.trail.len() as f32;
            for (i, point) in particle.trail.iter().enumerate() {
                let fade = (i as f32 + 1.0) / (len + 1.0);
                surface.put_glyph(
                    point.x.floor() as i32,
                    point.y.floor() as i32,
                    '·',
                    particle.color.with_opacity(alpha * fade * 0.6),
                );
            }
        }

        for particle in &self.particles {
            let alpha = intensity * particle.opacity(p);
            if alpha <= 0.0 {
                continue;
            }
            let color = particle.color.with_opacity(alpha);
            if particle.size > 1.6 {
                surface.fill_disc(
                    particle.position(),
                    particle.size * 0.5,
                    color.with_opacity(0.5),
                );
            }
            surface.put_glyph(
                particle.x.floor() as i32,
                particle.y.floor() as i32,
                particle.shape.glyph(particle.rotation),
                color,
            );
        }
    }
}
