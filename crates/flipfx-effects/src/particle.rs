#![forbid(unsafe_code)]

//! Particles for the physics-driven effects.
//!
//! Particles live in a batch allocated once per session and are mutated in
//! place every frame. Nothing is removed mid-run: a particle's visibility is
//! a pure function of overall progress and its `max_life`, so it fades out
//! instead of popping.

use flipfx_core::geometry::Point;
use flipfx_render::PackedRgba;

/// Positions remembered per particle for its trail.
pub const TRAIL_LEN: usize = 6;

/// How a particle head is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleShape {
    Circle,
    Square,
    /// Short streak oriented along `rotation`.
    Spark,
    Star,
    /// A fixed glyph (rain heads).
    Glyph(char),
}

impl ParticleShape {
    /// Glyph for a head with the given rotation (radians).
    pub fn glyph(self, rotation: f32) -> char {
        match self {
            Self::Circle => '●',
            Self::Square => {
                // Diamond when rotated near 45 degrees.
                let quarter = rotation.rem_euclid(std::f32::consts::FRAC_PI_2);
                if (quarter - std::f32::consts::FRAC_PI_4).abs() < 0.4 {
                    '◆'
                } else {
                    '■'
                }
            }
            Self::Spark => {
                let octant = (rotation.rem_euclid(std::f32::consts::PI)
                    / std::f32::consts::FRAC_PI_4)
                    .round() as u32
                    % 4;
                ['─', '╲', '│', '╱'][octant as usize]
            }
            Self::Star => '✦',
            Self::Glyph(ch) => ch,
        }
    }
}

/// Fixed-capacity ring of recent positions, oldest first on iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    points: [Point; TRAIL_LEN],
    head: usize,
    len: usize,
}

impl Trail {
    pub const fn new() -> Self {
        Self {
            points: [Point::new(0.0, 0.0); TRAIL_LEN],
            head: 0,
            len: 0,
        }
    }

    /// Record a position, overwriting the oldest once full.
    pub fn push(&mut self, p: Point) {
        self.points[self.head] = p;
        self.head = (self.head + 1) % TRAIL_LEN;
        self.len = (self.len + 1).min(TRAIL_LEN);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.head = 0;
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        let start = (self.head + TRAIL_LEN - self.len) % TRAIL_LEN;
        (0..self.len).map(move |i| self.points[(start + i) % TRAIL_LEN])
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

/// One simulated particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    /// Radians.
    pub rotation: f32,
    /// Radians per second.
    pub rotation_speed: f32,
    pub color: PackedRgba,
    pub shape: ParticleShape,
    pub trail: Trail,
    /// Fraction of overall progress at which the particle is fully faded.
    pub max_life: f32,
}

impl Particle {
    pub fn new(x: f32, y: f32, color: PackedRgba, shape: ParticleShape) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            size: 1.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            color,
            shape,
            trail: Trail::new(),
            max_life: 1.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Remaining life in [0, 1] at overall `progress`.
    #[inline]
    pub fn life(&self, progress: f32) -> f32 {
        if self.max_life <= 0.0 {
            return 0.0;
        }
        (1.0 - progress / self.max_life).clamp(0.0, 1.0)
    }

    /// Opacity at overall `progress`: a pure function of progress and `max_life`.
    #[inline]
    pub fn opacity(&self, progress: f32) -> f32 {
        let life = self.life(progress);
        // Ease the tail so particles linger, then vanish smoothly.
        life * (2.0 - life)
    }

    /// Explicit Euler step: gravity, then damping, then position and spin.
    ///
    /// `damping` is the per-second velocity retention factor.
    pub fn integrate(&mut self, dt: f32, gravity: f32, damping: f32) {
        if dt <= 0.0 {
            return;
        }
        self.trail.push(self.position());
        self.vy += gravity * dt;
        let keep = damping.clamp(0.0, 1.0).powf(dt);
        self.vx *= keep;
        self.vy *= keep;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.rotation += self.rotation_speed * dt;
    }
}
