#![forbid(unsafe_code)]

//! Falling-glyph rain.
//!
//! One drop per surface column. Each drop is a [`Particle`] falling at a
//! constant per-column speed; every row it crosses writes a [`TrailCell`]
//! into that column's trail buffer. Trail cells age by one per new row and
//! are evicted once older than [`MAX_AGE`], so the tail fades without the
//! buffer ever growing.
//!
//! # Algorithm
//!
//! Per frame:
//! - advance each head by `speed * dt`
//! - for every row crossed: age the trail, push a fresh cell, evict stale ones
//! - once a column's whole tail has left the surface, recycle its drop back
//!   above the top edge with a new speed (never reallocated)
//!
//! A translucent veil cross-fades from the outgoing to the incoming
//! background around the midpoint, hiding the theme flip underneath.
//!
//! # Determinism
//!
//! All draws come from one xorshift32 stream seeded by the session seed.

use std::collections::VecDeque;

use flipfx_core::animation::{Envelope, smoothstep};
use flipfx_render::{FxSurface, PackedRgba};

use crate::palette::{TransitionPalette, lerp_color};
use crate::particle::{Particle, ParticleShape};
use crate::protocol::{EffectKind, EffectMount, FxContext, TransitionFx};
use crate::rng::FxRng;

/// Rows a trail cell survives before eviction.
pub const MAX_AGE: u8 = 12;

const MIN_SPEED: f32 = 14.0;
const MAX_SPEED: f32 = 34.0;
const VEIL_ALPHA: f32 = 0.55;

/// Halfwidth katakana and digits: all single-cell.
const GLYPHS: [char; 30] = [
    'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ', 'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', 'ﾀ', 'ﾁ', 'ﾂ', 'ﾃ',
    'ﾄ', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// One glyph left behind by a falling head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailCell {
    pub row: i32,
    pub glyph: char,
    /// Rows the head has fallen since this cell was written.
    pub age: u8,
}

#[derive(Debug, Clone)]
struct Column {
    head: Particle,
    /// Oldest at the front.
    trail: VecDeque<TrailCell>,
    /// Last row a trail cell was written for.
    last_row: i32,
}

impl Column {
    fn new(x: usize, height: u16, rng: &mut FxRng) -> Self {
        let mut column = Self {
            head: Particle::new(x as f32, 0.0, PackedRgba::WHITE, ParticleShape::Glyph('0')),
            trail: VecDeque::with_capacity(usize::from(MAX_AGE) + 2),
            last_row: 0,
        };
        // Stagger the initial drops over the top half of the screen.
        let start = -rng.range_f32(0.0, f32::from(height) * 0.6 + 1.0);
        column.respawn(start, rng);
        column
    }

    fn respawn(&mut self, y: f32, rng: &mut FxRng) {
        self.head.y = y;
        self.head.vy = rng.range_f32(MIN_SPEED, MAX_SPEED);
        self.head.max_life = rng.range_f32(0.9, 1.3);
        self.head.shape = ParticleShape::Glyph(rng.pick(&GLYPHS).unwrap_or('0'));
        self.trail.clear();
        self.last_row = y.floor() as i32 - 1;
    }

    /// Fall for `dt` seconds, writing trail cells for every row crossed.
    fn advance(&mut self, dt: f32, rng: &mut FxRng) {
        self.head.y += self.head.vy * dt;
        let row = self.head.y.floor() as i32;
        while self.last_row < row {
            self.last_row += 1;
            for cell in &mut self.trail {
                cell.age = cell.age.saturating_add(1);
            }
            while self.trail.front().is_some_and(|c| c.age > MAX_AGE) {
                self.trail.pop_front();
            }
            let glyph = rng.pick(&GLYPHS).unwrap_or('0');
            self.head.shape = ParticleShape::Glyph(glyph);
            self.trail.push_back(TrailCell {
                row: self.last_row,
                glyph,
                age: 0,
            });
        }
    }

    /// True once the head and its whole tail are below the bottom edge.
    fn is_spent(&self, height: u16) -> bool {
        let top_of_tail = self.trail.front().map_or(self.last_row, |c| c.row);
        top_of_tail >= i32::from(height)
    }
}

/// Matrix-style rain transition.
#[derive(Debug, Clone)]
pub struct RainFx {
    palette: TransitionPalette,
    envelope: Envelope,
    rng: FxRng,
    columns: Vec<Column>,
    height: u16,
}

impl RainFx {
    pub fn new(mount: &EffectMount) -> Self {
        Self {
            palette: TransitionPalette::for_transition(mount.was_dark),
            envelope: Envelope::new(0.15, 0.25),
            rng: FxRng::new(mount.seed),
            columns: Vec::new(),
            height: 0,
        }
    }

    /// Number of simulated columns.
    pub fn columns(&self) -> usize {
        self.columns.len()
    }

    /// Longest trail buffer across all columns.
    pub fn longest_trail(&self) -> usize {
        self.columns.iter().map(|c| c.trail.len()).max().unwrap_or(0)
    }

    /// Trail cells of one column, oldest first.
    pub fn trail(&self, column: usize) -> impl Iterator<Item = &TrailCell> + '_ {
        self.columns
            .get(column)
            .into_iter()
            .flat_map(|c| c.trail.iter())
    }
}

impl TransitionFx for RainFx {
    fn kind(&self) -> EffectKind {
        EffectKind::Rain
    }

    /// Existing drops keep falling across a resize. Only columns that
    /// appear or disappear with the width change are created or dropped;
    /// heads left below a shorter surface recycle once their tail clears.
    fn resize(&mut self, width: u16, height: u16) {
        self.height = height;
        let width = usize::from(width);
        self.columns.truncate(width);
        let rng = &mut self.rng;
        let start = self.columns.len();
        self.columns.extend((start..width).map(|x| Column::new(x, height, rng)));
    }

    fn render(&mut self, ctx: &FxContext, surface: &mut FxSurface) {
        let p = ctx.progress;
        let intensity = self.envelope.at(p);
        let dt = ctx.dt_secs();
        let height = self.height;

        for column in &mut self.columns {
            column.advance(dt, &mut self.rng);
            if column.is_spent(height) {
                let y = -self.rng.range_f32(1.0, f32::from(height) * 0.3 + 2.0);
                column.respawn(y, &mut self.rng);
            }
        }

        if intensity <= 0.0 {
            return;
        }

        let veil = lerp_color(
            self.palette.from_bg,
            self.palette.to_bg,
            smoothstep(0.4, 0.6, p),
        );
        surface.fill_rect(
            0,
            0,
            i32::from(surface.width()),
            i32::from(surface.height()),
            veil.with_opacity(intensity * VEIL_ALPHA),
        );

        let fade_span = f32::from(MAX_AGE) + 1.0;
        for (x, column) in self.columns.iter().enumerate() {
            for cell in &column.trail {
                let fade = 1.0 - f32::from(cell.age) / fade_span;
                surface.put_glyph(
                    x as i32,
                    cell.row,
                    cell.glyph,
                    self.palette.accent.with_opacity(intensity * fade * fade),
                );
            }
        }

        for (x, column) in self.columns.iter().enumerate() {
            let head = &column.head;
            let alpha = intensity * head.opacity(p).max(0.35);
            surface.put_glyph(
                x as i32,
                head.y.floor() as i32,
                head.shape.glyph(head.rotation),
                self.palette.glow.with_opacity(alpha),
            );
        }
    }
}
