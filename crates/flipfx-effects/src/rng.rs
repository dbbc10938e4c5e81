#![forbid(unsafe_code)]

//! Deterministic xorshift32 RNG shared by all effects.
//!
//! Effects seed it from the session seed (and, for per-frame draws, the frame
//! number), so identical inputs always render identical frames.

/// Deterministic xorshift32 step.
#[inline]
pub fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Fold a frame number into a seed.
#[inline]
pub fn mix_seed(seed: u32, frame: u64) -> u32 {
    let folded = (frame as u32) ^ ((frame >> 32) as u32);
    seed ^ folded.wrapping_mul(0x9E37_79B9)
}

/// Small wrapper around [`xorshift32`] with convenience draws.
#[derive(Debug, Clone)]
pub struct FxRng {
    state: u32,
}

impl FxRng {
    /// Zero is not a valid xorshift state, so the low bit is forced on.
    pub fn new(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        xorshift32(&mut self.state)
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[lo, hi)`.
    #[inline]
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform in `[-1, 1)`.
    #[inline]
    pub fn signed_unit(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }

    /// Uniform integer in `[0, n)`; `0` when `n == 0`.
    #[inline]
    pub fn below(&mut self, n: u32) -> u32 {
        if n == 0 { 0 } else { self.next_u32() % n }
    }

    /// Random element of `items`.
    #[inline]
    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        Some(items[self.below(items.len() as u32) as usize])
    }
}
