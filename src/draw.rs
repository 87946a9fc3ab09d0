use crate::formula::Formula;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Largest seed a caller may pass: any non-negative 31-bit integer.
pub const MAX_SEED: u32 = i32::MAX as u32;

/// Exclusive upper bound of generated seeds.
pub const SEED_LIMIT: u32 = MAX_SEED;

/// Deterministic formula picker. One per run, used only while building the
/// tree so the tree depends on nothing but `(seed, generations)`.
pub struct SeededDraw {
    rng: StdRng,
    draws: u64,
}

impl SeededDraw {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed as u64),
            draws: 0,
        }
    }

    pub fn pick(&mut self, from: &[Formula]) -> Formula {
        self.draws += 1;
        from[self.rng.gen_range(0..from.len())]
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}

/// A fresh seed in `[0, SEED_LIMIT)` from the thread-local entropy source.
pub fn fresh_seed() -> u32 {
    rand::thread_rng().gen_range(0..SEED_LIMIT)
}

/// Independent source for the noise color models. Never shares state with
/// a [`SeededDraw`].
pub fn noise_source() -> StdRng {
    StdRng::from_entropy()
}
