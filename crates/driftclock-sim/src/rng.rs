//! The single random source behind every stochastic decision.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Random number context shared by spawning, dripping and breezes.
///
/// Seeding it makes a run reproducible given the same obstacle history.
#[derive(Debug, Clone)]
pub struct GrainRng {
    inner: StdRng,
}

impl GrainRng {
    /// Deterministic stream for replays and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Stream seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Uniform fraction in `[0, 1)`.
    pub fn frac(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    /// Fair coin.
    pub fn coinflip(&mut self) -> bool {
        self.inner.random::<bool>()
    }

    /// True with probability `p` (values outside `[0, 1]` saturate).
    pub fn chance(&mut self, p: f64) -> bool {
        self.frac() < p
    }

    /// Uniform integer in `[0, n)`, or zero when `n` is zero.
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.inner.random_range(0..n)
    }
}
