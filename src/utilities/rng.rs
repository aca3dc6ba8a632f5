use rand::{Rng, SeedableRng, rngs::StdRng};

pub trait RandomSource {
    /// Uniform index in `0..upper`. `upper` must be non-zero.
    fn next_index(&mut self, upper: usize) -> usize;

    /// Uniform float in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<R: Rng> RandomSource for R {
    #[inline]
    fn next_index(&mut self, upper: usize) -> usize {
        self.random_range(0..upper)
    }

    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Fresh seed from the thread-local OS-seeded generator.
pub fn entropy_seed() -> u64 {
    rand::random::<u64>()
}
