//! Deterministic RNG wrapper using PCG32, and the seed-deriving random state.
//!
//! All corruptions MUST use this module for random number generation so that
//! equal (image, severity, seed) triples replay bit-for-bit.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson, StandardNormal};
use rand_pcg::Pcg32;
use tracing::trace;

use crate::error::{CorruptError, Result};

/// Largest seed handed out by [`RandomState::derive_seed`].
pub const SEED_MAX: u32 = i32::MAX as u32;

/// Wrapper around PCG32 for deterministic random number generation.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    inner: Pcg32,
}

impl DeterministicRng {
    /// Create a new RNG from a 32-bit seed.
    ///
    /// The seed is expanded to 64 bits by duplicating the bits.
    pub fn new(seed: u32) -> Self {
        let seed64 = (seed as u64) | ((seed as u64) << 32);
        Self {
            inner: Pcg32::seed_from_u64(seed64),
        }
    }

    /// Create an RNG from operating system entropy. Not reproducible.
    pub fn from_entropy() -> Self {
        Self {
            inner: Pcg32::from_entropy(),
        }
    }

    /// Derive a seed for a numbered stage using BLAKE3.
    pub fn derive_layer_seed(base_seed: u32, layer_index: u32) -> u32 {
        let mut input = Vec::with_capacity(8);
        input.extend_from_slice(&base_seed.to_le_bytes());
        input.extend_from_slice(&layer_index.to_le_bytes());
        first_u32(blake3::hash(&input))
    }

    /// Derive a seed for a named stage using BLAKE3.
    pub fn derive_variant_seed(base_seed: u32, variant_id: &str) -> u32 {
        let mut input = Vec::with_capacity(4 + variant_id.len());
        input.extend_from_slice(&base_seed.to_le_bytes());
        input.extend_from_slice(variant_id.as_bytes());
        first_u32(blake3::hash(&input))
    }

    /// Generate a random f64 in the range [0.0, 1.0).
    #[inline]
    pub fn gen_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Generate a random u32.
    #[inline]
    pub fn gen_u32(&mut self) -> u32 {
        self.inner.gen::<u32>()
    }

    /// Generate a random value in the given range.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.inner.gen_range(range)
    }

    /// Generate a random f64 in the range [-1.0, 1.0).
    #[inline]
    pub fn gen_signed_f64(&mut self) -> f64 {
        self.gen_f64() * 2.0 - 1.0
    }

    /// Sample from a normal distribution.
    #[inline]
    pub fn gen_normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = StandardNormal.sample(&mut self.inner);
        mean + z * std_dev
    }

    /// Sample from a Poisson distribution. A non-positive or non-finite rate
    /// yields 0.
    #[inline]
    pub fn gen_poisson(&mut self, lambda: f64) -> f64 {
        if !lambda.is_finite() {
            return 0.0;
        }
        match Poisson::new(lambda) {
            Ok(dist) => dist.sample(&mut self.inner),
            Err(_) => 0.0,
        }
    }
}

fn first_u32(hash: blake3::Hash) -> u32 {
    let b = hash.as_bytes();
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Validate a caller-supplied seed of any integer type.
///
/// Negative seeds and seeds wider than 32 bits are rejected.
pub fn checked_seed<S>(seed: S) -> Result<u32>
where
    S: TryInto<u32> + Copy + std::fmt::Display,
{
    seed.try_into().map_err(|_| {
        CorruptError::InvalidArgument(format!(
            "seed must be a non-negative 32-bit integer, got {}",
            seed
        ))
    })
}

/// A random state with an advancing cursor.
///
/// Every [`derive_seed`](Self::derive_seed) call moves the cursor, so
/// successive seeds from the same root form a reproducible, non-repeating
/// sequence. Not thread-safe: concurrent callers should each own a state,
/// e.g. via [`derive_child`](Self::derive_child).
#[derive(Debug, Clone)]
pub struct RandomState {
    rng: DeterministicRng,
}

impl RandomState {
    /// Create a state rooted at the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
        }
    }

    /// Create a state from operating system entropy. Not reproducible.
    pub fn from_entropy() -> Self {
        Self {
            rng: DeterministicRng::from_entropy(),
        }
    }

    /// Derive the next integer seed in `[0, SEED_MAX]` and advance the cursor.
    pub fn derive_seed(&mut self) -> u32 {
        let seed = self.rng.gen_range(0..=SEED_MAX);
        trace!(seed, "derived seed");
        seed
    }

    /// Derive `n` seeds in order.
    pub fn derive_seeds(&mut self, n: usize) -> Vec<u32> {
        (0..n).map(|_| self.derive_seed()).collect()
    }

    /// Derive an independent child state, advancing this state's cursor once.
    pub fn derive_child(&mut self) -> RandomState {
        RandomState::new(self.derive_seed())
    }

    /// Copy the state without advancing it.
    pub fn duplicate(&self) -> RandomState {
        self.clone()
    }

    /// Direct access to the underlying RNG, for parameter sampling.
    pub fn rng_mut(&mut self) -> &mut DeterministicRng {
        &mut self.rng
    }
}
