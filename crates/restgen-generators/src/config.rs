//! Generation settings shared by all strategies.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Settings for a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Test cases generated per operation.
    pub number_of_tests: usize,
    /// Random seed for reproducibility (drawn from the thread RNG if absent).
    pub seed: Option<u64>,
    /// Probability that a random or semantic test case deliberately carries
    /// one invalid value and is marked faulty.
    pub faulty_ratio: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            number_of_tests: 10,
            seed: None,
            faulty_ratio: 0.0,
        }
    }
}

impl GenerationConfig {
    pub fn with_tests(number_of_tests: usize) -> Self {
        GenerationConfig {
            number_of_tests,
            ..GenerationConfig::default()
        }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The PRNG for this run.
    pub fn rng(&self) -> ChaCha8Rng {
        seeded_rng(self.seed)
    }
}

/// Builds a ChaCha PRNG from `seed`, or from a fresh random seed.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    ChaCha8Rng::seed_from_u64(seed)
}
