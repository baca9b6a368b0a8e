//! The value generator variants behind one interface.

use rand_chacha::ChaCha8Rng;

use crate::dictionary::FuzzIterator;
use crate::random::RandomSampler;
use crate::semantic::SemanticGenerator;

/// Produces the next value for one parameter as a string.
#[derive(Debug, Clone, PartialEq)]
pub enum Generator {
    /// Walks a fuzzing dictionary (stateful cursor).
    Fuzz(FuzzIterator),
    /// Samples the parameter's declared domain.
    Random(RandomSampler),
    /// Draws knowledge-base values, falling back to random sampling.
    Semantic(SemanticGenerator),
}

impl Generator {
    pub fn next_value(&mut self, rng: &mut ChaCha8Rng) -> String {
        match self {
            Generator::Fuzz(it) => it.next_value(),
            Generator::Random(sampler) => sampler.next_value(rng),
            Generator::Semantic(gen) => gen.next_value(rng),
        }
    }

    /// A value outside the parameter's domain, when one can be produced.
    ///
    /// Fuzz values are adversarial by construction but not known to be
    /// invalid, so the fuzzing variant never offers one.
    pub fn next_invalid_value(&mut self, rng: &mut ChaCha8Rng) -> Option<String> {
        match self {
            Generator::Fuzz(_) => None,
            Generator::Random(sampler) => sampler.next_invalid_value(rng),
            Generator::Semantic(gen) => gen.next_invalid_value(rng),
        }
    }

    /// Restarts any internal cursor.
    pub fn reset(&mut self) {
        if let Generator::Fuzz(it) = self {
            it.reset();
        }
    }
}
