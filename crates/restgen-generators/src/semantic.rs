//! Generator backed by knowledge-base values.

use rand::seq::IteratorRandom;
use rand_chacha::ChaCha8Rng;

use restgen_core::SemanticParameter;

use crate::random::RandomSampler;

/// Draws values harvested for a [`SemanticParameter`].
///
/// Valid values come from the parameter's valid set; invalid values from
/// its invalid set. When a set is empty (the predicate could not be
/// resolved, or the knowledge base was unreachable) the generator falls
/// back to sampling the parameter's declared domain.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticGenerator {
    valid: Vec<String>,
    invalid: Vec<String>,
    fallback: RandomSampler,
}

impl SemanticGenerator {
    pub fn new(parameter: &SemanticParameter) -> Self {
        SemanticGenerator {
            valid: parameter.valid_values().iter().cloned().collect(),
            invalid: parameter.invalid_values().iter().cloned().collect(),
            fallback: RandomSampler::for_parameter(&parameter.parameter),
        }
    }

    /// True when neither value set holds anything.
    pub fn is_degraded(&self) -> bool {
        self.valid.is_empty() && self.invalid.is_empty()
    }

    pub fn next_value(&mut self, rng: &mut ChaCha8Rng) -> String {
        match self.valid.iter().choose(rng) {
            Some(value) => value.clone(),
            None => self.fallback.next_value(rng),
        }
    }

    pub fn next_invalid_value(&mut self, rng: &mut ChaCha8Rng) -> Option<String> {
        match self.invalid.iter().choose(rng) {
            Some(value) => Some(value.clone()),
            None => self.fallback.next_invalid_value(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use restgen_core::{ParamLocation, ParamType, Parameter};

    fn semantic_param() -> SemanticParameter {
        SemanticParameter::new(
            0,
            Parameter::new("country", ParamLocation::Query, ParamType::String)
                .with_length(Some(2), Some(2)),
        )
    }

    #[test]
    fn draws_from_valid_values() {
        let mut p = semantic_param();
        p.add_valid(["ES".to_string(), "FR".to_string()]);
        p.add_invalid(["Narnia".to_string()]);
        let mut gen = SemanticGenerator::new(&p);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(!gen.is_degraded());
        for _ in 0..20 {
            assert!(["ES", "FR"].contains(&gen.next_value(&mut rng).as_str()));
        }
        assert_eq!(gen.next_invalid_value(&mut rng).as_deref(), Some("Narnia"));
    }

    #[test]
    fn degrades_to_random_sampling() {
        let p = semantic_param();
        let mut gen = SemanticGenerator::new(&p);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(gen.is_degraded());
        for _ in 0..20 {
            assert_eq!(gen.next_value(&mut rng).len(), 2);
        }
    }
}
