//! Generation strategies: produce a fixed number of test cases per operation.

use std::collections::HashMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use restgen_core::{ApiSpec, Operation, SchemaRegistry, SemanticParameter, TestCase};

use crate::builder::TestCaseBuilder;
use crate::config::GenerationConfig;
use crate::dictionary::FuzzingDictionary;

/// A source of test cases for whole operations.
pub trait TestCaseGenerator {
    /// Generates the test cases for one operation, resetting any per-operation
    /// state first.
    fn generate_operation(&mut self, operation: &Operation, schemas: &SchemaRegistry) -> Vec<TestCase>;

    /// Generates test cases for every operation of `api`.
    fn generate(&mut self, api: &ApiSpec) -> Vec<TestCase> {
        let mut cases = Vec::new();
        for operation in api.operations() {
            cases.extend(self.generate_operation(operation, &api.schemas));
        }
        cases
    }
}

/// Dictionary-driven fuzzing.
///
/// Each operation gets exactly `number_of_tests` cases. Dictionary cursors
/// wrap around when more cases are requested than a dictionary holds.
/// Fuzzed cases never claim to fulfil dependencies and are not marked
/// faulty.
pub struct FuzzingStrategy {
    dictionary: FuzzingDictionary,
    number_of_tests: usize,
    generated: usize,
    rng: ChaCha8Rng,
}

impl FuzzingStrategy {
    pub fn new(config: &GenerationConfig) -> Self {
        Self::with_dictionary(config, FuzzingDictionary::default())
    }

    pub fn with_dictionary(config: &GenerationConfig, dictionary: FuzzingDictionary) -> Self {
        FuzzingStrategy {
            dictionary,
            number_of_tests: config.number_of_tests,
            generated: 0,
            rng: config.rng(),
        }
    }

    /// True while fewer than `number_of_tests` cases have been generated for
    /// the current operation.
    pub fn has_next(&self) -> bool {
        self.generated < self.number_of_tests
    }

    fn reset_operation(&mut self) {
        self.generated = 0;
    }
}

impl TestCaseGenerator for FuzzingStrategy {
    fn generate_operation(&mut self, operation: &Operation, schemas: &SchemaRegistry) -> Vec<TestCase> {
        self.reset_operation();
        let mut builder = TestCaseBuilder::fuzzing(operation, &self.dictionary);

        let mut cases = Vec::with_capacity(self.number_of_tests);
        while self.has_next() {
            let mut tc = builder.build(operation, schemas, &mut self.rng, false);
            tc.fulfills_dependencies = false;
            tc.faulty = false;
            cases.push(tc);
            self.generated += 1;
        }

        info!(operation = %operation.id, count = cases.len(), "generated fuzzing test cases");
        cases
    }
}

/// Uniform sampling from each parameter's declared domain.
pub struct RandomStrategy {
    number_of_tests: usize,
    faulty_ratio: f32,
    rng: ChaCha8Rng,
}

impl RandomStrategy {
    pub fn new(config: &GenerationConfig) -> Self {
        RandomStrategy {
            number_of_tests: config.number_of_tests,
            faulty_ratio: config.faulty_ratio,
            rng: config.rng(),
        }
    }
}

impl TestCaseGenerator for RandomStrategy {
    fn generate_operation(&mut self, operation: &Operation, schemas: &SchemaRegistry) -> Vec<TestCase> {
        let mut builder = TestCaseBuilder::random(operation);
        let cases = run_builder(
            &mut builder,
            operation,
            schemas,
            self.number_of_tests,
            self.faulty_ratio,
            &mut self.rng,
        );
        info!(operation = %operation.id, count = cases.len(), "generated random test cases");
        cases
    }
}

/// Knowledge-base informed generation.
///
/// Parameters with a [`SemanticParameter`] draw from its harvested values;
/// every other parameter (and any semantic parameter without values) is
/// sampled randomly.
pub struct SemanticStrategy {
    semantic: HashMap<String, Vec<SemanticParameter>>,
    number_of_tests: usize,
    faulty_ratio: f32,
    rng: ChaCha8Rng,
}

impl SemanticStrategy {
    /// `semantic` maps operation ids to their semantic parameters.
    pub fn new(config: &GenerationConfig, semantic: HashMap<String, Vec<SemanticParameter>>) -> Self {
        SemanticStrategy {
            semantic,
            number_of_tests: config.number_of_tests,
            faulty_ratio: config.faulty_ratio,
            rng: config.rng(),
        }
    }

    /// Replaces the semantic parameters of one operation (e.g. after new
    /// values were learned from execution feedback).
    pub fn update_operation(&mut self, operation_id: &str, parameters: Vec<SemanticParameter>) {
        self.semantic.insert(operation_id.to_string(), parameters);
    }
}

impl TestCaseGenerator for SemanticStrategy {
    fn generate_operation(&mut self, operation: &Operation, schemas: &SchemaRegistry) -> Vec<TestCase> {
        let parameters = self
            .semantic
            .get(&operation.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut builder = TestCaseBuilder::semantic(operation, parameters);
        let cases = run_builder(
            &mut builder,
            operation,
            schemas,
            self.number_of_tests,
            self.faulty_ratio,
            &mut self.rng,
        );
        info!(operation = %operation.id, count = cases.len(), "generated semantic test cases");
        cases
    }
}

fn run_builder(
    builder: &mut TestCaseBuilder,
    operation: &Operation,
    schemas: &SchemaRegistry,
    count: usize,
    faulty_ratio: f32,
    rng: &mut ChaCha8Rng,
) -> Vec<TestCase> {
    (0..count)
        .map(|_| {
            let faulty = faulty_ratio > 0.0 && rng.gen::<f32>() < faulty_ratio;
            builder.build(operation, schemas, rng, faulty)
        })
        .collect()
}
