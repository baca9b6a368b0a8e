//! Assembles complete test cases for one operation.
//!
//! A [`TestCaseBuilder`] holds one [`Generator`] per parameter slot of its
//! operation, in parameter order. Body parameters are normally built by the
//! schema walker in [`crate::body`]; their slot generator is only used when
//! the operation has no usable body schema.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use restgen_core::{
    Operation, Parameter, SchemaRegistry, SemanticParameter, TestCase, TestCaseId,
};

use crate::body::{build_body, BodyMode};
use crate::dictionary::FuzzingDictionary;
use crate::generator::Generator;
use crate::random::RandomSampler;
use crate::semantic::SemanticGenerator;

/// Per-operation generator bindings.
#[derive(Debug, Clone)]
pub struct TestCaseBuilder {
    operation_id: String,
    slots: Vec<Generator>,
    body_mode: BodyMode,
}

impl TestCaseBuilder {
    /// Binds a generator to every parameter of `operation` using `bind`.
    pub fn bind<F>(operation: &Operation, body_mode: BodyMode, mut bind: F) -> Self
    where
        F: FnMut(usize, &Parameter) -> Generator,
    {
        let slots = operation
            .parameters
            .iter()
            .enumerate()
            .map(|(idx, param)| bind(idx, param))
            .collect();
        TestCaseBuilder {
            operation_id: operation.id.clone(),
            slots,
            body_mode,
        }
    }

    /// Dictionary-fuzzing bindings: each parameter walks
    /// `dictionary(type) ∪ enum`.
    pub fn fuzzing(operation: &Operation, dictionary: &FuzzingDictionary) -> Self {
        Self::bind(
            operation,
            BodyMode::Fuzz(dictionary.clone()),
            |_, param| {
                let enums = param.enum_values.as_deref().unwrap_or_default();
                Generator::Fuzz(dictionary.iterator(param.param_type, enums))
            },
        )
    }

    /// Random-sampling bindings.
    pub fn random(operation: &Operation) -> Self {
        Self::bind(operation, BodyMode::Random, |_, param| {
            Generator::Random(RandomSampler::for_parameter(param))
        })
    }

    /// Semantic bindings for the parameters in `semantic`, random sampling
    /// for the rest.
    pub fn semantic(operation: &Operation, semantic: &[SemanticParameter]) -> Self {
        Self::bind(operation, BodyMode::Random, |idx, param| {
            match semantic.iter().find(|s| s.index == idx) {
                Some(sp) => Generator::Semantic(SemanticGenerator::new(sp)),
                None => Generator::Random(RandomSampler::for_parameter(param)),
            }
        })
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn slot(&self, index: usize) -> Option<&Generator> {
        self.slots.get(index)
    }

    /// Restarts every generator cursor.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.reset();
        }
    }

    /// Builds one test case for `operation`.
    ///
    /// Every required parameter is included; an optional one is included
    /// when a uniform draw is at most its weight (always, if it has none).
    /// With `faulty` set, one included non-body parameter whose generator
    /// can produce an invalid value receives one and the case is marked
    /// faulty.
    pub fn build(
        &mut self,
        operation: &Operation,
        schemas: &SchemaRegistry,
        rng: &mut ChaCha8Rng,
        faulty: bool,
    ) -> TestCase {
        debug_assert_eq!(operation.id, self.operation_id);

        let mut tc = TestCase::template(TestCaseId::from_random_bytes(rng.gen()), operation);
        tc.fulfills_dependencies = !operation.has_dependencies();

        let mut included = Vec::new();
        for (idx, param) in operation.parameters.iter().enumerate() {
            if !(param.required || param.weight.map_or(true, |w| rng.gen::<f32>() <= w)) {
                continue;
            }
            let value = if param.is_body() {
                self.body_value(idx, param, operation, schemas, rng)
            } else {
                included.push(idx);
                self.slot_value(idx, param, rng)
            };
            tc.add_parameter(param, value);
        }

        if faulty {
            included.shuffle(rng);
            for idx in included {
                let Some(slot) = self.slots.get_mut(idx) else {
                    continue;
                };
                if let Some(invalid) = slot.next_invalid_value(rng) {
                    tc.add_parameter(&operation.parameters[idx], invalid);
                    tc.faulty = true;
                    break;
                }
            }
        }

        tc
    }

    fn slot_value(&mut self, idx: usize, param: &Parameter, rng: &mut ChaCha8Rng) -> String {
        match self.slots.get_mut(idx) {
            Some(slot) => slot.next_value(rng),
            None => RandomSampler::for_parameter(param).next_value(rng),
        }
    }

    fn body_value(
        &mut self,
        idx: usize,
        param: &Parameter,
        operation: &Operation,
        schemas: &SchemaRegistry,
        rng: &mut ChaCha8Rng,
    ) -> String {
        if let Some(schema) = &operation.request_body {
            match build_body(schema, schemas, &self.body_mode, rng) {
                Ok(body) => {
                    if let Ok(rendered) = serde_json::to_string_pretty(&body) {
                        return rendered;
                    }
                }
                Err(err) => {
                    debug!(operation = %operation.id, "body schema unusable, using flat generator: {}", err);
                }
            }
        }
        self.slot_value(idx, param, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use restgen_core::{HttpMethod, ParamLocation, ParamType, Schema};

    fn operation() -> Operation {
        Operation::new("addPet", "/pets/{owner}", HttpMethod::Post)
            .with_parameter(
                Parameter::new("owner", ParamLocation::Path, ParamType::Integer)
                    .required()
                    .with_range(Some(1.0), Some(10.0)),
            )
            .with_parameter(
                Parameter::new("trace", ParamLocation::Header, ParamType::String).with_weight(0.0),
            )
            .with_parameter(Parameter::new("body", ParamLocation::Body, ParamType::Object))
            .with_body(Schema::object([("name", Schema::of_type(ParamType::String))]))
    }

    #[test]
    fn zero_weight_parameters_are_skipped() {
        let op = operation();
        let mut builder = TestCaseBuilder::random(&op);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let tc = builder.build(&op, &SchemaRegistry::new(), &mut rng, false);
            assert!(tc.value("trace", ParamLocation::Header).is_none());
            assert!(tc.value("owner", ParamLocation::Path).is_some());
        }
    }

    #[test]
    fn body_is_built_from_schema() {
        let op = operation();
        let mut builder = TestCaseBuilder::random(&op);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let tc = builder.build(&op, &SchemaRegistry::new(), &mut rng, false);
        let body: serde_json::Value =
            serde_json::from_str(tc.value("body", ParamLocation::Body).unwrap()).unwrap();
        assert!(body["name"].is_string());
    }

    #[test]
    fn unusable_body_schema_falls_back_to_flat_generator() {
        let op = Operation {
            request_body: Some(Schema::reference("#/components/schemas/Missing")),
            ..operation()
        };
        let mut builder = TestCaseBuilder::fuzzing(&op, &FuzzingDictionary::default());
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let tc = builder.build(&op, &SchemaRegistry::new(), &mut rng, false);
        // First entry of the string dictionary, from the body slot's cursor.
        assert_eq!(tc.value("body", ParamLocation::Body), Some(""));
    }

    #[test]
    fn faulty_request_marks_case_and_breaks_domain() {
        let op = operation();
        let mut builder = TestCaseBuilder::random(&op);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let tc = builder.build(&op, &SchemaRegistry::new(), &mut rng, true);
        assert!(tc.faulty);
        let owner: i64 = tc.value("owner", ParamLocation::Path).unwrap().parse().unwrap();
        assert!(owner > 10);
    }

    #[test]
    fn dependencies_clear_the_flag() {
        let op = operation().with_dependency("IF name THEN owner");
        let mut builder = TestCaseBuilder::random(&op);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let tc = builder.build(&op, &SchemaRegistry::new(), &mut rng, false);
        assert!(!tc.fulfills_dependencies);
    }

    #[test]
    fn same_seed_same_cases() {
        let op = operation();
        let mut a = TestCaseBuilder::random(&op);
        let mut b = TestCaseBuilder::random(&op);
        let (mut ra, mut rb) = (ChaCha8Rng::seed_from_u64(5), ChaCha8Rng::seed_from_u64(5));
        let reg = SchemaRegistry::new();
        assert_eq!(a.build(&op, &reg, &mut ra, false), b.build(&op, &reg, &mut rb, false));
    }
}
