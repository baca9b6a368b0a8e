//! The optimization context: what is being tested, how candidate test
//! cases are generated and how solutions are scored.

use std::collections::HashMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use restgen_core::{ApiSpec, Operation, SemanticParameter, TestCase};
use restgen_generators::TestCaseBuilder;

use crate::error::SearchError;
use crate::objective::{Direction, ObjectiveFunction};
use crate::solution::Solution;

/// What the search generates test cases for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// A single operation, by id.
    Operation(String),
    /// Every operation of the API.
    Api,
}

pub struct Problem {
    api: ApiSpec,
    target: SearchTarget,
    objectives: Vec<Box<dyn ObjectiveFunction>>,
    /// Operations in [`ApiSpec::operations`] order, each with its builder.
    operations: Vec<Operation>,
    builders: Vec<TestCaseBuilder>,
    /// Operation indices grouped by path; a single group for one operation.
    paths: Vec<Vec<usize>>,
    variables: usize,
    faulty_ratio: f32,
}

impl std::fmt::Debug for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("api", &self.api.title)
            .field("target", &self.target)
            .field("objectives", &self.objective_names())
            .field("variables", &self.variables)
            .finish()
    }
}

impl Problem {
    /// Builds a problem with random-sampling generators.
    ///
    /// The suite length is the target operation's parameter count plus one,
    /// or the number of paths when the whole API is targeted.
    pub fn new(
        api: ApiSpec,
        target: SearchTarget,
        objectives: Vec<Box<dyn ObjectiveFunction>>,
    ) -> Result<Self, SearchError> {
        if objectives.is_empty() {
            return Err(SearchError::NoObjectives);
        }

        let operations: Vec<Operation> = api.operations().cloned().collect();
        let builders = operations.iter().map(TestCaseBuilder::random).collect();
        let (paths, variables) = match &target {
            SearchTarget::Operation(id) => {
                let operation = api.operation(id)?;
                let index = api.operation_index(id).ok_or(SearchError::EmptyApi)?;
                (vec![vec![index]], operation.parameters.len() + 1)
            }
            SearchTarget::Api => {
                let mut next = 0;
                let mut paths = Vec::new();
                for path in &api.paths {
                    let indices: Vec<usize> = (next..next + path.operations.len()).collect();
                    next += path.operations.len();
                    if !indices.is_empty() {
                        paths.push(indices);
                    }
                }
                let variables = paths.len();
                (paths, variables)
            }
        };
        if paths.is_empty() {
            return Err(SearchError::EmptyApi);
        }

        Ok(Problem {
            api,
            target,
            objectives,
            operations,
            builders,
            paths,
            variables,
            faulty_ratio: 0.0,
        })
    }

    /// Binds semantic generators for the operations in `semantic`.
    pub fn with_semantic(mut self, semantic: &HashMap<String, Vec<SemanticParameter>>) -> Self {
        for (builder, operation) in self.builders.iter_mut().zip(&self.operations) {
            if let Some(parameters) = semantic.get(&operation.id) {
                *builder = TestCaseBuilder::semantic(operation, parameters);
            }
        }
        self
    }

    pub fn with_faulty_ratio(mut self, faulty_ratio: f32) -> Self {
        self.faulty_ratio = faulty_ratio;
        self
    }

    pub fn api(&self) -> &ApiSpec {
        &self.api
    }

    pub fn target(&self) -> &SearchTarget {
        &self.target
    }

    pub fn number_of_variables(&self) -> usize {
        self.variables
    }

    pub fn directions(&self) -> Vec<Direction> {
        self.objectives.iter().map(|o| o.direction()).collect()
    }

    pub fn objective_names(&self) -> Vec<&str> {
        self.objectives.iter().map(|o| o.name()).collect()
    }

    /// Generates one test case for a random operation of the target: a
    /// random path, then a random operation on it.
    pub fn random_test_case(&mut self, rng: &mut ChaCha8Rng) -> TestCase {
        // `paths` is never empty and holds no empty group.
        let path = &self.paths[rng.gen_range(0..self.paths.len())];
        let index = path[rng.gen_range(0..path.len())];
        let faulty = self.faulty_ratio > 0.0 && rng.gen::<f32>() < self.faulty_ratio;
        self.builders[index].build(&self.operations[index], &self.api.schemas, rng, faulty)
    }

    pub fn create_solution(&mut self, rng: &mut ChaCha8Rng) -> Solution {
        let variables = (0..self.variables).map(|_| self.random_test_case(rng)).collect();
        Solution::new(variables)
    }

    /// Scores an executed solution with every objective.
    pub fn evaluate(&self, solution: &mut Solution) {
        let scores = self.objectives.iter().map(|o| o.evaluate(solution)).collect();
        solution.set_objectives(scores);
    }
}
