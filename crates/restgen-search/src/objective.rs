//! Objective functions: pure scores over an executed suite.

use std::collections::HashSet;

use restgen_core::ApiSpec;

use crate::solution::Solution;

/// Whether larger or smaller scores are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Direction {
    /// True when `a` is strictly better than `b`.
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Direction::Maximize => a > b,
            Direction::Minimize => a < b,
        }
    }
}

/// Scores one quality dimension of an executed solution.
///
/// Implementations must be free of side effects: the optimizer may call
/// them from any task, any number of times.
pub trait ObjectiveFunction: Send + Sync {
    fn name(&self) -> &str;
    fn direction(&self) -> Direction;
    fn evaluate(&self, solution: &Solution) -> f64;
}

/// Fraction of the API's operations exercised by the suite.
#[derive(Debug, Clone)]
pub struct OperationCoverage {
    total: usize,
}

impl OperationCoverage {
    pub fn new(total_operations: usize) -> Self {
        OperationCoverage {
            total: total_operations.max(1),
        }
    }

    pub fn for_api(api: &ApiSpec) -> Self {
        Self::new(api.operation_count())
    }
}

impl ObjectiveFunction for OperationCoverage {
    fn name(&self) -> &str {
        "operation_coverage"
    }

    fn direction(&self) -> Direction {
        Direction::Maximize
    }

    fn evaluate(&self, solution: &Solution) -> f64 {
        let covered: HashSet<&str> = solution
            .variables()
            .iter()
            .map(|c| c.operation_id.as_str())
            .collect();
        covered.len() as f64 / self.total as f64
    }
}

/// Distinct test cases with a failing verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureCount;

impl ObjectiveFunction for FailureCount {
    fn name(&self) -> &str {
        "failure_count"
    }

    fn direction(&self) -> Direction {
        Direction::Maximize
    }

    fn evaluate(&self, solution: &Solution) -> f64 {
        solution.verdicts().values().filter(|v| v.is_failing()).count() as f64
    }
}

/// Distinct (operation, status, detail) triples among failing verdicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureDiversity;

impl ObjectiveFunction for FailureDiversity {
    fn name(&self) -> &str {
        "failure_diversity"
    }

    fn direction(&self) -> Direction {
        Direction::Maximize
    }

    fn evaluate(&self, solution: &Solution) -> f64 {
        solution
            .executed()
            .filter(|(_, v)| v.is_failing())
            .map(|(c, v)| (c.operation_id.as_str(), v.status_code, v.detail.as_str()))
            .collect::<HashSet<_>>()
            .len() as f64
    }
}

/// Distinct parameter values used across the suite.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputDiversity;

impl ObjectiveFunction for InputDiversity {
    fn name(&self) -> &str {
        "input_diversity"
    }

    fn direction(&self) -> Direction {
        Direction::Maximize
    }

    fn evaluate(&self, solution: &Solution) -> f64 {
        solution
            .variables()
            .iter()
            .flat_map(|c| {
                c.values
                    .iter()
                    .map(move |v| (c.operation_id.as_str(), v.name.as_str(), v.value.as_str()))
            })
            .collect::<HashSet<_>>()
            .len() as f64
    }
}

/// Distinct test cases deliberately carrying an invalid value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultyCount;

impl ObjectiveFunction for FaultyCount {
    fn name(&self) -> &str {
        "faulty_count"
    }

    fn direction(&self) -> Direction {
        Direction::Maximize
    }

    fn evaluate(&self, solution: &Solution) -> f64 {
        solution
            .variables()
            .iter()
            .filter(|c| c.faulty)
            .map(|c| c.id)
            .collect::<HashSet<_>>()
            .len() as f64
    }
}

/// Distinct test cases in the suite; smaller suites are cheaper to run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuiteSize;

impl ObjectiveFunction for SuiteSize {
    fn name(&self) -> &str {
        "suite_size"
    }

    fn direction(&self) -> Direction {
        Direction::Minimize
    }

    fn evaluate(&self, solution: &Solution) -> f64 {
        solution.distinct_cases() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restgen_core::{
        HttpMethod, Operation, ParamLocation, ParamType, Parameter, TestCase, TestCaseId, Verdict,
    };

    fn suite() -> Solution {
        let list = Operation::new("listPets", "/pets", HttpMethod::Get)
            .with_parameter(Parameter::new("limit", ParamLocation::Query, ParamType::Integer));
        let get = Operation::new("getPet", "/pets/{id}", HttpMethod::Get);

        let mut a = TestCase::template(TestCaseId::from_random_bytes([1; 16]), &list);
        a.add_parameter(&list.parameters[0], "5");
        let mut b = TestCase::template(TestCaseId::from_random_bytes([2; 16]), &list);
        b.add_parameter(&list.parameters[0], "-1");
        b.faulty = true;
        let c = TestCase::template(TestCaseId::from_random_bytes([3; 16]), &get);

        let mut s = Solution::new(vec![a.clone(), b.clone(), c.clone(), a.clone()]);
        s.record(a.id, Verdict::success(200));
        s.record(b.id, Verdict::failure(Some(500), "boom"));
        s.record(c.id, Verdict::failure(Some(500), "boom"));
        s
    }

    #[test]
    fn built_in_scores() {
        let s = suite();
        assert_eq!(OperationCoverage::new(4).evaluate(&s), 0.5);
        assert_eq!(FailureCount.evaluate(&s), 2.0);
        assert_eq!(FailureDiversity.evaluate(&s), 2.0);
        assert_eq!(InputDiversity.evaluate(&s), 2.0);
        assert_eq!(FaultyCount.evaluate(&s), 1.0);
        assert_eq!(SuiteSize.evaluate(&s), 3.0);
    }

    #[test]
    fn directions_compare() {
        assert!(Direction::Maximize.better(2.0, 1.0));
        assert!(Direction::Minimize.better(1.0, 2.0));
        assert!(!Direction::Minimize.better(1.0, 1.0));
    }
}
