//! Multi-objective search for API test suites.
//!
//! A [`Problem`] fixes the operation (or whole API) under test, the suite
//! length and the [`ObjectiveFunction`]s. The [`Optimizer`] evolves a
//! population of [`Solution`]s with NSGA-II, executing each test case once
//! through an [`ExecutionAdapter`], and returns the non-dominated front.

pub mod config;
pub mod error;
pub mod executor;
pub mod nsga2;
pub mod objective;
pub mod problem;
pub mod solution;

pub use config::SearchConfig;
pub use error::SearchError;
pub use executor::{BatchExecutor, ExecutionAdapter};
pub use nsga2::{crowding_distance, dominates, non_dominated_sort, Optimizer, SearchResult, StopReason};
pub use objective::{
    Direction, FailureCount, FailureDiversity, FaultyCount, InputDiversity, ObjectiveFunction,
    OperationCoverage, SuiteSize,
};
pub use problem::{Problem, SearchTarget};
pub use solution::Solution;
