//! Test data generators and test case construction.
//!
//! Three value generators ([`Generator`]) sit behind one tagged variant:
//!
//! - **Fuzzing**: walks a static, type-indexed dictionary of adversarial
//!   values (plus declared enum values) with a restartable cursor.
//! - **Random**: samples uniformly from a parameter's declared domain
//!   using a seedable ChaCha PRNG.
//! - **Semantic**: draws from valid/invalid values harvested from a
//!   knowledge base, degrading to random sampling when it has none.
//!
//! A [`TestCaseBuilder`] binds one generator per parameter of an operation
//! and assembles complete [`TestCase`](restgen_core::TestCase)s, building
//! JSON bodies by walking the body schema. The strategies in [`strategy`]
//! drive builders to produce a requested number of test cases per operation.
//!
//! Reproducibility: given the same seed, the same test cases (including
//! their identifiers) are produced.

pub mod body;
pub mod builder;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod generator;
pub mod random;
pub mod semantic;
pub mod strategy;

pub use builder::TestCaseBuilder;
pub use config::GenerationConfig;
pub use dictionary::{FuzzIterator, FuzzingDictionary};
pub use error::GenerationError;
pub use generator::Generator;
pub use random::RandomSampler;
pub use semantic::SemanticGenerator;
pub use strategy::{FuzzingStrategy, RandomStrategy, SemanticStrategy, TestCaseGenerator};
