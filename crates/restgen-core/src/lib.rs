//! Core data model for black-box API test generation.
//!
//! Describes the operations of an HTTP API (as parsed from its interface
//! description), the test cases generated for them, the verdicts produced
//! by executing those test cases, and the semantic annotations learned for
//! parameters from a knowledge base.
//!
//! Everything here is plain data: the model is immutable once built and is
//! shared read-only by generators, the predicate resolver, and the optimizer.

pub mod api;
pub mod error;
pub mod model;
pub mod schema;
pub mod semantic;
pub mod testcase;
pub mod verdict;

// Re-export commonly used types
pub use api::{ApiPath, ApiSpec};
pub use error::CoreError;
pub use model::{HttpMethod, Operation, ParamLocation, ParamType, Parameter};
pub use schema::{Schema, SchemaRegistry};
pub use semantic::SemanticParameter;
pub use testcase::{ParamValue, TestCase, TestCaseId};
pub use verdict::{Verdict, VerdictKind};
