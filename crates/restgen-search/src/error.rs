//! Error types for restgen-search.
//!
//! Every variant is a configuration error detected while the problem or
//! optimizer is built. Execution failures never surface here: they are
//! recorded as error verdicts and scored like any other outcome.

use thiserror::Error;

use restgen_core::CoreError;

#[derive(Debug, Error)]
pub enum SearchError {
    /// A problem needs at least one objective function to compare solutions.
    #[error("no objective functions registered")]
    NoObjectives,

    /// The API under test declares no operation to generate test cases for.
    #[error("the API declares no operations")]
    EmptyApi,

    /// Unknown target operation or unresolved schema.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid search configuration: {reason}")]
    InvalidConfig { reason: String },
}
