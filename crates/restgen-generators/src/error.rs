//! Error types for restgen-generators.

use thiserror::Error;

/// Errors produced while configuring generators.
///
/// Generation itself never fails: malformed body schemas fall back to flat
/// generators and exhausted dictionaries wrap around.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A fuzzing dictionary file could not be parsed.
    #[error("invalid fuzzing dictionary: {0}")]
    InvalidDictionary(#[from] serde_json::Error),
}
