//! Core error types for restgen-core.
//!
//! All of these are configuration errors: they surface while the operation
//! model is being built and indicate a malformed interface description, not
//! a recoverable runtime condition.

use thiserror::Error;

/// Errors produced while building or querying the operation model.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A parameter declared an `in` value other than the supported kinds.
    #[error("parameter location not supported: '{location}'")]
    UnsupportedLocation { location: String },

    /// A parameter declared a type this model does not know.
    #[error("parameter type not supported: '{type_name}'")]
    UnsupportedType { type_name: String },

    /// An HTTP method name that is not one of the standard verbs.
    #[error("unsupported HTTP method: '{method}'")]
    UnsupportedMethod { method: String },

    /// An operation id was not found in the API model.
    #[error("operation not found: '{id}'")]
    OperationNotFound { id: String },

    /// A `$ref` pointer could not be resolved against the schema registry.
    #[error("unresolved schema reference: '{reference}'")]
    UnresolvedReference { reference: String },
}
