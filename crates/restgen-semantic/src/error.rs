//! Error types for restgen-semantic.
//!
//! [`KbError`] covers knowledge-base round trips and [`StoreError`] the
//! persisted value store. Both are soft failures at the resolver and store
//! seams: they are logged and resolution moves on. [`SemanticError`] wraps
//! them for callers that want the underlying cause.

use std::path::PathBuf;

use thiserror::Error;

use restgen_core::CoreError;

/// Errors produced while querying a knowledge base.
#[derive(Debug, Error)]
pub enum KbError {
    /// The HTTP request failed (connection refused, timeout, TLS...).
    #[error("knowledge base request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("knowledge base returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a SPARQL JSON result set.
    #[error("malformed SPARQL result: {0}")]
    Decode(#[from] serde_json::Error),

    /// A result row lacked a variable the query selects.
    #[error("result row has no binding for ?{variable}")]
    MissingBinding { variable: String },
}

/// Errors produced by the persisted value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("value store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A quoted field was never closed.
    #[error("malformed value file {path}: unterminated quoted field")]
    Unterminated { path: PathBuf },
}

/// Top-level error for the semantic subsystem.
#[derive(Debug, Error)]
pub enum SemanticError {
    #[error(transparent)]
    Kb(#[from] KbError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A resolution task panicked or was cancelled.
    #[error("resolution task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
