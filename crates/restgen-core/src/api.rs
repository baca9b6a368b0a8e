//! The API under test: paths, their operations, and shared body schemas.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::Operation;
use crate::schema::SchemaRegistry;

/// A path template and the operations declared on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPath {
    pub path: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// Parsed interface description of an HTTP API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiSpec {
    pub title: String,
    #[serde(default)]
    pub paths: Vec<ApiPath>,
    #[serde(default)]
    pub schemas: SchemaRegistry,
}

impl ApiSpec {
    pub fn new(title: impl Into<String>) -> Self {
        ApiSpec {
            title: title.into(),
            ..ApiSpec::default()
        }
    }

    /// Adds an operation, grouping it under its path template.
    pub fn add_operation(&mut self, operation: Operation) {
        match self.paths.iter_mut().find(|p| p.path == operation.path) {
            Some(path) => path.operations.push(operation),
            None => self.paths.push(ApiPath {
                path: operation.path.clone(),
                operations: vec![operation],
            }),
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.add_operation(operation);
        self
    }

    /// All operations in declaration order, path by path.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.iter().flat_map(|p| p.operations.iter())
    }

    pub fn operation_count(&self) -> usize {
        self.paths.iter().map(|p| p.operations.len()).sum()
    }

    pub fn operation(&self, id: &str) -> Result<&Operation, CoreError> {
        self.operations()
            .find(|op| op.id == id)
            .ok_or_else(|| CoreError::OperationNotFound { id: id.to_string() })
    }

    /// Position of an operation in [`ApiSpec::operations`] order.
    pub fn operation_index(&self, id: &str) -> Option<usize> {
        self.operations().position(|op| op.id == id)
    }
}
