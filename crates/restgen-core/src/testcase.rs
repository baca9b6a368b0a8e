//! Abstract test cases: one operation call with concrete parameter values.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{HttpMethod, Operation, ParamLocation, Parameter};

/// Opaque test case identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestCaseId(pub Uuid);

impl TestCaseId {
    /// Builds an identifier from caller-supplied random bytes, so that ids are
    /// reproducible when the caller's RNG is seeded.
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        TestCaseId(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    pub fn new_v4() -> Self {
        TestCaseId(Uuid::new_v4())
    }
}

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single serialized parameter value of a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamValue {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    pub value: String,
}

/// A generated request against one operation.
///
/// Built by a test case builder and immutable afterwards; the verdict from
/// executing it is kept by whoever executed it, not on the case itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: TestCaseId,
    pub operation_id: String,
    pub path: String,
    pub method: HttpMethod,
    pub values: Vec<ParamValue>,
    pub fulfills_dependencies: bool,
    pub faulty: bool,
    /// Response key expected when the call succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_response: Option<String>,
}

impl TestCase {
    /// Creates an empty test case template for `operation`.
    pub fn template(id: TestCaseId, operation: &Operation) -> Self {
        TestCase {
            id,
            operation_id: operation.id.clone(),
            path: operation.path.clone(),
            method: operation.method,
            values: Vec::new(),
            fulfills_dependencies: true,
            faulty: false,
            expected_response: Some(operation.expected_response.clone()),
        }
    }

    /// Sets the value of `parameter`, replacing any earlier value.
    pub fn add_parameter(&mut self, parameter: &Parameter, value: impl Into<String>) {
        let value = value.into();
        match self
            .values
            .iter_mut()
            .find(|v| v.location == parameter.location && v.name == parameter.name)
        {
            Some(existing) => existing.value = value,
            None => self.values.push(ParamValue {
                name: parameter.name.clone(),
                location: parameter.location,
                value,
            }),
        }
    }

    pub fn value(&self, name: &str, location: ParamLocation) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.location == location && v.name == name)
            .map(|v| v.value.as_str())
    }

    /// The path template with path parameters substituted.
    pub fn resolved_path(&self) -> String {
        self.values
            .iter()
            .filter(|v| v.location == ParamLocation::Path)
            .fold(self.path.clone(), |path, v| {
                path.replace(&format!("{{{}}}", v.name), &v.value)
            })
    }
}
