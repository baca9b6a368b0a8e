//! Operations and their typed parameters.
//!
//! An [`Operation`] owns its [`Parameter`]s by position; generators and the
//! optimizer refer to a parameter by its index in [`Operation::parameters`]
//! rather than through a shared name-keyed registry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::schema::Schema;

/// Where a parameter travels in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Body,
    FormData,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Body => "body",
            ParamLocation::FormData => "formData",
        }
    }
}

impl FromStr for ParamLocation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(ParamLocation::Path),
            "query" => Ok(ParamLocation::Query),
            "header" => Ok(ParamLocation::Header),
            "body" => Ok(ParamLocation::Body),
            "formData" => Ok(ParamLocation::FormData),
            other => Err(CoreError::UnsupportedLocation {
                location: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ParamLocation {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParamLocation> for String {
    fn from(location: ParamLocation) -> Self {
        location.as_str().to_string()
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a parameter or schema leaf.
///
/// `Array` and `Object` only occur on body schemas and form parameters;
/// generators treat them as strings when a flat value is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }
}

impl FromStr for ParamType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ParamType::String),
            "integer" => Ok(ParamType::Integer),
            "number" => Ok(ParamType::Number),
            "boolean" => Ok(ParamType::Boolean),
            "array" => Ok(ParamType::Array),
            "object" => Ok(ParamType::Object),
            other => Err(CoreError::UnsupportedType {
                type_name: other.to_string(),
            }),
        }
    }
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "put" => Ok(HttpMethod::Put),
            "post" => Ok(HttpMethod::Post),
            "delete" => Ok(HttpMethod::Delete),
            "options" => Ok(HttpMethod::Options),
            "head" => Ok(HttpMethod::Head),
            "patch" => Ok(HttpMethod::Patch),
            "trace" => Ok(HttpMethod::Trace),
            _ => Err(CoreError::UnsupportedMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed input of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub required: bool,
    /// Probability that a non-required parameter is included in a test case.
    /// `None` means always include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    /// Creates an optional parameter with no constraints.
    pub fn new(name: impl Into<String>, location: ParamLocation, param_type: ParamType) -> Self {
        Parameter {
            name: name.into(),
            location,
            param_type,
            format: None,
            enum_values: None,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            required: false,
            weight: None,
            description: None,
        }
    }

    /// Builds a parameter from the raw `in` and `type` strings of an
    /// interface description, rejecting unknown kinds.
    pub fn parse(name: &str, location: &str, param_type: &str) -> Result<Self, CoreError> {
        Ok(Parameter::new(name, location.parse()?, param_type.parse()?))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn with_length(mut self, min_length: Option<usize>, max_length: Option<usize>) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_body(&self) -> bool {
        self.location == ParamLocation::Body
    }

    /// Parameters whose values are worth looking up in a knowledge base:
    /// free-form (no enum), non-boolean, outside the request body.
    pub fn is_semantic_candidate(&self) -> bool {
        !self.is_body() && self.enum_values.is_none() && self.param_type != ParamType::Boolean
    }
}

/// One API operation: a method on a path template with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    pub path: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Inter-parameter dependencies declared on the operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Response key (status code) expected on success.
    #[serde(default = "default_expected_response")]
    pub expected_response: String,
    /// Schema of the JSON request body, if the operation declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Schema>,
}

fn default_expected_response() -> String {
    "200".to_string()
}

impl Operation {
    pub fn new(id: impl Into<String>, path: impl Into<String>, method: HttpMethod) -> Self {
        Operation {
            id: id.into(),
            path: path.into(),
            method,
            parameters: Vec::new(),
            dependencies: Vec::new(),
            expected_response: default_expected_response(),
            request_body: None,
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_body(mut self, schema: Schema) -> Self {
        self.request_body = Some(schema);
        self
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn parameter(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index)
    }

    /// Finds a parameter by name and location.
    pub fn find_parameter(&self, name: &str, location: ParamLocation) -> Option<(usize, &Parameter)> {
        self.parameters
            .iter()
            .enumerate()
            .find(|(_, p)| p.location == location && p.name.eq_ignore_ascii_case(name))
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_location_is_rejected() {
        let err = Parameter::parse("x", "cookie", "string").unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedLocation { ref location } if location == "cookie"));
    }

    #[test]
    fn location_roundtrips_through_serde() {
        let p = Parameter::new("petId", ParamLocation::FormData, ParamType::Integer);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["in"], "formData");
        assert_eq!(json["type"], "integer");
        let back: Parameter = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn deserializing_unknown_location_fails() {
        let raw = r#"{"name":"a","in":"matrix","type":"string"}"#;
        assert!(serde_json::from_str::<Parameter>(raw).is_err());
    }

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("fetch".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn semantic_candidates_exclude_enum_boolean_and_body() {
        let free = Parameter::new("city", ParamLocation::Query, ParamType::String);
        let enumerated = free.clone().with_enum(["a", "b"]);
        let flag = Parameter::new("verbose", ParamLocation::Query, ParamType::Boolean);
        let body = Parameter::new("body", ParamLocation::Body, ParamType::Object);

        assert!(free.is_semantic_candidate());
        assert!(!enumerated.is_semantic_candidate());
        assert!(!flag.is_semantic_candidate());
        assert!(!body.is_semantic_candidate());
    }

    #[test]
    fn operation_defaults() {
        let op = Operation::new("findPets", "/pets", HttpMethod::Get)
            .with_parameter(Parameter::new("status", ParamLocation::Query, ParamType::String));
        assert_eq!(op.expected_response, "200");
        assert!(!op.has_dependencies());
        assert_eq!(op.find_parameter("STATUS", ParamLocation::Query).map(|(i, _)| i), Some(0));
        assert!(op.find_parameter("status", ParamLocation::Header).is_none());
    }
}
