//! JSON body schemas and the registry `$ref` pointers resolve against.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::ParamType;

/// Maximum number of `$ref` hops followed before a reference is treated as
/// unresolvable (guards against reference cycles).
const MAX_REF_DEPTH: usize = 32;

/// A node of a request-body schema tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<ParamType>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    pub fn of_type(schema_type: ParamType) -> Self {
        Schema {
            schema_type: Some(schema_type),
            ..Schema::default()
        }
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Schema {
            reference: Some(target.into()),
            ..Schema::default()
        }
    }

    pub fn object<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        Schema {
            schema_type: Some(ParamType::Object),
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Schema::default()
        }
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(
            values
                .into_iter()
                .map(|v| serde_json::Value::String(v.into()))
                .collect(),
        );
        self
    }

    /// Objects are nodes typed `object`, or untyped nodes with properties.
    pub fn is_object(&self) -> bool {
        match self.schema_type {
            Some(ParamType::Object) => true,
            None => !self.properties.is_empty(),
            Some(_) => false,
        }
    }

    /// Enum values rendered as plain strings (string values unquoted).
    pub fn enum_strings(&self) -> Vec<String> {
        self.enum_values
            .iter()
            .flatten()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

/// Named component schemas, the targets of `$ref` pointers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) {
        self.schemas.insert(name.into(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Follows `$ref` pointers until a concrete schema is reached.
    ///
    /// Only the last segment of the pointer is significant, so both
    /// `#/components/schemas/Pet` and `#/definitions/Pet` resolve to `Pet`.
    pub fn resolve<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, CoreError> {
        let mut current = schema;
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.reference.as_deref() else {
                return Ok(current);
            };
            let name = reference.rsplit('/').next().unwrap_or(reference);
            current = self
                .schemas
                .get(name)
                .ok_or_else(|| CoreError::UnresolvedReference {
                    reference: reference.to_string(),
                })?;
        }
        Err(CoreError::UnresolvedReference {
            reference: schema.reference.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SchemaRegistry {
        let mut reg = SchemaRegistry::new();
        reg.insert(
            "Pet",
            Schema::object([
                ("name", Schema::of_type(ParamType::String)),
                ("category", Schema::reference("#/components/schemas/Category")),
            ]),
        );
        reg.insert(
            "Category",
            Schema::object([("id", Schema::of_type(ParamType::Integer))]),
        );
        reg.insert("Loop", Schema::reference("#/components/schemas/Loop"));
        reg
    }

    #[test]
    fn resolves_component_reference() {
        let reg = registry();
        let pet_ref = Schema::reference("#/components/schemas/Pet");
        let pet = reg.resolve(&pet_ref).unwrap();
        assert!(pet.is_object());
        assert_eq!(pet.properties.len(), 2);
    }

    #[test]
    fn unresolved_reference_is_an_error() {
        let reg = registry();
        let missing = Schema::reference("#/definitions/Owner");
        assert!(matches!(
            reg.resolve(&missing),
            Err(CoreError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn reference_cycles_terminate() {
        let reg = registry();
        let looped = Schema::reference("#/components/schemas/Loop");
        assert!(reg.resolve(&looped).is_err());
    }

    #[test]
    fn enum_strings_unquote_string_values() {
        let raw = r#"{"type":"string","enum":["a", 3, true]}"#;
        let schema: Schema = serde_json::from_str(raw).unwrap();
        assert_eq!(schema.enum_strings(), vec!["a", "3", "true"]);
    }
}
