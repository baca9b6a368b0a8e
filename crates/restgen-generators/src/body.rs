//! Recursive construction of JSON request bodies from a body schema.
//!
//! Object schemas expand to one value per declared property, nested objects
//! recurse, arrays get a single element built from `items`, and `$ref`
//! nodes are resolved against the schema registry before descending.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde_json::{Map, Value};

use restgen_core::{CoreError, ParamType, Schema, SchemaRegistry};

use crate::dictionary::{json_from_fuzz_value, FuzzingDictionary};
use crate::random::RandomSampler;

/// Recursion limit for self-referencing schemas.
const MAX_DEPTH: usize = 16;

/// How leaf values of a body are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyMode {
    /// A random entry from `dictionary(type) ∪ enum`.
    Fuzz(FuzzingDictionary),
    /// A random value from the leaf's declared domain.
    Random,
}

/// Why a body could not be built from the schema.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error(transparent)]
    Unresolved(#[from] CoreError),

    /// The root schema is not an object with declared properties.
    #[error("body schema is not an object with properties")]
    NotAnObject,

    #[error("body schema nests too deeply")]
    TooDeep,
}

/// Builds a JSON body for `schema`.
///
/// Errors signal a malformed or unusable schema; callers fall back to the
/// flat generator bound to the body parameter.
pub fn build_body(
    schema: &Schema,
    registry: &SchemaRegistry,
    mode: &BodyMode,
    rng: &mut ChaCha8Rng,
) -> Result<Value, BodyError> {
    let root = registry.resolve(schema)?;
    if !root.is_object() || root.properties.is_empty() {
        return Err(BodyError::NotAnObject);
    }
    build_object(root, registry, mode, rng, 0)
}

fn build_object(
    schema: &Schema,
    registry: &SchemaRegistry,
    mode: &BodyMode,
    rng: &mut ChaCha8Rng,
    depth: usize,
) -> Result<Value, BodyError> {
    if depth >= MAX_DEPTH {
        return Err(BodyError::TooDeep);
    }
    let mut node = Map::new();
    for (name, property) in &schema.properties {
        let value = build_node(property, registry, mode, rng, depth + 1)?;
        node.insert(name.clone(), value);
    }
    Ok(Value::Object(node))
}

fn build_node(
    schema: &Schema,
    registry: &SchemaRegistry,
    mode: &BodyMode,
    rng: &mut ChaCha8Rng,
    depth: usize,
) -> Result<Value, BodyError> {
    let schema = registry.resolve(schema)?;
    if schema.is_object() {
        return build_object(schema, registry, mode, rng, depth);
    }
    if schema.schema_type == Some(ParamType::Array) {
        if let Some(items) = &schema.items {
            let element = build_node(items, registry, mode, rng, depth + 1)?;
            return Ok(Value::Array(vec![element]));
        }
    }
    Ok(leaf_value(schema, mode, rng))
}

fn leaf_value(schema: &Schema, mode: &BodyMode, rng: &mut ChaCha8Rng) -> Value {
    let param_type = schema.schema_type.unwrap_or(ParamType::String);
    match mode {
        BodyMode::Fuzz(dictionary) => {
            let values = dictionary.values_with_enum(param_type, &schema.enum_strings());
            values
                .choose(rng)
                .map(|v| json_from_fuzz_value(v))
                .unwrap_or(Value::Null)
        }
        BodyMode::Random => {
            let raw = RandomSampler::for_schema(schema).next_value(rng);
            typed_json(param_type, raw)
        }
    }
}

/// Converts a sampled string to the JSON type its schema declares.
fn typed_json(param_type: ParamType, raw: String) -> Value {
    match param_type {
        ParamType::Integer | ParamType::Number | ParamType::Boolean => {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        }
        _ => Value::String(raw),
    }
}
