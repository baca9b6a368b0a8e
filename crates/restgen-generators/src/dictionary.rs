//! Type-indexed fuzzing dictionary and the cursor that walks it.
//!
//! The built-in dictionary holds boundary values, type-confused literals,
//! oversized inputs and common injection payloads for each primitive type.
//! A custom dictionary can be loaded from JSON; types missing from the file
//! keep their built-in lists.

use serde::{Deserialize, Serialize};

use restgen_core::ParamType;

use crate::error::GenerationError;

const OVERSIZED_LEN: usize = 4096;

fn builtin_strings() -> Vec<String> {
    let mut values: Vec<String> = [
        "",
        " ",
        "null",
        "undefined",
        "0",
        "-1",
        "true",
        "%00",
        "\u{0000}",
        "\\",
        "'",
        "\"",
        "' OR '1'='1",
        "<script>alert(1)</script>",
        "../../../../etc/passwd",
        "${7*7}",
        "{{7*7}}",
        "😀🚀",
        "ÅÍÎÏ˝ÓÔÒÚÆ☃",
        "\r\n",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    values.push("A".repeat(OVERSIZED_LEN));
    values
}

fn builtin_integers() -> Vec<String> {
    [
        "0",
        "-1",
        "1",
        "2147483647",
        "-2147483648",
        "2147483648",
        "9223372036854775807",
        "-9223372036854775808",
        "9223372036854775808",
        "1.5",
        "1e3",
        "0x10",
        "abc",
        "",
        "null",
        "true",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn builtin_numbers() -> Vec<String> {
    [
        "0",
        "-0.0",
        "0.1",
        "-1",
        "1.7976931348623157e308",
        "-1.7976931348623157e308",
        "4.9e-324",
        "1e309",
        "NaN",
        "Infinity",
        "-Infinity",
        "abc",
        "",
        "null",
        "true",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn builtin_booleans() -> Vec<String> {
    ["true", "false", "TRUE", "False", "0", "1", "yes", "null", ""]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Ordered adversarial values per primitive type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzingDictionary {
    pub string: Vec<String>,
    pub integer: Vec<String>,
    pub number: Vec<String>,
    pub boolean: Vec<String>,
}

impl Default for FuzzingDictionary {
    fn default() -> Self {
        FuzzingDictionary {
            string: builtin_strings(),
            integer: builtin_integers(),
            number: builtin_numbers(),
            boolean: builtin_booleans(),
        }
    }
}

impl FuzzingDictionary {
    /// Loads a dictionary from a JSON object keyed by type name.
    pub fn from_json(raw: &str) -> Result<Self, GenerationError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Values for `param_type`. Arrays and objects use the string list.
    pub fn values_for(&self, param_type: ParamType) -> &[String] {
        match param_type {
            ParamType::Integer => &self.integer,
            ParamType::Number => &self.number,
            ParamType::Boolean => &self.boolean,
            ParamType::String | ParamType::Array | ParamType::Object => &self.string,
        }
    }

    /// Values for `param_type` followed by `enum_values` (deduplicated).
    pub fn values_with_enum(&self, param_type: ParamType, enum_values: &[String]) -> Vec<String> {
        let mut values = self.values_for(param_type).to_vec();
        for value in enum_values {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        values
    }

    /// Cursor over the values for `param_type` plus `enum_values`.
    pub fn iterator(&self, param_type: ParamType, enum_values: &[String]) -> FuzzIterator {
        FuzzIterator::new(self.values_with_enum(param_type, enum_values))
    }
}

/// Deterministic cursor over a fuzz value list.
///
/// When more values are requested than the list holds, the cursor wraps
/// around to the start.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzIterator {
    values: Vec<String>,
    cursor: usize,
}

impl FuzzIterator {
    pub fn new(values: Vec<String>) -> Self {
        FuzzIterator { values, cursor: 0 }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn next_value(&mut self) -> String {
        if self.values.is_empty() {
            return String::new();
        }
        let value = self.values[self.cursor % self.values.len()].clone();
        self.cursor += 1;
        value
    }
}

/// Converts a fuzz value into the JSON node placed in a request body:
/// numbers, booleans and `null` keep their JSON type, everything else is a
/// string.
pub fn json_from_fuzz_value(value: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(value) {
        Ok(v @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_) | serde_json::Value::Null)) => v,
        _ => serde_json::Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_values_are_appended_once() {
        let dict = FuzzingDictionary::default();
        let enums = vec!["available".to_string(), "null".to_string()];
        let values = dict.values_with_enum(ParamType::String, &enums);
        assert_eq!(values.len(), dict.string.len() + 1);
        assert_eq!(values.last().map(String::as_str), Some("available"));
    }

    #[test]
    fn iterator_cycles_after_one_pass() {
        let mut it = FuzzIterator::new(vec!["a".into(), "b".into()]);
        let drawn: Vec<String> = (0..5).map(|_| it.next_value()).collect();
        assert_eq!(drawn, vec!["a", "b", "a", "b", "a"]);
        it.reset();
        assert_eq!(it.next_value(), "a");
    }

    #[test]
    fn empty_iterator_yields_empty_string() {
        let mut it = FuzzIterator::new(Vec::new());
        assert_eq!(it.next_value(), "");
    }

    #[test]
    fn partial_json_keeps_builtin_lists() {
        let dict = FuzzingDictionary::from_json(r#"{"boolean": ["maybe"]}"#).unwrap();
        assert_eq!(dict.boolean, vec!["maybe"]);
        assert_eq!(dict.integer, FuzzingDictionary::default().integer);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            FuzzingDictionary::from_json("{\"string\": 3"),
            Err(GenerationError::InvalidDictionary(_))
        ));
    }

    #[test]
    fn fuzz_values_keep_json_types() {
        assert_eq!(json_from_fuzz_value("42"), serde_json::json!(42));
        assert_eq!(json_from_fuzz_value("true"), serde_json::json!(true));
        assert_eq!(json_from_fuzz_value("null"), serde_json::Value::Null);
        assert_eq!(json_from_fuzz_value("NaN"), serde_json::json!("NaN"));
        assert_eq!(json_from_fuzz_value("\"q\""), serde_json::json!("\"q\""));
        assert_eq!(json_from_fuzz_value(""), serde_json::json!(""));
    }
}
