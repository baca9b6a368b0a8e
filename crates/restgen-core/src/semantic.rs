//! Parameters annotated with knowledge-base predicates and learned values.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{ParamLocation, Parameter};

/// A parameter plus the ontology predicates inferred for it and the values
/// harvested (or learned from execution) as valid and invalid.
///
/// `valid` and `invalid` are always disjoint: a value present in both is
/// kept as valid. Sets are ordered so that generation from them is
/// reproducible under a fixed seed regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticParameter {
    /// Position of the parameter in its operation.
    pub index: usize,
    pub parameter: Parameter,
    predicates: BTreeSet<String>,
    valid: BTreeSet<String>,
    invalid: BTreeSet<String>,
}

impl SemanticParameter {
    pub fn new(index: usize, parameter: Parameter) -> Self {
        SemanticParameter {
            index,
            parameter,
            predicates: BTreeSet::new(),
            valid: BTreeSet::new(),
            invalid: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.parameter.name
    }

    pub fn location(&self) -> ParamLocation {
        self.parameter.location
    }

    pub fn predicates(&self) -> &BTreeSet<String> {
        &self.predicates
    }

    pub fn set_predicates<I: IntoIterator<Item = String>>(&mut self, predicates: I) {
        self.predicates = predicates.into_iter().collect();
    }

    /// A parameter with no predicate could not be mapped onto the ontology.
    pub fn is_resolved(&self) -> bool {
        !self.predicates.is_empty()
    }

    pub fn valid_values(&self) -> &BTreeSet<String> {
        &self.valid
    }

    pub fn invalid_values(&self) -> &BTreeSet<String> {
        &self.invalid
    }

    pub fn has_values(&self) -> bool {
        !self.valid.is_empty() || !self.invalid.is_empty()
    }

    /// Adds valid values, evicting them from the invalid set.
    pub fn add_valid<I: IntoIterator<Item = String>>(&mut self, values: I) {
        for value in values {
            self.invalid.remove(&value);
            self.valid.insert(value);
        }
    }

    /// Adds invalid values; values already known valid are ignored.
    pub fn add_invalid<I: IntoIterator<Item = String>>(&mut self, values: I) {
        for value in values {
            if !self.valid.contains(&value) {
                self.invalid.insert(value);
            }
        }
    }

    /// Merges previously persisted values into this parameter.
    pub fn merge(&mut self, valid: BTreeSet<String>, invalid: BTreeSet<String>) {
        self.add_valid(valid);
        self.add_invalid(invalid);
    }
}
