//! Fetches concrete valid and invalid values for resolved parameters.

use std::sync::Arc;

use tracing::{debug, warn};

use restgen_core::SemanticParameter;

use crate::config::SemanticConfig;
use crate::kb::{KnowledgeBase, QueryRow, RdfTerm, TermKind};
use crate::query::{harvest_invalid, harvest_valid, VALUE_VAR};

/// Values added by one harvest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub valid: usize,
    pub invalid: usize,
}

pub struct ValueHarvester<K> {
    kb: Arc<K>,
    limit: usize,
}

impl<K> Clone for ValueHarvester<K> {
    fn clone(&self) -> Self {
        ValueHarvester {
            kb: Arc::clone(&self.kb),
            limit: self.limit,
        }
    }
}

impl<K: KnowledgeBase> ValueHarvester<K> {
    pub fn new(kb: Arc<K>, config: &SemanticConfig) -> Self {
        ValueHarvester {
            kb,
            limit: config.harvest_limit,
        }
    }

    /// Queries the values of `parameter`'s predicates.
    ///
    /// Values satisfying the declared constraints become valid; values of
    /// the same predicates that violate them become invalid (only for
    /// constrained parameters). Unresolved parameters are left untouched.
    pub async fn harvest(&self, parameter: &mut SemanticParameter) -> HarvestReport {
        let mut report = HarvestReport::default();
        if !parameter.is_resolved() {
            return report;
        }
        let predicates: Vec<String> = parameter.predicates().iter().cloned().collect();

        let valid_query = harvest_valid(&predicates, &parameter.parameter, self.limit);
        if let Some(values) = self.values(&valid_query, parameter.name()).await {
            report.valid = values.len();
            parameter.add_valid(values);
        }

        if let Some(invalid_query) = harvest_invalid(&predicates, &parameter.parameter, self.limit) {
            if let Some(values) = self.values(&invalid_query, parameter.name()).await {
                report.invalid = values.len();
                parameter.add_invalid(values);
            }
        }

        debug!(
            parameter = parameter.name(),
            valid = report.valid,
            invalid = report.invalid,
            "harvested values"
        );
        report
    }

    async fn values(&self, query: &str, parameter: &str) -> Option<Vec<String>> {
        match self.kb.select(query).await {
            Ok(rows) => Some(rows.iter().filter_map(row_value).collect()),
            Err(err) => {
                warn!(parameter, "value harvest failed: {}", err);
                None
            }
        }
    }
}

fn row_value(row: &QueryRow) -> Option<String> {
    row.get(VALUE_VAR).and_then(term_value)
}

/// Renders a term as a parameter value: literals as-is, resources by their
/// local name with underscores turned into spaces, blank nodes dropped.
pub fn term_value(term: &RdfTerm) -> Option<String> {
    let value = match term.kind {
        TermKind::Literal => term.value.clone(),
        TermKind::Uri => {
            let local = term
                .value
                .rsplit(|c: char| c == '/' || c == '#')
                .next()
                .unwrap_or(term.value.as_str());
            local.replace('_', " ")
        }
        TermKind::Bnode => return None,
    };
    (!value.trim().is_empty()).then_some(value)
}
