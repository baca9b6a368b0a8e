//! Maps parameters onto knowledge-base predicates.
//!
//! Resolution tries, in order, and stops at the first success:
//!
//! 1. phrases extracted from the parameter description, heaviest first
//!    (a one-letter name is first expanded to a description word starting
//!    with that letter);
//! 2. the parameter name itself;
//! 3. for `snake_case` names, the words joined into one token, then one
//!    search per word, keeping the union of every word that resolves;
//! 4. for `camelCase` names, one search per word, keeping the union.
//!
//! A search term resolves to the first predicate among the top result rows
//! whose support (distinct values satisfying the parameter's constraints)
//! reaches the configured minimum. Knowledge-base failures only skip the
//! current term.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use restgen_core::{Parameter, SemanticParameter};

use crate::config::SemanticConfig;
use crate::error::KbError;
use crate::kb::KnowledgeBase;
use crate::nlp::{abbreviation_candidates, description_candidates, split_camel, split_snake};
use crate::query::{predicate_search, support_count, PREDICATE_VAR, SUPPORT_VAR};

pub struct PredicateResolver<K> {
    kb: Arc<K>,
    min_support: u64,
    max_rows: usize,
}

impl<K> Clone for PredicateResolver<K> {
    fn clone(&self) -> Self {
        PredicateResolver {
            kb: Arc::clone(&self.kb),
            min_support: self.min_support,
            max_rows: self.max_rows,
        }
    }
}

impl<K: KnowledgeBase> PredicateResolver<K> {
    pub fn new(kb: Arc<K>, config: &SemanticConfig) -> Self {
        PredicateResolver {
            kb,
            min_support: config.min_support,
            max_rows: config.max_rows,
        }
    }

    /// Resolves the predicates of `parameter` and stores them on it.
    pub async fn resolve_parameter(&self, parameter: &mut SemanticParameter) {
        let predicates = self.resolve(&parameter.parameter).await;
        parameter.set_predicates(predicates);
    }

    /// The predicates for `parameter`; empty when nothing resolves.
    pub async fn resolve(&self, parameter: &Parameter) -> BTreeSet<String> {
        let description = parameter
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty());

        let mut name = parameter.name.clone();
        let mut letters = name.chars();
        if let (Some(letter), None, Some(description)) = (letters.next(), letters.next(), description) {
            if let Some(expanded) = abbreviation_candidates(letter, description).into_iter().next() {
                debug!(parameter = %parameter.name, expanded = %expanded, "expanded one-letter name");
                name = expanded;
            }
        }

        if let Some(description) = description {
            for candidate in description_candidates(description) {
                if let Some(predicate) = self.first_supported(&candidate.phrase, parameter).await {
                    info!(
                        parameter = %parameter.name,
                        candidate = %candidate.phrase,
                        predicate = %predicate,
                        "predicate selected from description"
                    );
                    return BTreeSet::from([predicate]);
                }
            }
        }

        let predicates = self.resolve_name(&name, parameter).await;
        if predicates.is_empty() {
            info!(parameter = %parameter.name, "no predicate found");
        } else {
            info!(parameter = %parameter.name, predicates = ?predicates, "predicates selected from name");
        }
        predicates
    }

    async fn resolve_name(&self, name: &str, parameter: &Parameter) -> BTreeSet<String> {
        if let Some(predicate) = self.first_supported(name, parameter).await {
            return BTreeSet::from([predicate]);
        }

        let snake = split_snake(name);
        if snake.len() > 1 {
            if let Some(predicate) = self.first_supported(&snake.concat(), parameter).await {
                return BTreeSet::from([predicate]);
            }
            let union = self.union_of(&snake, parameter).await;
            if !union.is_empty() {
                return union;
            }
        }

        let camel = split_camel(name);
        if camel.len() > 1 {
            return self.union_of(&camel, parameter).await;
        }
        BTreeSet::new()
    }

    async fn union_of(&self, words: &[String], parameter: &Parameter) -> BTreeSet<String> {
        let mut predicates = BTreeSet::new();
        for word in words {
            if let Some(predicate) = self.first_supported(word, parameter).await {
                predicates.insert(predicate);
            }
        }
        predicates
    }

    /// First predicate matching `term` whose support reaches the minimum.
    pub async fn first_supported(&self, term: &str, parameter: &Parameter) -> Option<String> {
        let rows = match self.kb.select(&predicate_search(term)).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(term, "predicate search failed: {}", err);
                return None;
            }
        };

        for row in rows.iter().take(self.max_rows) {
            let Some(predicate) = row.get(PREDICATE_VAR) else {
                continue;
            };
            match self.support(&predicate.value, parameter).await {
                Ok(support) if support >= self.min_support => return Some(predicate.value.clone()),
                Ok(support) => {
                    debug!(term, predicate = %predicate.value, support, "support below minimum")
                }
                Err(err) => warn!(predicate = %predicate.value, "support query failed: {}", err),
            }
        }
        None
    }

    /// Distinct values of `predicate` satisfying the constraints of
    /// `parameter`.
    pub async fn support(&self, predicate: &str, parameter: &Parameter) -> Result<u64, KbError> {
        let rows = self.kb.select(&support_count(predicate, parameter)).await?;
        let term = rows
            .first()
            .and_then(|row| row.get(SUPPORT_VAR))
            .ok_or_else(|| KbError::MissingBinding {
                variable: SUPPORT_VAR.to_string(),
            })?;
        let count = term.value.trim().parse::<f64>().unwrap_or(0.0);
        Ok(count.max(0.0) as u64)
    }
}
