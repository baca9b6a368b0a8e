//! Scripted knowledge base shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use restgen_semantic::{KbError, KnowledgeBase, QueryRow, RdfTerm};

/// Answers the three query shapes the resolver and harvester issue from
/// fixed tables, and records every query it sees as `kind:argument`.
#[derive(Default)]
pub struct ScriptedKb {
    /// Lower-cased search term -> predicate URIs, in result order.
    searches: HashMap<String, Vec<String>>,
    /// Predicate URI -> support.
    support: HashMap<String, u64>,
    /// Predicate URI -> values satisfying the constraints.
    valid: HashMap<String, Vec<String>>,
    /// Predicate URI -> values violating the constraints.
    invalid: HashMap<String, Vec<String>>,
    offline: bool,
    log: Mutex<Vec<String>>,
}

impl ScriptedKb {
    pub fn new() -> Self {
        ScriptedKb::default()
    }

    /// Every query fails as if the endpoint were down.
    pub fn offline() -> Self {
        ScriptedKb {
            offline: true,
            ..ScriptedKb::default()
        }
    }

    pub fn search<S: AsRef<str>>(mut self, term: &str, predicates: &[S]) -> Self {
        self.searches.insert(
            term.to_lowercase(),
            predicates.iter().map(|p| p.as_ref().to_string()).collect(),
        );
        self
    }

    pub fn support(mut self, predicate: &str, support: u64) -> Self {
        self.support.insert(predicate.to_string(), support);
        self
    }

    pub fn values(mut self, predicate: &str, valid: &[&str], invalid: &[&str]) -> Self {
        self.valid
            .insert(predicate.to_string(), valid.iter().map(|v| v.to_string()).collect());
        self.invalid
            .insert(predicate.to_string(), invalid.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Search terms in the order they were queried.
    pub fn searched_terms(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|entry| entry.strip_prefix("search:").map(str::to_string))
            .collect()
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn answer(&self, query: &str) -> Vec<QueryRow> {
        if query.contains("a rdf:Property") {
            let term = between(query, "regex(str(?predicate), \"", "\"").unwrap_or_default();
            self.record(format!("search:{term}"));
            return self
                .searches
                .get(&term.to_lowercase())
                .into_iter()
                .flatten()
                .map(|p| row("predicate", RdfTerm::uri(p.clone())))
                .collect();
        }

        let predicates = iris(query);
        if query.contains("COUNT(") {
            let predicate = predicates.first().cloned().unwrap_or_default();
            self.record(format!("support:{predicate}"));
            let support = self.support.get(&predicate).copied().unwrap_or(0);
            return vec![row("support", RdfTerm::literal(support.to_string()))];
        }

        let (kind, table) = if query.contains("FILTER(!(") {
            ("invalid", &self.invalid)
        } else {
            ("valid", &self.valid)
        };
        self.record(format!("{kind}:{}", predicates.join(",")));
        predicates
            .iter()
            .filter_map(|p| table.get(p))
            .flatten()
            .map(|v| row("value", RdfTerm::literal(v.clone())))
            .collect()
    }
}

impl KnowledgeBase for ScriptedKb {
    async fn select(&self, query: &str) -> Result<Vec<QueryRow>, KbError> {
        if self.offline {
            self.record("offline".to_string());
            return Err(KbError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.answer(query))
    }
}

fn row(var: &str, term: RdfTerm) -> QueryRow {
    QueryRow::from([(var.to_string(), term)])
}

fn between(text: &str, open: &str, close: &str) -> Option<String> {
    let start = text.find(open)? + open.len();
    let len = text[start..].find(close)?;
    Some(text[start..start + len].to_string())
}

/// IRIs used as predicates in `?subject <iri> ?value` patterns.
fn iris(query: &str) -> Vec<String> {
    query
        .split("?subject <")
        .skip(1)
        .filter_map(|rest| rest.split('>').next())
        .map(str::to_string)
        .collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
