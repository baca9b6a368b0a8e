//! Knowledge-base access: the [`KnowledgeBase`] seam, a SPARQL-over-HTTP
//! client and an optional in-run query cache.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::config::SemanticConfig;
use crate::error::KbError;

/// Kind of an RDF term bound in a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Uri,
    #[serde(alias = "typed-literal")]
    Literal,
    Bnode,
}

/// One bound value in a result row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RdfTerm {
    #[serde(rename = "type")]
    pub kind: TermKind,
    pub value: String,
}

impl RdfTerm {
    pub fn uri(value: impl Into<String>) -> Self {
        RdfTerm {
            kind: TermKind::Uri,
            value: value.into(),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        RdfTerm {
            kind: TermKind::Literal,
            value: value.into(),
        }
    }
}

/// Variable name -> bound term, in the order the endpoint returned them.
pub type QueryRow = IndexMap<String, RdfTerm>;

/// Anything that can answer SPARQL `SELECT` queries.
pub trait KnowledgeBase: Send + Sync {
    fn select(&self, query: &str) -> impl Future<Output = Result<Vec<QueryRow>, KbError>> + Send;
}

impl<K: KnowledgeBase> KnowledgeBase for Arc<K> {
    fn select(&self, query: &str) -> impl Future<Output = Result<Vec<QueryRow>, KbError>> + Send {
        (**self).select(query)
    }
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    bindings: Vec<QueryRow>,
}

/// Parses a `application/sparql-results+json` document.
pub fn parse_results(body: &str) -> Result<Vec<QueryRow>, KbError> {
    let parsed: SparqlResponse = serde_json::from_str(body)?;
    Ok(parsed.results.bindings)
}

/// SPARQL endpoint reached over HTTP GET.
#[derive(Debug, Clone)]
pub struct SparqlEndpoint {
    client: reqwest::Client,
    url: String,
    timeout_ms: u128,
}

impl SparqlEndpoint {
    pub fn new(config: &SemanticConfig) -> Result<Self, KbError> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(SparqlEndpoint {
            client,
            url: config.endpoint.clone(),
            timeout_ms: config.timeout().as_millis(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl KnowledgeBase for SparqlEndpoint {
    async fn select(&self, query: &str) -> Result<Vec<QueryRow>, KbError> {
        debug!(endpoint = %self.url, "sparql query:\n{}", query);
        let timeout = self.timeout_ms.to_string();
        let response = self
            .client
            .get(&self.url)
            .query(&[("query", query), ("timeout", timeout.as_str())])
            .header("Accept", "application/sparql-results+json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(KbError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_results(&body)
    }
}

/// Remembers the answer to every successful query for the rest of the run.
///
/// When disabled every call goes straight to the inner knowledge base.
/// Failures are never cached.
#[derive(Debug)]
pub struct CachedKnowledgeBase<K> {
    inner: K,
    enabled: bool,
    answers: DashMap<String, Vec<QueryRow>>,
}

impl<K: KnowledgeBase> CachedKnowledgeBase<K> {
    pub fn new(inner: K, enabled: bool) -> Self {
        CachedKnowledgeBase {
            inner,
            enabled,
            answers: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &K {
        &self.inner
    }

    pub fn cached_queries(&self) -> usize {
        self.answers.len()
    }
}

impl<K: KnowledgeBase> KnowledgeBase for CachedKnowledgeBase<K> {
    async fn select(&self, query: &str) -> Result<Vec<QueryRow>, KbError> {
        if !self.enabled {
            return self.inner.select(query).await;
        }
        // Clone out so no shard lock is held across the await below.
        let hit = self.answers.get(query).map(|rows| rows.clone());
        if let Some(rows) = hit {
            debug!("sparql cache hit");
            return Ok(rows);
        }
        let rows = self.inner.select(query).await?;
        self.answers.insert(query.to_string(), rows.clone());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl KnowledgeBase for Counting {
        async fn select(&self, _query: &str) -> Result<Vec<QueryRow>, KbError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut row = QueryRow::new();
            row.insert("value".to_string(), RdfTerm::literal("Spain"));
            Ok(vec![row])
        }
    }

    #[test]
    fn parses_sparql_json_results() {
        let body = r#"{
            "head": { "vars": ["predicate", "n"] },
            "results": { "bindings": [
                { "predicate": { "type": "uri", "value": "http://dbpedia.org/ontology/country" } },
                { "n": { "type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#integer", "value": "42" } }
            ] }
        }"#;
        let rows = parse_results(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["predicate"], RdfTerm::uri("http://dbpedia.org/ontology/country"));
        assert_eq!(rows[1]["n"].kind, TermKind::Literal);
        assert_eq!(rows[1]["n"].value, "42");
    }

    #[test]
    fn rejects_non_result_documents() {
        assert!(matches!(parse_results("<html/>"), Err(KbError::Decode(_))));
    }

    #[tokio::test]
    async fn cache_answers_repeated_queries() {
        let kb = CachedKnowledgeBase::new(Counting { calls: AtomicUsize::new(0) }, true);
        kb.select("SELECT 1").await.unwrap();
        kb.select("SELECT 1").await.unwrap();
        kb.select("SELECT 2").await.unwrap();
        assert_eq!(kb.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(kb.cached_queries(), 2);
    }

    #[tokio::test]
    async fn disabled_cache_passes_through() {
        let kb = CachedKnowledgeBase::new(Counting { calls: AtomicUsize::new(0) }, false);
        kb.select("SELECT 1").await.unwrap();
        kb.select("SELECT 1").await.unwrap();
        assert_eq!(kb.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(kb.cached_queries(), 0);
    }
}
