//! Settings for predicate resolution, value harvesting and persistence.
//!
//! [`SemanticConfig::from_env`] reads:
//! - `RESTGEN_SPARQL_ENDPOINT`: SPARQL endpoint URL (default: DBpedia)
//! - `RESTGEN_KB_TIMEOUT_SECS`: per-request timeout (default: 10)
//! - `RESTGEN_MIN_SUPPORT`: minimum predicate support (default: 20)
//! - `RESTGEN_MAX_ROWS`: rows inspected per resolution query (default: 5)
//! - `RESTGEN_HARVEST_LIMIT`: values fetched per harvest query (default: 100)
//! - `RESTGEN_EXPERIMENT`: experiment name for the value store (default: "default")
//! - `RESTGEN_STORE_DIR`: value store root; empty disables persistence
//! - `RESTGEN_KB_CACHE`: "1"/"true" enables the in-run query cache

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_ENDPOINT: &str = "https://dbpedia.org/sparql";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// A predicate is accepted when its support is at least this value.
    pub min_support: u64,
    /// Result rows inspected per predicate search query.
    pub max_rows: usize,
    pub harvest_limit: usize,
    pub experiment: String,
    /// Root of the persisted value store; `None` disables persistence.
    pub store_dir: Option<PathBuf>,
    /// Answer repeated identical queries from memory within a run.
    pub cache_queries: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        SemanticConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
            min_support: 20,
            max_rows: 5,
            harvest_limit: 100,
            experiment: "default".to_string(),
            store_dir: Some(PathBuf::from("restgen-values")),
            cache_queries: false,
        }
    }
}

impl SemanticConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Defaults overridden by `RESTGEN_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `RESTGEN_*` key. Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SemanticConfig::default();
        if let Some(endpoint) = lookup("RESTGEN_SPARQL_ENDPOINT") {
            config.endpoint = endpoint;
        }
        override_parsed(&lookup, "RESTGEN_KB_TIMEOUT_SECS", &mut config.timeout_secs);
        override_parsed(&lookup, "RESTGEN_MIN_SUPPORT", &mut config.min_support);
        override_parsed(&lookup, "RESTGEN_MAX_ROWS", &mut config.max_rows);
        override_parsed(&lookup, "RESTGEN_HARVEST_LIMIT", &mut config.harvest_limit);
        if let Some(experiment) = lookup("RESTGEN_EXPERIMENT") {
            config.experiment = experiment;
        }
        if let Some(dir) = lookup("RESTGEN_STORE_DIR") {
            config.store_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }
        if let Some(flag) = lookup("RESTGEN_KB_CACHE") {
            config.cache_queries = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        config
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => warn!("ignoring {}={:?}: not a valid value", key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_resolution_contract() {
        let config = SemanticConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.min_support, 20);
        assert_eq!(config.max_rows, 5);
        assert!(!config.cache_queries);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = SemanticConfig::from_lookup(lookup(&[
            ("RESTGEN_SPARQL_ENDPOINT", "http://localhost:8890/sparql"),
            ("RESTGEN_MIN_SUPPORT", "5"),
            ("RESTGEN_STORE_DIR", ""),
            ("RESTGEN_KB_CACHE", "true"),
        ]));
        assert_eq!(config.endpoint, "http://localhost:8890/sparql");
        assert_eq!(config.min_support, 5);
        assert_eq!(config.store_dir, None);
        assert!(config.cache_queries);
    }

    #[test]
    fn unparseable_values_keep_defaults() {
        let config = SemanticConfig::from_lookup(lookup(&[("RESTGEN_MAX_ROWS", "many")]));
        assert_eq!(config.max_rows, 5);
    }
}
