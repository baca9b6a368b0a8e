//! Optimizer settings.
//!
//! [`SearchConfig::from_env`] reads `RESTGEN_POPULATION`,
//! `RESTGEN_GENERATIONS`, `RESTGEN_CROSSOVER_PROB`, `RESTGEN_MUTATION_PROB`,
//! `RESTGEN_MAX_CONCURRENCY`, `RESTGEN_SEED`, `RESTGEN_TIME_LIMIT_SECS`,
//! `RESTGEN_MAX_EXECUTIONS` and `RESTGEN_FAULTY_RATIO` over the defaults.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SearchError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub population_size: usize,
    /// Generations after the initial population.
    pub max_generations: usize,
    pub crossover_probability: f64,
    /// Probability that an offspring has one slot regenerated.
    pub mutation_probability: f64,
    /// Test cases executed at the same time.
    pub max_concurrency: usize,
    pub seed: Option<u64>,
    pub time_limit_secs: Option<u64>,
    /// Live executions allowed for the whole run.
    pub max_executions: Option<usize>,
    /// Probability that a generated test case carries one invalid value.
    pub faulty_ratio: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            population_size: 20,
            max_generations: 10,
            crossover_probability: 0.9,
            mutation_probability: 0.5,
            max_concurrency: 8,
            seed: None,
            time_limit_secs: None,
            max_executions: None,
            faulty_ratio: 0.0,
        }
    }
}

impl SearchConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `RESTGEN_*` key. Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SearchConfig::default();
        set(&lookup, "RESTGEN_POPULATION", &mut config.population_size);
        set(&lookup, "RESTGEN_GENERATIONS", &mut config.max_generations);
        set(&lookup, "RESTGEN_CROSSOVER_PROB", &mut config.crossover_probability);
        set(&lookup, "RESTGEN_MUTATION_PROB", &mut config.mutation_probability);
        set(&lookup, "RESTGEN_MAX_CONCURRENCY", &mut config.max_concurrency);
        set(&lookup, "RESTGEN_FAULTY_RATIO", &mut config.faulty_ratio);
        set_optional(&lookup, "RESTGEN_SEED", &mut config.seed);
        set_optional(&lookup, "RESTGEN_TIME_LIMIT_SECS", &mut config.time_limit_secs);
        set_optional(&lookup, "RESTGEN_MAX_EXECUTIONS", &mut config.max_executions);
        config
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        let invalid = |reason: &str| {
            Err(SearchError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if self.population_size < 2 {
            return invalid("population_size must be at least 2");
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return invalid("crossover_probability must lie in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return invalid("mutation_probability must lie in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.faulty_ratio) {
            return invalid("faulty_ratio must lie in [0, 1]");
        }
        if self.max_concurrency == 0 {
            return invalid("max_concurrency must be positive");
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!("ignoring {}={:?}: not a valid value", key, raw);
    }
    parsed
}

fn set<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(key).and_then(|raw| parse(key, &raw)) {
        *slot = value;
    }
}

fn set_optional<F, T>(lookup: &F, key: &str, slot: &mut Option<T>)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(key).and_then(|raw| parse(key, &raw)) {
        *slot = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SearchConfig::default().validate().is_ok());
        assert_eq!(SearchConfig::default().time_limit(), None);
    }

    #[test]
    fn environment_overrides() {
        let config = SearchConfig::from_lookup(|key| match key {
            "RESTGEN_POPULATION" => Some("6".to_string()),
            "RESTGEN_SEED" => Some("99".to_string()),
            "RESTGEN_TIME_LIMIT_SECS" => Some("30".to_string()),
            "RESTGEN_MUTATION_PROB" => Some("often".to_string()),
            _ => None,
        });
        assert_eq!(config.population_size, 6);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
        assert_eq!(config.mutation_probability, 0.5);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let config = SearchConfig {
            crossover_probability: 1.5,
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(SearchError::InvalidConfig { .. })));

        let config = SearchConfig {
            population_size: 1,
            ..SearchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
