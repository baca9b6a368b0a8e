//! Knowledge-base informed test inputs.
//!
//! This crate maps API parameters onto ontology predicates and harvests
//! realistic values for them:
//!
//! - [`nlp`]: description phrase extraction and name splitting
//! - [`query`]: SPARQL text for predicate search, support and harvesting
//! - [`kb`]: the [`KnowledgeBase`] seam, a SPARQL-over-HTTP client and an
//!   optional in-run query cache
//! - [`resolver`]: the priority-ordered predicate resolution
//! - [`harvest`]: valid/invalid value retrieval
//! - [`store`]: persisted values, merged across runs
//! - [`feedback`]: learning from execution verdicts
//! - [`pipeline`]: all of the above for whole operations, concurrently
//!
//! Knowledge-base and store failures are never fatal: a parameter that
//! cannot be resolved ends up with no values and its generator falls back
//! to random sampling.

pub mod config;
pub mod error;
pub mod feedback;
pub mod harvest;
pub mod kb;
pub mod nlp;
pub mod pipeline;
pub mod query;
pub mod resolver;
pub mod store;

pub use config::SemanticConfig;
pub use error::{KbError, SemanticError, StoreError};
pub use feedback::{learn_from_execution, Learned};
pub use harvest::{HarvestReport, ValueHarvester};
pub use kb::{CachedKnowledgeBase, KnowledgeBase, QueryRow, RdfTerm, SparqlEndpoint, TermKind};
pub use pipeline::SemanticPipeline;
pub use resolver::PredicateResolver;
pub use store::{StoredValues, ValueKind, ValueStore};
