//! End-to-end semantic preparation of operations.
//!
//! For every semantic candidate parameter of an operation the pipeline
//! loads previously persisted values, resolves predicates, harvests values
//! and persists the merged result. Parameters are processed concurrently,
//! one task per parameter; each task owns its [`SemanticParameter`]
//! exclusively, so no locking is needed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::info;

use restgen_core::{ApiSpec, Operation, SemanticParameter, TestCase, Verdict};

use crate::config::SemanticConfig;
use crate::error::{KbError, SemanticError};
use crate::feedback::{learn_from_execution, Learned};
use crate::harvest::ValueHarvester;
use crate::kb::{CachedKnowledgeBase, KnowledgeBase, SparqlEndpoint};
use crate::resolver::PredicateResolver;
use crate::store::ValueStore;

pub struct SemanticPipeline<K> {
    kb: Arc<CachedKnowledgeBase<K>>,
    resolver: PredicateResolver<CachedKnowledgeBase<K>>,
    harvester: ValueHarvester<CachedKnowledgeBase<K>>,
    store: Option<ValueStore>,
}

impl SemanticPipeline<SparqlEndpoint> {
    /// A pipeline over the SPARQL endpoint named in `config`.
    pub fn connect(config: &SemanticConfig) -> Result<Self, KbError> {
        Ok(Self::new(SparqlEndpoint::new(config)?, config))
    }
}

impl<K: KnowledgeBase + 'static> SemanticPipeline<K> {
    pub fn new(kb: K, config: &SemanticConfig) -> Self {
        let kb = Arc::new(CachedKnowledgeBase::new(kb, config.cache_queries));
        SemanticPipeline {
            resolver: PredicateResolver::new(Arc::clone(&kb), config),
            harvester: ValueHarvester::new(Arc::clone(&kb), config),
            store: config
                .store_dir
                .as_ref()
                .map(|dir| ValueStore::new(dir, config.experiment.clone())),
            kb,
        }
    }

    pub fn knowledge_base(&self) -> &CachedKnowledgeBase<K> {
        &self.kb
    }

    pub fn store(&self) -> Option<&ValueStore> {
        self.store.as_ref()
    }

    /// Semantic parameters of `operation`, ordered by parameter index.
    pub async fn prepare_operation(
        &self,
        operation: &Operation,
    ) -> Result<Vec<SemanticParameter>, SemanticError> {
        let mut tasks = JoinSet::new();
        for (index, parameter) in operation.parameters.iter().enumerate() {
            if !parameter.is_semantic_candidate() {
                continue;
            }
            let resolver = self.resolver.clone();
            let harvester = self.harvester.clone();
            let store = self.store.clone();
            let operation_id = operation.id.clone();
            let mut semantic = SemanticParameter::new(index, parameter.clone());
            tasks.spawn(async move {
                if let Some(store) = &store {
                    let stored = store.load(&operation_id, semantic.name());
                    semantic.merge(stored.valid, stored.invalid);
                }
                resolver.resolve_parameter(&mut semantic).await;
                harvester.harvest(&mut semantic).await;
                if let Some(store) = &store {
                    store.save(&operation_id, &semantic);
                }
                semantic
            });
        }

        let mut prepared = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            prepared.push(joined?);
        }
        prepared.sort_by_key(|p| p.index);

        info!(
            operation = %operation.id,
            parameters = prepared.len(),
            resolved = prepared.iter().filter(|p| p.is_resolved()).count(),
            "semantic preparation finished"
        );
        Ok(prepared)
    }

    /// Semantic parameters for every operation, keyed by operation id.
    pub async fn prepare_api(
        &self,
        api: &ApiSpec,
    ) -> Result<HashMap<String, Vec<SemanticParameter>>, SemanticError> {
        let mut prepared = HashMap::new();
        for operation in api.operations() {
            let parameters = self.prepare_operation(operation).await?;
            prepared.insert(operation.id.clone(), parameters);
        }
        Ok(prepared)
    }

    /// Learns from one execution and persists any change.
    pub fn record_execution(
        &self,
        parameters: &mut [SemanticParameter],
        case: &TestCase,
        verdict: &Verdict,
    ) -> Learned {
        let learned = learn_from_execution(parameters, case, verdict);
        if !learned.is_empty() {
            if let Some(store) = &self.store {
                for parameter in parameters.iter() {
                    if case.value(parameter.name(), parameter.location()).is_some() {
                        store.save(&case.operation_id, parameter);
                    }
                }
            }
        }
        learned
    }
}
