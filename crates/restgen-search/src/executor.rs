//! The execution boundary.
//!
//! An [`ExecutionAdapter`] turns a test case into a live HTTP call and a
//! verdict; it is a blocking call owned by the caller. [`BatchExecutor`]
//! runs batches of cases on the blocking pool with at most
//! `max_concurrency` in flight, so the adapter sees a bounded request rate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use restgen_core::{TestCase, TestCaseId, Verdict};

/// Executes one test case against the API under test.
///
/// Failures (unreachable API, unexpected response) are reported as
/// verdicts, not errors.
pub trait ExecutionAdapter: Send + Sync + 'static {
    fn execute(&self, case: &TestCase) -> Verdict;
}

pub struct BatchExecutor<A> {
    adapter: Arc<A>,
    permits: Arc<Semaphore>,
    executions: AtomicUsize,
}

impl<A: ExecutionAdapter> BatchExecutor<A> {
    pub fn new(adapter: A, max_concurrency: usize) -> Self {
        BatchExecutor {
            adapter: Arc::new(adapter),
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            executions: AtomicUsize::new(0),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Live executions performed so far.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Executes every case once and returns the verdicts, in completion
    /// order. A panicking adapter yields an error verdict for that case.
    pub async fn execute_all(&self, cases: Vec<TestCase>) -> Vec<(TestCaseId, Verdict)> {
        let mut tasks = JoinSet::new();
        for case in cases {
            let adapter = Arc::clone(&self.adapter);
            let permits = Arc::clone(&self.permits);
            self.executions.fetch_add(1, Ordering::SeqCst);
            tasks.spawn(async move {
                let id = case.id;
                let Ok(_permit) = permits.acquire_owned().await else {
                    return (id, Verdict::error("executor shut down"));
                };
                let verdict = match tokio::task::spawn_blocking(move || adapter.execute(&case)).await {
                    Ok(verdict) => verdict,
                    Err(err) => {
                        warn!(test_case = %id, "execution adapter failed: {}", err);
                        Verdict::error(format!("execution adapter failed: {}", err))
                    }
                };
                (id, verdict)
            });
        }

        let mut verdicts = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => verdicts.push(result),
                Err(err) => warn!("execution task failed: {}", err),
            }
        }
        verdicts
    }
}
